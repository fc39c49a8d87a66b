use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::PoolConfig;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

use crate::email::error::DeliveryError;
use crate::email::transport::{MailTransport, OutgoingEmail};

/// Response codes that mean "temporarily unavailable, come back later".
const TRANSIENT_SMTP_CODES: [u16; 4] = [421, 450, 451, 452];

pub struct SmtpSessionOptions {
    pub host: String,
    pub port: u16,
    /// Implicit TLS from the first byte; otherwise STARTTLS is required.
    pub secure: bool,
    pub user: String,
    pub password: Secret<String>,
    pub socket_timeout: Duration,
    pub max_connections: u32,
}

/// Pooled SMTP session. Created once at startup with its pool and timeout
/// parameters fixed; reused by every send for the process lifetime.
pub struct SmtpMailTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    pub fn new(options: SmtpSessionOptions) -> Result<SmtpMailTransport, DeliveryError> {
        let builder = if options.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&options.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&options.host)
        }
        .map_err(classify_smtp_error)?;

        let mailer = builder
            .port(options.port)
            .credentials(Credentials::new(
                options.user,
                options.password.expose_secret().clone(),
            ))
            .timeout(Some(options.socket_timeout))
            .pool_config(PoolConfig::new().max_size(options.max_connections))
            .build();

        Ok(SmtpMailTransport { mailer })
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn verify(&self) -> Result<(), DeliveryError> {
        match self.mailer.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(DeliveryError::transient(
                "SMTP server did not accept the handshake",
            )),
            Err(error) => Err(classify_smtp_error(error)),
        }
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), DeliveryError> {
        let message = build_message(email)?;

        self.mailer
            .send(message)
            .await
            .map(|_| ())
            .map_err(classify_smtp_error)
    }
}

fn build_message(email: &OutgoingEmail) -> Result<Message, DeliveryError> {
    let from: Mailbox = email
        .from
        .parse()
        .map_err(|err| DeliveryError::permanent(format!("invalid sender address: {}", err)))?;
    let to: Mailbox = email
        .to
        .as_ref()
        .parse()
        .map_err(|err| DeliveryError::permanent(format!("invalid recipient address: {}", err)))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(email.subject.clone())
        .header(ContentType::TEXT_HTML)
        .body(email.html.clone())
        .map_err(|err| DeliveryError::permanent(format!("failed to build message: {}", err)))
}

fn classify_smtp_error(error: lettre::transport::smtp::Error) -> DeliveryError {
    let response_code = error
        .status()
        .and_then(|code| code.to_string().parse::<u16>().ok());
    let transient = match response_code {
        Some(code) => TRANSIENT_SMTP_CODES.contains(&code),
        // No SMTP response at all: a connection, DNS or timeout-level
        // failure, unless the message itself or the TLS setup is at fault.
        None => !(error.is_client() || error.is_tls()),
    };

    let diagnostic = if transient {
        DeliveryError::transient(error.to_string())
    } else {
        DeliveryError::permanent(error.to_string())
    };

    match response_code {
        Some(code) => diagnostic.with_response_code(code),
        None => diagnostic,
    }
}

/// Named provider presets overriding host, port and TLS mode, mirroring the
/// service shortcuts common in mail tooling.
pub fn service_preset(service: &str) -> Option<(&'static str, u16, bool)> {
    match service.to_lowercase().as_str() {
        "gmail" => Some(("smtp.gmail.com", 465, true)),
        "outlook" | "office365" => Some(("smtp.office365.com", 587, false)),
        "yahoo" => Some(("smtp.mail.yahoo.com", 465, true)),
        "sendgrid" => Some(("smtp.sendgrid.net", 587, false)),
        "mailgun" => Some(("smtp.mailgun.org", 587, false)),
        _ => None,
    }
}
