pub mod api;
pub mod error;
pub mod retry;
pub mod smtp;
pub mod transport;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::config::{EmailProvider, EmailSettings};
use crate::domain::birthday_record::BirthdayRecord;
use crate::email::api::ApiTransport;
use crate::email::error::DeliveryError;
use crate::email::retry::RetryPolicy;
use crate::email::smtp::{service_preset, SmtpMailTransport, SmtpSessionOptions};
use crate::email::transport::{MailTransport, OutgoingEmail};

const GREETING_SUBJECT: &str = "Happy Birthday!";

/// Owns the outbound-mail transport for the whole process: one pooled SMTP
/// session or one API client, selected from configuration at startup and
/// shared by handle with everything that sends.
pub struct EmailNotifier {
    outbound: Option<Outbound>,
    retry: RetryPolicy,
    ready: AtomicBool,
}

struct Outbound {
    transport: Box<dyn MailTransport>,
    from_address: String,
}

impl EmailNotifier {
    /// Missing credentials downgrade the notifier to an unconfigured mode
    /// instead of failing startup: `deliver` then reports false and the
    /// daily scan logs skip notices.
    pub fn new(settings: &EmailSettings) -> EmailNotifier {
        let retry = RetryPolicy::new(
            settings.retry_count,
            Duration::from_millis(settings.retry_base_delay_ms),
        );
        let outbound = match build_outbound(settings) {
            Ok(outbound) => Some(outbound),
            Err(reason) => {
                tracing::warn!("Email is not configured, greetings will be skipped: {}", reason);
                None
            }
        };

        EmailNotifier {
            outbound,
            retry,
            ready: AtomicBool::new(false),
        }
    }

    /// Non-fatal startup verification. A failed handshake is logged and
    /// leaves `ready` false, but sends are still attempted afterwards and
    /// report their own errors.
    pub async fn initialize(&self) {
        let Some(outbound) = &self.outbound else {
            return;
        };

        match outbound.transport.verify().await {
            Ok(()) => {
                self.ready.store(true, Ordering::Relaxed);
                tracing::info!(
                    "{} email transport verified and ready",
                    outbound.transport.name()
                );
            }
            Err(error) => {
                self.ready.store(false, Ordering::Relaxed);
                tracing::warn!(error = %error, "Email transport verification failed");
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.outbound.is_some()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    /// Sends the greeting for one record. Every failure mode, retry
    /// exhaustion included, is folded into the returned boolean so that one
    /// bad delivery cannot abort a batch of sends.
    #[tracing::instrument(skip(self, record), fields(record_email = %record.email.as_ref()))]
    pub async fn deliver(&self, record: &BirthdayRecord) -> bool {
        let Some(outbound) = &self.outbound else {
            tracing::warn!("Email is not configured, greeting not sent");
            return false;
        };

        let email = OutgoingEmail {
            from: outbound.from_address.clone(),
            to: record.email.clone(),
            subject: String::from(GREETING_SUBJECT),
            html: render_greeting(record.username.as_ref()),
        };

        let outcome = self
            .retry
            .run(|| outbound.transport.send(&email), DeliveryError::is_transient)
            .await;

        match outcome {
            Ok(()) => {
                tracing::info!("Birthday email sent to {}", record.email.as_ref());
                true
            }
            Err(error) => {
                tracing::error!(
                    error = %error,
                    "Error sending email to {}",
                    record.email.as_ref()
                );
                false
            }
        }
    }
}

fn build_outbound(settings: &EmailSettings) -> Result<Outbound, String> {
    match settings.provider {
        EmailProvider::ApiBased => {
            let api_key = settings.api_key.clone().ok_or("email.api_key is not set")?;
            let from_address = settings
                .get_from_address()
                .ok_or("email.from_address is not set")?;
            let transport = ApiTransport::new(
                settings.api_base_url.clone(),
                api_key,
                Duration::from_millis(settings.socket_timeout_ms),
            );

            Ok(Outbound {
                transport: Box::new(transport),
                from_address,
            })
        }
        EmailProvider::Smtp => {
            let user = settings.smtp.user.clone().ok_or("email.smtp.user is not set")?;
            let password = settings
                .smtp
                .password
                .clone()
                .ok_or("email.smtp.password is not set")?;
            let (host, port, secure) = match &settings.smtp.service {
                Some(service) => {
                    let (host, port, secure) = service_preset(service)
                        .ok_or_else(|| format!("unknown smtp service preset {}", service))?;
                    (host.to_string(), port, secure)
                }
                None => {
                    let host = settings
                        .smtp
                        .host
                        .clone()
                        .ok_or("email.smtp.host is not set and no service preset is given")?;
                    let port = settings.smtp.port;
                    (host, port, settings.smtp.secure.unwrap_or(port == 465))
                }
            };
            let from_address = settings.get_from_address().unwrap_or_else(|| user.clone());
            let max_connections = if settings.pool { settings.max_connections } else { 1 };

            // The session itself applies only the socket timeout and the
            // connection bound; the remaining knobs are log-only.
            tracing::info!(
                host = %host,
                port,
                secure,
                max_connections,
                socket_timeout_ms = settings.socket_timeout_ms,
                connection_timeout_ms = settings.connection_timeout_ms,
                greeting_timeout_ms = settings.greeting_timeout_ms,
                max_messages = settings.max_messages,
                "Creating pooled SMTP session"
            );

            let transport = SmtpMailTransport::new(SmtpSessionOptions {
                host,
                port,
                secure,
                user,
                password,
                socket_timeout: Duration::from_millis(settings.socket_timeout_ms),
                max_connections,
            })
            .map_err(|err| err.to_string())?;

            Ok(Outbound {
                transport: Box::new(transport),
                from_address,
            })
        }
    }
}

fn render_greeting(username: &str) -> String {
    format!(
        r#"
        <div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
          <h2 style="color: #4361ee; text-align: center;">Happy Birthday {}!</h2>
          <p style="font-size: 16px; line-height: 1.6;">
            Wishing you a fantastic birthday filled with joy and happiness!
          </p>
          <p style="font-size: 16px; line-height: 1.6;">
            May your special day be as wonderful as you are!
          </p>
          <div style="text-align: center; margin: 30px 0;">
            <div style="font-size: 48px; color: #4361ee;">🎂 🎉 🎁</div>
          </div>
          <p style="font-size: 14px; color: #6c757d; text-align: center;">
            This is an automated birthday greeting from our system.
          </p>
        </div>
        "#,
        username
    )
}
