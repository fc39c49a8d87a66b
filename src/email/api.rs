use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time;

use crate::email::error::DeliveryError;
use crate::email::transport::{MailTransport, OutgoingEmail};

/// HTTP API mail provider (SendGrid wire format).
pub struct ApiTransport {
    http_client: Client,
    base_url: String,
    api_key: Secret<String>,
}

#[derive(serde::Serialize)]
struct SendEmailBody {
    personalizations: Vec<Personalization>,
    from: EmailAddress,
    subject: String,
    content: Vec<Content>,
}

#[derive(serde::Serialize)]
struct EmailAddress {
    email: String,
}

#[derive(serde::Serialize)]
struct Personalization {
    to: Vec<EmailAddress>,
}

#[derive(serde::Serialize)]
struct Content {
    #[serde(rename = "type")]
    content_type: String,
    value: String,
}

impl ApiTransport {
    pub fn new(base_url: String, api_key: Secret<String>, timeout: time::Duration) -> ApiTransport {
        let http_client = Client::builder().timeout(timeout).build().unwrap();

        ApiTransport {
            http_client,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl MailTransport for ApiTransport {
    fn name(&self) -> &'static str {
        "api-based"
    }

    /// The provider has no lightweight verify call; a configured key is all
    /// that can be checked before the first real send.
    async fn verify(&self) -> Result<(), DeliveryError> {
        Ok(())
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), DeliveryError> {
        let url = format!("{}/mail/send", self.base_url);
        let body = SendEmailBody {
            from: EmailAddress {
                email: email.from.clone(),
            },
            personalizations: vec![Personalization {
                to: vec![EmailAddress {
                    email: String::from(email.to.as_ref()),
                }],
            }],
            subject: email.subject.clone(),
            content: vec![Content {
                content_type: String::from("text/html"),
                value: email.html.clone(),
            }],
        };

        let response = self
            .http_client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&body)
            .send()
            .await
            // No status at all: the request never made it to the provider.
            .map_err(|err| DeliveryError::transient(format!("mail API request failed: {}", err)))?;

        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        let excerpt = response.text().await.unwrap_or_default();
        let rate_limited = status.as_u16() == 429;
        let error = if rate_limited || status.is_server_error() {
            DeliveryError::transient("mail API rejected the message temporarily")
        } else {
            DeliveryError::permanent("mail API rejected the message")
        };

        Err(error
            .with_response_code(status.as_u16())
            .with_response(&excerpt))
    }
}
