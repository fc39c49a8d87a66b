use async_trait::async_trait;

use crate::domain::contact_email::ContactEmail;
use crate::email::error::DeliveryError;

/// One fully-rendered outbound message.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: ContactEmail,
    pub subject: String,
    pub html: String,
}

/// A way of handing a message to a mail provider.
///
/// Implemented by the pooled SMTP session and by the HTTP API backend; the
/// notifier picks one implementation at startup and never branches on the
/// provider again.
#[async_trait]
pub trait MailTransport: Send + Sync {
    fn name(&self) -> &'static str;

    /// Startup handshake. Backends without a cheap liveness call return Ok
    /// and let the first real send surface any problem.
    async fn verify(&self) -> Result<(), DeliveryError>;

    async fn send(&self, email: &OutgoingEmail) -> Result<(), DeliveryError>;
}
