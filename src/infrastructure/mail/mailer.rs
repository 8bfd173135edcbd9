use async_trait::async_trait;
use derive_more::Display;

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Display)]
pub enum MailError {
    #[display("Email service is not configured")]
    NotConfigured,

    #[display("Invalid address '{_0}'")]
    InvalidAddress(String),

    #[display("Failed to build email: {_0}")]
    Build(String),

    #[display("SMTP delivery failed: {_0}")]
    Transport(String),
}

impl std::error::Error for MailError {}

/// Outbound mail seam. The contact flow only depends on this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    fn is_enabled(&self) -> bool;
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

/// Stand-in used when no SMTP account is configured: every send is skipped.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        tracing::info!(to = %email.to, "Email service not configured, skipping '{}'", email.subject);
        Err(MailError::NotConfigured)
    }
}
