use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use zeroize::Zeroizing;

use crate::{
    mail::mailer::{MailError, Mailer, OutgoingEmail},
    settings::AppConfig,
};

/// Implicit-TLS submission port; every other port negotiates STARTTLS.
const SMTPS_PORT: u16 = 465;

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Returns `Ok(None)` when SMTP is not configured.
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, MailError> {
        if !config.smtp_configured() {
            return Ok(None);
        }
        let host = config.smtp_host.as_deref().unwrap_or_default();
        let username = config.smtp_username.clone().unwrap_or_default();
        let password = Zeroizing::new(config.smtp_password.clone().unwrap_or_default());

        let from_address = config.mail_from.clone().unwrap_or_else(|| username.clone());
        let from = parse_mailbox(&from_address)?;

        let builder = if config.smtp_port == SMTPS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        }
        .map_err(|e| MailError::Transport(e.to_string()))?;

        let transport = builder
            .port(config.smtp_port)
            .credentials(Credentials::new(username, password.to_string()))
            .build();

        Ok(Some(SmtpMailer { transport, from }))
    }

    /// Checks the SMTP connection once at startup; failures are only logged.
    pub async fn verify(&self) -> bool {
        match self.transport.test_connection().await {
            Ok(ok) => ok,
            Err(e) => {
                tracing::warn!("SMTP connection check failed: {}", e);
                false
            }
        }
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .parse::<Mailbox>()
        .map_err(|_| MailError::InvalidAddress(address.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(&email.to)?)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html)
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| MailError::Transport(e.to_string()))
    }
}
