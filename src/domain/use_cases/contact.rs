use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    entities::message::{
        ClientMeta, ContactForm, ContactOutcome, MessageListResponse, MessageStatus, MessageStatusResponse,
    },
    errors::AppError,
    limiter::rate_limiter::{RateDecision, SlidingWindowLimiter},
    mail::{mailer::Mailer, templates},
    repositories::message::MessageRepository,
};

pub struct ContactHandler {
    pub message_repo: Arc<dyn MessageRepository>,
    pub mailer: Arc<dyn Mailer>,
    pub limiter: SlidingWindowLimiter,
    pub admin_email: Option<String>,
    pub owner_name: String,
}

impl ContactHandler {
    pub fn new(
        message_repo: Arc<dyn MessageRepository>,
        mailer: Arc<dyn Mailer>,
        limiter: SlidingWindowLimiter,
        admin_email: Option<String>,
        owner_name: String,
    ) -> Self {
        ContactHandler { message_repo, mailer, limiter, admin_email, owner_name }
    }

    /// Validates, rate-limits, then stores and forwards a contact message.
    /// Storage and email are attempted independently; the submission fails
    /// only when neither went through.
    pub async fn submit(&self, form: ContactForm, client: ClientMeta) -> Result<ContactOutcome, AppError> {
        let form = form.normalized();
        form.validate()?;

        // Clients without a resolvable address are not bucketed together.
        if let Some(key) = client.ip_address.as_deref() {
            if let RateDecision::Limited { retry_after_secs } = self.limiter.check(key) {
                tracing::warn!(client = key, "Contact form rate limit hit");
                return Err(AppError::RateLimited(retry_after_secs));
            }
        }

        let id = match self.message_repo.create_message(&form.prepare_for_insert(&client)).await {
            Ok(id) => {
                tracing::info!(message_id = id, "Contact message stored");
                Some(id)
            }
            Err(e) => {
                tracing::error!("Failed to store contact message: {}", e);
                None
            }
        };
        let persisted = id.is_some();
        let notified = self.notify(&form, persisted).await;

        if !persisted && !notified {
            return Err(AppError::ContactDeliveryFailed);
        }

        let message = match (persisted, notified) {
            (true, true) => "Thank you for your message! I'll get back to you soon.",
            (true, false) => "Your message has been saved. I'll get back to you soon.",
            _ => "Your message has been delivered. I'll get back to you soon.",
        };

        Ok(ContactOutcome {
            success: true,
            persisted,
            notified,
            id,
            message: message.to_string(),
        })
    }

    /// Sends the admin notification, then the sender's acknowledgment. Only the
    /// admin notification decides `notified`; the acknowledgment is sent once
    /// the message reached us one way or the other.
    async fn notify(&self, form: &ContactForm, persisted: bool) -> bool {
        if !self.mailer.is_enabled() {
            tracing::info!("Email service not configured, skipping contact notifications");
            return false;
        }

        let notified = match self.admin_email.as_deref() {
            Some(admin) => {
                let email = templates::admin_notification(admin, form, Utc::now());
                match self.mailer.send(email).await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::error!("Admin notification failed: {}", e);
                        false
                    }
                }
            }
            None => {
                tracing::warn!("No admin email configured, contact notification skipped");
                false
            }
        };

        if persisted || notified {
            if let Err(e) = self.mailer.send(templates::thank_you(form, &self.owner_name)).await {
                tracing::warn!("Thank-you email failed: {}", e);
            }
        }

        notified
    }

    pub async fn list_messages(&self) -> Result<MessageListResponse, AppError> {
        let messages = self.message_repo.list_messages().await?;
        Ok(MessageListResponse {
            success: true,
            count: messages.len(),
            messages,
        })
    }

    pub async fn mark_read(&self, id: i64) -> Result<MessageStatusResponse, AppError> {
        self.update_status(id, MessageStatus::Read).await
    }

    pub async fn update_status(&self, id: i64, status: MessageStatus) -> Result<MessageStatusResponse, AppError> {
        if !self.message_repo.update_status(id, status).await? {
            return Err(AppError::MessageNotFound(id));
        }
        tracing::info!(message_id = id, %status, "Message status updated");

        Ok(MessageStatusResponse {
            success: true,
            id,
            status,
            message: format!("Message marked as {status}"),
        })
    }
}
