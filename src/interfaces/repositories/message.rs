use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    entities::message::{Message, MessageInsert, MessageRow, MessageStatus},
    errors::AppError,
    repositories::sqlx_repo::SqlxMessageRepo,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Stores a new message with status `new`.
    async fn create_message(&self, msg: &MessageInsert) -> Result<i64, AppError>;
    async fn list_messages(&self) -> Result<Vec<Message>, AppError>;

    /// Returns `false` when no message has the given id.
    async fn update_status(&self, id: i64, status: MessageStatus) -> Result<bool, AppError>;
}

impl SqlxMessageRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxMessageRepo { pool }
    }
}

#[async_trait]
impl MessageRepository for SqlxMessageRepo {
    async fn create_message(&self, msg: &MessageInsert) -> Result<i64, AppError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO messages (name, email, subject, message, status, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, 'new', $5, $6)
            RETURNING id
            "#,
        )
        .bind(&msg.name)
        .bind(&msg.email)
        .bind(&msg.subject)
        .bind(&msg.message)
        .bind(&msg.ip_address)
        .bind(&msg.user_agent)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn list_messages(&self) -> Result<Vec<Message>, AppError> {
        sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, name, email, subject, message, status, ip_address, user_agent,
                   created_at, updated_at
            FROM messages
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Message::try_from)
        .collect()
    }

    async fn update_status(&self, id: i64, status: MessageStatus) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE messages SET status = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
