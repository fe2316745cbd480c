//! Contact message repository.

use staynest_common::models::contact::ContactMessage;
use sqlx::PgPool;
use uuid::Uuid;

/// Store a contact-form submission.
pub async fn create_message(
    pool: &PgPool,
    id: Uuid,
    name: &str,
    email: &str,
    subject: Option<&str>,
    message: &str,
) -> Result<ContactMessage, sqlx::Error> {
    sqlx::query_as::<_, ContactMessage>(
        r#"
        INSERT INTO contact_messages (id, name, email, subject, message, created_at)
        VALUES ($1, $2, $3, $4, $5, NOW())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(subject)
    .bind(message)
    .fetch_one(pool)
    .await
}

/// All messages, newest first.
pub async fn list_messages(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<ContactMessage>, sqlx::Error> {
    sqlx::query_as::<_, ContactMessage>(
        r#"
        SELECT * FROM contact_messages
        ORDER BY created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn delete_message(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM contact_messages WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
