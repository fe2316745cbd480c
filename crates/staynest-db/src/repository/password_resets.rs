//! Password-reset token repository.

use chrono::{DateTime, Utc};
use staynest_common::models::password_reset::PasswordReset;
use sqlx::PgPool;
use uuid::Uuid;

/// Replace any outstanding tokens for the user with a fresh one. Expired
/// tokens of every user are swept in the same transaction.
pub async fn issue(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<PasswordReset, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM password_resets WHERE user_id = $1 OR expires_at < NOW()")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let reset = sqlx::query_as::<_, PasswordReset>(
        r#"
        INSERT INTO password_resets (id, user_id, token_hash, expires_at, created_at)
        VALUES ($1, $2, $3, $4, NOW())
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(token_hash)
    .bind(expires_at)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(reset)
}

pub async fn find_by_hash(pool: &PgPool, token_hash: &str) -> Result<Option<PasswordReset>, sqlx::Error> {
    sqlx::query_as::<_, PasswordReset>("SELECT * FROM password_resets WHERE token_hash = $1")
        .bind(token_hash)
        .fetch_optional(pool)
        .await
}

/// Set the new password and drop every reset token the user holds, atomically.
pub async fn complete(pool: &PgPool, user_id: Uuid, password_hash: &str) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM password_resets WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}
