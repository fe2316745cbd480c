//! Authentication: Argon2id password hashing, JWT issuance, reset tokens.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use sha2::{Digest, Sha256};
use staynest_common::{
    auth::{Claims, ACCESS_TOKEN, REFRESH_TOKEN},
    config::AuthConfig,
    models::user::User,
};

/// Token pair returned on login/register/refresh.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub token_type: String,
}

/// Hash a password using Argon2id.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against an Argon2id hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn generate_token(
    user: &User,
    secret: &str,
    ttl_secs: u64,
    token_type: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: user.role,
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ttl_secs as i64)).timestamp(),
        token_type: token_type.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Generate both access and refresh tokens for a user.
pub fn generate_token_pair(user: &User, cfg: &AuthConfig) -> Result<TokenPair, jsonwebtoken::errors::Error> {
    Ok(TokenPair {
        access_token: generate_token(user, &cfg.jwt_secret, cfg.access_token_ttl_secs, ACCESS_TOKEN)?,
        refresh_token: generate_token(user, &cfg.jwt_secret, cfg.refresh_token_ttl_secs, REFRESH_TOKEN)?,
        expires_in: cfg.access_token_ttl_secs,
        token_type: "Bearer".to_string(),
    })
}

/// A fresh password-reset token: 32 random bytes, hex-encoded. Emailed, never stored.
pub fn generate_reset_token() -> String {
    hex::encode(rand::random::<[u8; 32]>())
}

/// What the database keeps for a reset token.
pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
