//! Shared JWT authentication primitives.
//!
//! Claims and token validation live here so the middleware and any other
//! consumer can decode tokens without depending on the API crate. Password
//! hashing and token generation stay in staynest-api.

use jsonwebtoken::{decode, errors::ErrorKind, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{error::StayError, models::user::UserRole};

pub const ACCESS_TOKEN: &str = "access";
pub const REFRESH_TOKEN: &str = "refresh";

/// JWT claims embedded in access and refresh tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as string)
    pub sub: String,
    pub email: String,
    pub role: UserRole,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// Token type ("access" or "refresh")
    pub token_type: String,
}

/// Validate and decode a JWT token.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Decode a token and require the given token type, mapping failures to API errors.
pub fn decode_expecting(token: &str, secret: &str, token_type: &str) -> Result<Claims, StayError> {
    let claims = validate_token(token, secret).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => StayError::TokenExpired,
        _ => StayError::InvalidToken,
    })?;

    if claims.token_type != token_type {
        return Err(StayError::InvalidToken);
    }
    Ok(claims)
}
