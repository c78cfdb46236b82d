use crate::domain::shopping::Fields;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Issued tokens expire after one hour.
pub const TOKEN_TTL_SECS: i64 = 3600;

#[derive(Error, Debug)]
pub enum SecurityError {
    #[error("token claims must be a JSON object")]
    InvalidClaims,
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Whatever the caller asked us to sign, plus issue and expiry timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub iat: i64,
    pub exp: i64,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Claims {
    pub fn email(&self) -> Option<&str> {
        self.fields.get("email").and_then(Value::as_str)
    }
}

pub fn sign_claims(claims: &Claims, secret: &str) -> Result<String, SecurityError> {
    Ok(encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

/// Signs arbitrary object claims. Caller supplied `iat`/`exp` are replaced.
pub fn issue_token(claims: Value, secret: &str) -> Result<String, SecurityError> {
    let Value::Object(mut fields) = claims else {
        return Err(SecurityError::InvalidClaims);
    };
    fields.remove("iat");
    fields.remove("exp");

    let now = Utc::now().timestamp();
    let claims = Claims {
        iat: now,
        exp: now + TOKEN_TTL_SECS,
        fields,
    };
    sign_claims(&claims, secret)
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, SecurityError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_aud = false;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;

    Ok(token_data.claims)
}
