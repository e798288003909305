use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::session::{Role, SessionContext};
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

/// Identity of the caller from an optional `Authorization: Bearer` header.
/// No header means an anonymous session; a header that does not carry a
/// valid HS256 token is rejected.
#[async_trait]
impl FromRequestParts<AppState> for SessionContext {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let Some(auth_header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(SessionContext::anonymous());
        };
        let auth_str = auth_header
            .to_str()
            .map_err(|_| Error::Unauthorized("bad_authorization".to_string()))?;
        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| Error::Unauthorized("unsupported_scheme".to_string()))?;
        decode_session(token, &state.jwt_secret)
    }
}

pub fn decode_session(token: &str, secret: &str) -> Result<SessionContext> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(
        token.trim(),
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "rejected bearer token");
        Error::Unauthorized("invalid_token".to_string())
    })?;

    let role = data
        .claims
        .role
        .as_deref()
        .map(Role::parse)
        .unwrap_or_default();
    Ok(SessionContext::user(data.claims.sub, role))
}

/// Signs an HS256 token for `user_id` valid for `ttl_secs`.
pub fn encode_session(user_id: &str, role: Option<&str>, secret: &str, ttl_secs: i64) -> Result<String> {
    let exp = (crate::utils::time::now().timestamp() + ttl_secs).max(0) as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
        role: role.map(str::to_string),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Failed to sign token: {}", e)))
}
