use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::AppState;

/// Hash a key with SHA-256 so lookups compare fixed-length digests.
fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod auth_tests;

/// Role attached to an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    Viewer = 0,
    Staff = 1,
}

impl Role {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "viewer" => Some(Role::Viewer),
            "staff" => Some(Role::Staff),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Viewer => write!(f, "viewer"),
            Role::Staff => write!(f, "staff"),
        }
    }
}

/// Parse a `key[:role]` list. Keys without a role are staff keys.
pub(crate) fn parse_staff_keys(value: &str) -> HashMap<String, Role> {
    value
        .split(',')
        .filter_map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                return None;
            }

            match entry.split_once(':') {
                Some((key, role_str)) => {
                    let role = Role::from_str(role_str.trim()).unwrap_or(Role::Viewer);
                    Some((hash_key(key.trim()), role))
                }
                None => Some((hash_key(entry), Role::Staff)),
            }
        })
        .collect()
}

/// Staff keys from `STAFF_API_KEYS`
pub fn load_staff_keys() -> HashMap<String, Role> {
    parse_staff_keys(&std::env::var("STAFF_API_KEYS").unwrap_or_default())
}

/// Extract API key from `X-API-Key` or `Authorization: Bearer`
pub(crate) fn extract_api_key(headers: &HeaderMap) -> Result<String, AuthError> {
    if let Some(api_key) = headers.get("X-API-Key") {
        if let Ok(key) = api_key.to_str() {
            if !key.is_empty() {
                return Ok(key.to_string());
            }
        }
    }

    if let Some(auth) = headers.get("Authorization") {
        if let Ok(auth_str) = auth.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                if !token.is_empty() {
                    return Ok(token.to_string());
                }
            }
        }
    }

    Err(AuthError::MissingApiKey)
}

/// Mask API key for logging (show first 4 and last 4 characters)
pub(crate) fn mask_api_key(key: &str) -> String {
    if key.len() <= 8 {
        return "****".to_string();
    }
    format!("{}...{}", &key[..4], &key[key.len() - 4..])
}

/// Resolve the role for the request's key.
pub(crate) fn authorize(
    keys: &HashMap<String, Role>,
    headers: &HeaderMap,
    required: Role,
) -> Result<Role, AuthError> {
    if keys.is_empty() {
        return Err(AuthError::NotConfigured);
    }

    let api_key = extract_api_key(headers)?;
    match keys.get(&hash_key(&api_key)) {
        Some(role) if *role >= required => Ok(*role),
        Some(role) => {
            tracing::warn!("Key {} has role {}, {} required", mask_api_key(&api_key), role, required);
            Err(AuthError::InsufficientRole(required))
        }
        None => {
            tracing::warn!("Invalid API key attempted: {}", mask_api_key(&api_key));
            Err(AuthError::InvalidApiKey)
        }
    }
}

/// Middleware guarding staff-only endpoints. With no keys configured every
/// request is refused.
pub async fn require_staff_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    authorize(&state.staff_keys, &headers, Role::Staff)?;
    Ok(next.run(request).await)
}

#[derive(Debug)]
pub enum AuthError {
    MissingApiKey,
    InvalidApiKey,
    InsufficientRole(Role),
    NotConfigured,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingApiKey => write!(f, "Missing API key"),
            AuthError::InvalidApiKey => write!(f, "Invalid API key"),
            AuthError::InsufficientRole(role) => {
                write!(f, "Insufficient permissions. Required role: {}", role)
            }
            AuthError::NotConfigured => write!(f, "No staff keys configured"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::debug!("Staff check failed: {}", self);
        (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "Permission denied" })),
        )
            .into_response()
    }
}
