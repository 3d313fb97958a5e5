use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

/// Header carrying the caller's user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// User id assumed when the header is absent
pub const DEFAULT_USER_ID: &str = "default";

const MAX_USER_ID_LEN: usize = 64;

/// Passthrough user identity taken from the `x-user-id` header.
///
/// There is no authentication; the id only selects which catalog to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(String);

impl UserId {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        let value = value.trim();
        let valid = !value.is_empty()
            && value.len() <= MAX_USER_ID_LEN
            && value
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');

        if valid {
            Ok(Self(value.to_string()))
        } else {
            Err(AppError::InvalidArgument(format!(
                "{} must be 1-{} characters of letters, digits, '_' or '-'",
                USER_ID_HEADER, MAX_USER_ID_LEN
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self(DEFAULT_USER_ID.to_string())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.headers.get(USER_ID_HEADER) {
            None => Ok(Self::default()),
            Some(value) => {
                let value = value.to_str().map_err(|_| {
                    AppError::InvalidArgument(format!("{} must be ASCII", USER_ID_HEADER))
                })?;
                Self::parse(value)
            }
        }
    }
}
