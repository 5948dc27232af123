use std::collections::HashMap;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::api::AppState;
use crate::config::AdminKey;
use crate::error::AppError;

/// The admin principal attached to every request, used for audit payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminIdentity {
    pub id: String,
    pub email: String,
}

/// Bearer-key registry for admin principals, built from configuration at
/// startup.
pub struct AdminRegistry {
    by_token: HashMap<String, AdminIdentity>,
}

impl AdminRegistry {
    pub fn new(keys: &[AdminKey]) -> Self {
        let by_token = keys
            .iter()
            .map(|key| {
                (
                    key.token.clone(),
                    AdminIdentity {
                        id: key.id.clone(),
                        email: key.email.clone(),
                    },
                )
            })
            .collect();

        Self { by_token }
    }

    pub fn authenticate(&self, token: &str) -> Option<&AdminIdentity> {
        self.by_token.get(token)
    }
}

/// Extractor enforcing an authenticated admin before any handler runs.
pub struct AdminAuth(pub AdminIdentity);

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState
    ) -> Result<Self, Self::Rejection> {
        let header = parts.headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Expected a bearer token".to_string()))?;

        let identity = state.auth
            .authenticate(token)
            .ok_or_else(|| AppError::Unauthorized("Invalid admin API key".to_string()))?;

        Ok(AdminAuth(identity.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> AdminRegistry {
        AdminRegistry::new(
            &[AdminKey {
                id: "ops-1".to_string(),
                email: "alice@example.com".to_string(),
                token: "s3cret".to_string(),
            }]
        )
    }

    #[test]
    fn known_token_resolves_identity() {
        let identity = registry().authenticate("s3cret").cloned().unwrap();
        assert_eq!(identity.id, "ops-1");
        assert_eq!(identity.email, "alice@example.com");
    }

    #[test]
    fn unknown_token_is_rejected() {
        assert!(registry().authenticate("wrong").is_none());
    }
}
