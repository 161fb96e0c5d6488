use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use arena_shared::models::Role;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: usize,
}

/// Bearer-token precondition for every protected operation: handlers
/// take `Claims` as an extractor and the decode happens exactly once,
/// here.
impl FromRequestParts<AppState> for Claims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::AuthenticationError("missing bearer token".into()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::AuthenticationError("missing bearer token".into()))?;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.auth.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::AuthenticationError("invalid or expired token".into()))?;

        Ok(token_data.claims)
    }
}

/// Single authorization check: exact membership in the operation's
/// allow-list, never hierarchical.
pub fn require_role(claims: &Claims, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&claims.role) {
        Ok(())
    } else {
        Err(AppError::AuthorizationError("insufficient role".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role) -> Claims {
        Claims { sub: Uuid::new_v4(), role, exp: 0 }
    }

    #[test]
    fn allow_list_is_exact_match() {
        assert!(require_role(&claims(Role::Admin), &[Role::Admin, Role::Manager]).is_ok());
        assert!(require_role(&claims(Role::Manager), &[Role::Admin, Role::Manager]).is_ok());
        assert!(require_role(&claims(Role::Citizen), &[Role::Admin, Role::Manager]).is_err());
        // No hierarchy: admin is not implicitly a citizen.
        assert!(require_role(&claims(Role::Admin), &[Role::Citizen]).is_err());
    }
}
