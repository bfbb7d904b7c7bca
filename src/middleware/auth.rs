use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use fleetops_auth::{Claims, verify_token};
use fleetops_core::AppError;
use fleetops_core::rights::{
    GROUP_ADD, GROUP_DELETE, GROUP_EDIT, GROUP_VIEW, USER_ADD, USER_EDIT, USER_VIEW,
};

use crate::state::AppState;

/// Extractor that validates the bearer JWT and exposes its claims.
///
/// The permission list inside the token is what the client was told at login.
/// Route protection goes through the `Require*` extractors, which ask the store.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Check the token's permission snapshot. Never fails.
    pub fn has_permission(&self, code: &str) -> bool {
        self.0.has_permission(code)
    }

    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.0.sub)
            .map_err(|_| AppError::unauthorized("Invalid user ID in token".to_string()))
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::unauthorized("Invalid authorization header format".to_string())
        })?;

        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

/// Declares an extractor that lets a request through only if the caller's
/// groups currently hold `$permission` in the database.
#[macro_export]
macro_rules! require_permission {
    ($name:ident, $permission:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = fleetops_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user =
                    $crate::middleware::auth::AuthUser::from_request_parts(parts, state).await?;
                let user_id = auth_user.user_id()?;

                if !state.store.user_has_permission(user_id, $permission).await? {
                    $crate::metrics::track_authorization_denied($permission);
                    tracing::warn!(
                        user_id = %user_id,
                        permission = $permission,
                        "Permission denied"
                    );
                    return Err(fleetops_core::AppError::forbidden(format!(
                        "Access denied. Missing required permission: {}",
                        $permission
                    )));
                }

                Ok($name(auth_user))
            }
        }
    };
}

// Groups
require_permission!(RequireGroupView, GROUP_VIEW);
require_permission!(RequireGroupAdd, GROUP_ADD);
require_permission!(RequireGroupEdit, GROUP_EDIT);
require_permission!(RequireGroupDelete, GROUP_DELETE);

// Users
require_permission!(RequireUserView, USER_VIEW);
require_permission!(RequireUserAdd, USER_ADD);
require_permission!(RequireUserEdit, USER_EDIT);

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_user(permissions: &[&str]) -> AuthUser {
        AuthUser(Claims {
            sub: Uuid::nil().to_string(),
            email: "ops@fleet.test".to_string(),
            group_ids: vec![],
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            exp: 0,
            iat: 0,
        })
    }

    #[test]
    fn test_has_permission_reads_token_snapshot() {
        let user = auth_user(&["TRUCK_VIEW"]);
        assert!(user.has_permission("TRUCK_VIEW"));
        assert!(!user.has_permission("TRUCK_ADD"));
        assert!(!user.has_permission(""));
    }

    #[test]
    fn test_user_id_rejects_garbage_subject() {
        let mut user = auth_user(&[]);
        assert_eq!(user.user_id().unwrap(), Uuid::nil());

        user.0.sub = "not-a-uuid".to_string();
        assert_eq!(user.user_id().unwrap_err().status.as_u16(), 401);
    }
}
