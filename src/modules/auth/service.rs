use tracing::instrument;
use uuid::Uuid;

use fleetops_auth::create_access_token;
use fleetops_config::JwtConfig;
use fleetops_core::{AppError, verify_password};
use fleetops_db::{PermissionStore, StoreError};
use fleetops_models::{LoginRequest, LoginResponse, ProfileResponse, User};

use crate::metrics::{track_jwt_issued, track_user_login_failure, track_user_login_success};

fn invalid_credentials() -> AppError {
    AppError::unauthorized("Invalid email or password".to_string())
}

pub struct AuthService;

impl AuthService {
    /// Check the password, then issue a token carrying the user's groups and rights.
    #[instrument(skip(store, dto, jwt_config), fields(email = %dto.email))]
    pub async fn login_user(
        store: &dyn PermissionStore,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let credentials = match store.get_user_credentials(&dto.email).await {
            Ok(credentials) => credentials,
            Err(StoreError::NotFound(_)) => {
                track_user_login_failure("unknown_email");
                return Err(invalid_credentials());
            }
            Err(e) => return Err(e.into()),
        };

        if !verify_password(&dto.password, &credentials.password)? {
            track_user_login_failure("wrong_password");
            return Err(invalid_credentials());
        }

        let user: User = credentials.into();
        let groups = store.list_user_groups(user.id).await?;
        let permissions = store.get_user_permissions(user.id).await?;

        let access_token = create_access_token(
            user.id,
            &user.email,
            groups.iter().map(|g| g.id).collect(),
            permissions.clone(),
            jwt_config,
        )?;

        track_user_login_success();
        track_jwt_issued();

        Ok(LoginResponse {
            access_token,
            user,
            groups,
            permissions,
        })
    }

    /// Current profile, with permissions re-read from storage rather than the token.
    #[instrument(skip(store))]
    pub async fn get_profile(
        store: &dyn PermissionStore,
        user_id: Uuid,
    ) -> Result<ProfileResponse, AppError> {
        let user = store.get_user(user_id).await?;
        let groups = store.list_user_groups(user_id).await?;
        let permissions = store.get_user_permissions(user_id).await?;

        Ok(ProfileResponse {
            user,
            groups,
            permissions,
        })
    }
}
