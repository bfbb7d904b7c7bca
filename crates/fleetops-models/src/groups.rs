//! Right and group domain models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Right {
    pub id: Uuid,
    pub code: String,
    pub description: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_system_group: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GroupWithRights {
    #[serde(flatten)]
    pub group: Group,
    pub rights: Vec<Right>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow, ToSchema)]
pub struct GroupRight {
    pub group_id: Uuid,
    pub right_id: Uuid,
}

// DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateGroupDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,
    #[validate(length(max = 500, message = "Description must not exceed 500 characters"))]
    pub description: Option<String>,
    /// Right codes to grant right away
    pub right_codes: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateGroupDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: Option<String>,
    #[validate(length(max = 500, message = "Description must not exceed 500 characters"))]
    pub description: Option<String>,
}

/// Replaces a group's rights with exactly these codes.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SaveGroupRightsDto {
    pub right_codes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct GroupRightsEntry {
    pub group_id: Uuid,
    pub right_codes: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SaveAllGroupRightsDto {
    #[validate(length(min = 1, message = "At least one group must be provided"))]
    pub groups: Vec<GroupRightsEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    Saved,
    Failed,
}

/// Result of saving one group inside a save-all request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GroupSaveOutcome {
    pub group_id: Uuid,
    pub status: SaveStatus,
    pub right_count: usize,
    pub error: Option<String>,
}

impl GroupSaveOutcome {
    pub fn saved(group_id: Uuid, right_count: usize) -> Self {
        Self {
            group_id,
            status: SaveStatus::Saved,
            right_count,
            error: None,
        }
    }

    pub fn failed(group_id: Uuid, error: impl Into<String>) -> Self {
        Self {
            group_id,
            status: SaveStatus::Failed,
            right_count: 0,
            error: Some(error.into()),
        }
    }

    pub fn is_saved(&self) -> bool {
        self.status == SaveStatus::Saved
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SaveAllResponse {
    pub results: Vec<GroupSaveOutcome>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RightFilterParams {
    /// Filter by module (e.g. `TRUCK`, `TRUCK_MAINTENANCE`)
    pub module: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RightModule {
    pub module: String,
    pub rights: Vec<Right>,
}
