pub mod memory;
pub mod postgres;

pub use memory::MemoryPermissionStore;
pub use postgres::PgPermissionStore;

use async_trait::async_trait;
use uuid::Uuid;

use fleetops_core::{RightCatalog, Tier};
use fleetops_models::{Group, GroupRight, Right, User, UserCredentials};

use crate::error::StoreError;

#[async_trait]
pub trait PermissionStore: Send + Sync {
    // Rights
    /// Insert every catalog right whose code is missing. Returns how many were created.
    async fn ensure_rights(&self, catalog: &RightCatalog) -> Result<u64, StoreError>;
    async fn list_rights(&self) -> Result<Vec<Right>, StoreError>;

    // Groups
    /// Insert every tier whose group name is missing. Returns how many were created.
    async fn ensure_groups(&self, tiers: &[Tier]) -> Result<u64, StoreError>;
    async fn list_groups(&self) -> Result<Vec<Group>, StoreError>;
    async fn get_group(&self, id: Uuid) -> Result<Group, StoreError>;
    async fn get_group_by_name(&self, name: &str) -> Result<Group, StoreError>;
    async fn create_group(&self, name: &str, description: Option<&str>)
    -> Result<Group, StoreError>;
    async fn update_group(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Group, StoreError>;
    async fn delete_group(&self, id: Uuid) -> Result<(), StoreError>;

    // Group-Right
    async fn list_group_rights(&self, group_id: Uuid) -> Result<Vec<Right>, StoreError>;
    async fn list_assignments(&self) -> Result<Vec<GroupRight>, StoreError>;
    /// Insert pairs in one batch; pairs that already exist are skipped.
    /// Returns how many rows were actually inserted.
    async fn insert_assignments(&self, pairs: &[GroupRight]) -> Result<u64, StoreError>;
    /// Make `codes` the group's exact right set, atomically.
    ///
    /// Fails with [`StoreError::Invalid`] and changes nothing if any code is unknown.
    async fn replace_group_rights(
        &self,
        group_id: Uuid,
        codes: &[String],
    ) -> Result<Vec<Right>, StoreError>;

    // Users
    async fn create_user(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError>;
    async fn get_user(&self, id: Uuid) -> Result<User, StoreError>;
    async fn get_user_credentials(&self, email: &str) -> Result<UserCredentials, StoreError>;

    // User-Group
    async fn add_user_group(&self, user_id: Uuid, group_id: Uuid) -> Result<(), StoreError>;
    async fn remove_user_group(&self, user_id: Uuid, group_id: Uuid) -> Result<(), StoreError>;
    async fn list_user_groups(&self, user_id: Uuid) -> Result<Vec<Group>, StoreError>;
    /// Distinct right codes held through any of the user's groups, sorted.
    async fn get_user_permissions(&self, user_id: Uuid) -> Result<Vec<String>, StoreError>;
    async fn user_has_permission(&self, user_id: Uuid, code: &str) -> Result<bool, StoreError>;
}

/// Codes from `requested` that are not in `known`, deduplicated, in request order.
pub(crate) fn unknown_codes<'a>(
    requested: &'a [String],
    known: impl Fn(&str) -> bool,
) -> Vec<&'a str> {
    let mut unknown: Vec<&str> = Vec::new();
    for code in requested {
        if !known(code) && !unknown.contains(&code.as_str()) {
            unknown.push(code);
        }
    }
    unknown
}

pub(crate) fn unknown_codes_error(unknown: &[&str]) -> StoreError {
    StoreError::Invalid(format!("unknown right codes: {}", unknown.join(", ")))
}
