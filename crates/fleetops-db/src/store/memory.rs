//! In-process [`PermissionStore`] used by the CLI dry runs and the engine tests.
//!
//! Uniqueness rules match the SQL schema: right codes, group names, user
//! emails, `(group, right)` and `(user, group)` pairs. All state sits behind
//! one `RwLock`, so every method is atomic.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use fleetops_core::{RightCatalog, Tier};
use fleetops_models::{Group, GroupRight, Right, User, UserCredentials};

use super::{PermissionStore, unknown_codes, unknown_codes_error};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct MemoryState {
    rights: Vec<Right>,
    groups: Vec<Group>,
    group_rights: BTreeSet<(Uuid, Uuid)>,
    users: Vec<UserCredentials>,
    user_groups: BTreeSet<(Uuid, Uuid)>,
}

impl MemoryState {
    fn group(&self, id: Uuid) -> Result<&Group, StoreError> {
        self.groups
            .iter()
            .find(|g| g.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("group {id}")))
    }

    fn right_by_code(&self, code: &str) -> Option<&Right> {
        self.rights.iter().find(|r| r.code == code)
    }

    fn rights_of(&self, group_id: Uuid) -> Vec<Right> {
        let mut rights: Vec<Right> = self
            .group_rights
            .iter()
            .filter(|(g, _)| *g == group_id)
            .filter_map(|(_, r)| self.rights.iter().find(|right| right.id == *r))
            .cloned()
            .collect();
        rights.sort_by(|a, b| a.code.cmp(&b.code));
        rights
    }

    fn codes_of_user(&self, user_id: Uuid) -> BTreeSet<String> {
        self.user_groups
            .iter()
            .filter(|(u, _)| *u == user_id)
            .flat_map(|(_, g)| self.rights_of(*g))
            .map(|r| r.code)
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct MemoryPermissionStore {
    state: RwLock<MemoryState>,
}

impl MemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `(group, right)` rows currently stored.
    pub async fn assignment_count(&self) -> usize {
        self.state.read().await.group_rights.len()
    }
}

#[async_trait]
impl PermissionStore for MemoryPermissionStore {
    async fn ensure_rights(&self, catalog: &RightCatalog) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let mut created = 0;

        for entry in catalog.entries() {
            if state.right_by_code(entry.code.as_str()).is_some() {
                continue;
            }
            state.rights.push(Right {
                id: Uuid::new_v4(),
                code: entry.code.to_string(),
                description: entry.description.clone(),
                created_at: Utc::now(),
            });
            created += 1;
        }

        Ok(created)
    }

    async fn list_rights(&self) -> Result<Vec<Right>, StoreError> {
        let mut rights = self.state.read().await.rights.clone();
        rights.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(rights)
    }

    async fn ensure_groups(&self, tiers: &[Tier]) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let mut created = 0;

        for tier in tiers {
            if state.groups.iter().any(|g| g.name == tier.name()) {
                continue;
            }
            let now = Utc::now();
            state.groups.push(Group {
                id: Uuid::new_v4(),
                name: tier.name().to_string(),
                description: Some(tier.description().to_string()),
                is_system_group: tier.is_system_group(),
                created_at: now,
                updated_at: now,
            });
            created += 1;
        }

        Ok(created)
    }

    async fn list_groups(&self) -> Result<Vec<Group>, StoreError> {
        let mut groups = self.state.read().await.groups.clone();
        groups.sort_by(|a, b| {
            b.is_system_group
                .cmp(&a.is_system_group)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(groups)
    }

    async fn get_group(&self, id: Uuid) -> Result<Group, StoreError> {
        self.state.read().await.group(id).cloned()
    }

    async fn get_group_by_name(&self, name: &str) -> Result<Group, StoreError> {
        self.state
            .read()
            .await
            .groups
            .iter()
            .find(|g| g.name == name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("group '{name}'")))
    }

    async fn create_group(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Group, StoreError> {
        let mut state = self.state.write().await;
        if state.groups.iter().any(|g| g.name == name) {
            return Err(StoreError::Conflict(format!("group '{name}' already exists")));
        }

        let now = Utc::now();
        let group = Group {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.map(str::to_string),
            is_system_group: false,
            created_at: now,
            updated_at: now,
        };
        state.groups.push(group.clone());
        Ok(group)
    }

    async fn update_group(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Group, StoreError> {
        let mut state = self.state.write().await;
        let current = state.group(id)?;

        if let Some(new_name) = name {
            if current.is_system_group && new_name != current.name {
                return Err(StoreError::Protected(format!(
                    "system group '{}' cannot be renamed",
                    current.name
                )));
            }
            if state.groups.iter().any(|g| g.name == new_name && g.id != id) {
                return Err(StoreError::Conflict(format!(
                    "group '{new_name}' already exists"
                )));
            }
        }

        let group = state
            .groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("group {id}")))?;
        if let Some(new_name) = name {
            group.name = new_name.to_string();
        }
        if let Some(new_description) = description {
            group.description = Some(new_description.to_string());
        }
        group.updated_at = Utc::now();

        Ok(group.clone())
    }

    async fn delete_group(&self, id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let group = state.group(id)?;
        if group.is_system_group {
            return Err(StoreError::Protected(format!(
                "system group '{}' cannot be deleted",
                group.name
            )));
        }

        state.groups.retain(|g| g.id != id);
        state.group_rights.retain(|(g, _)| *g != id);
        state.user_groups.retain(|(_, g)| *g != id);
        Ok(())
    }

    async fn list_group_rights(&self, group_id: Uuid) -> Result<Vec<Right>, StoreError> {
        Ok(self.state.read().await.rights_of(group_id))
    }

    async fn list_assignments(&self) -> Result<Vec<GroupRight>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .group_rights
            .iter()
            .map(|(group_id, right_id)| GroupRight {
                group_id: *group_id,
                right_id: *right_id,
            })
            .collect())
    }

    async fn insert_assignments(&self, pairs: &[GroupRight]) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;

        for pair in pairs {
            state.group(pair.group_id)?;
            if !state.rights.iter().any(|r| r.id == pair.right_id) {
                return Err(StoreError::NotFound(format!("right {}", pair.right_id)));
            }
        }

        let inserted = pairs
            .iter()
            .filter(|p| state.group_rights.insert((p.group_id, p.right_id)))
            .count();

        Ok(inserted as u64)
    }

    async fn replace_group_rights(
        &self,
        group_id: Uuid,
        codes: &[String],
    ) -> Result<Vec<Right>, StoreError> {
        let mut state = self.state.write().await;
        state.group(group_id)?;

        let unknown = unknown_codes(codes, |code| state.right_by_code(code).is_some());
        if !unknown.is_empty() {
            return Err(unknown_codes_error(&unknown));
        }

        let right_ids: BTreeSet<Uuid> = codes
            .iter()
            .filter_map(|code| state.right_by_code(code).map(|r| r.id))
            .collect();

        state.group_rights.retain(|(g, _)| *g != group_id);
        for right_id in right_ids {
            state.group_rights.insert((group_id, right_id));
        }
        if let Some(group) = state.groups.iter_mut().find(|g| g.id == group_id) {
            group.updated_at = Utc::now();
        }

        Ok(state.rights_of(group_id))
    }

    async fn create_user(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.email == email) {
            return Err(StoreError::Conflict(format!(
                "email '{email}' is already registered"
            )));
        }

        let now = Utc::now();
        let row = UserCredentials {
            id: Uuid::new_v4(),
            full_name: full_name.to_string(),
            email: email.to_string(),
            password: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.users.push(row.clone());
        Ok(row.into())
    }

    async fn get_user(&self, id: Uuid) -> Result<User, StoreError> {
        self.state
            .read()
            .await
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .map(User::from)
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))
    }

    async fn get_user_credentials(&self, email: &str) -> Result<UserCredentials, StoreError> {
        self.state
            .read()
            .await
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("user '{email}'")))
    }

    async fn add_user_group(&self, user_id: Uuid, group_id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let user_exists = state.users.iter().any(|u| u.id == user_id);
        if !user_exists || state.group(group_id).is_err() {
            return Err(StoreError::NotFound("user or group not found".to_string()));
        }
        state.user_groups.insert((user_id, group_id));
        Ok(())
    }

    async fn remove_user_group(&self, user_id: Uuid, group_id: Uuid) -> Result<(), StoreError> {
        if self
            .state
            .write()
            .await
            .user_groups
            .remove(&(user_id, group_id))
        {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!(
                "user {user_id} is not a member of group {group_id}"
            )))
        }
    }

    async fn list_user_groups(&self, user_id: Uuid) -> Result<Vec<Group>, StoreError> {
        let state = self.state.read().await;
        let mut groups: Vec<Group> = state
            .user_groups
            .iter()
            .filter(|(u, _)| *u == user_id)
            .filter_map(|(_, g)| state.groups.iter().find(|group| group.id == *g))
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn get_user_permissions(&self, user_id: Uuid) -> Result<Vec<String>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .codes_of_user(user_id)
            .into_iter()
            .collect())
    }

    async fn user_has_permission(&self, user_id: Uuid, code: &str) -> Result<bool, StoreError> {
        Ok(self.state.read().await.codes_of_user(user_id).contains(code))
    }
}
