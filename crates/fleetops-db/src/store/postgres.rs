use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use fleetops_core::{RightCatalog, Tier};
use fleetops_models::{Group, GroupRight, Right, User, UserCredentials};

use super::{PermissionStore, unknown_codes, unknown_codes_error};
use crate::error::StoreError;

const RIGHT_COLUMNS: &str = "id, code, description, created_at";
const GROUP_COLUMNS: &str = "id, name, description, is_system_group, created_at, updated_at";
const USER_COLUMNS: &str = "id, full_name, email, created_at, updated_at";

#[derive(Clone)]
pub struct PgPermissionStore {
    pool: PgPool,
}

impl PgPermissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn require_group(&self, id: Uuid) -> Result<Group, StoreError> {
        self.get_group(id).await
    }
}

#[async_trait]
impl PermissionStore for PgPermissionStore {
    // --- Rights ---

    async fn ensure_rights(&self, catalog: &RightCatalog) -> Result<u64, StoreError> {
        let (codes, descriptions): (Vec<String>, Vec<String>) = catalog
            .entries()
            .iter()
            .map(|e| (e.code.to_string(), e.description.clone()))
            .unzip();

        let result = sqlx::query(
            "INSERT INTO rights (code, description)
             SELECT * FROM UNNEST($1::text[], $2::text[])
             ON CONFLICT (code) DO NOTHING",
        )
        .bind(&codes)
        .bind(&descriptions)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn list_rights(&self) -> Result<Vec<Right>, StoreError> {
        let rights = sqlx::query_as::<_, Right>(&format!(
            "SELECT {RIGHT_COLUMNS} FROM rights ORDER BY code"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rights)
    }

    // --- Groups ---

    async fn ensure_groups(&self, tiers: &[Tier]) -> Result<u64, StoreError> {
        let names: Vec<String> = tiers.iter().map(|t| t.name().to_string()).collect();
        let descriptions: Vec<String> = tiers.iter().map(|t| t.description().to_string()).collect();
        let system: Vec<bool> = tiers.iter().map(|t| t.is_system_group()).collect();

        let result = sqlx::query(
            "INSERT INTO groups (name, description, is_system_group)
             SELECT * FROM UNNEST($1::text[], $2::text[], $3::bool[])
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(&names)
        .bind(&descriptions)
        .bind(&system)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn list_groups(&self) -> Result<Vec<Group>, StoreError> {
        let groups = sqlx::query_as::<_, Group>(&format!(
            "SELECT {GROUP_COLUMNS} FROM groups ORDER BY is_system_group DESC, name"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(groups)
    }

    async fn get_group(&self, id: Uuid) -> Result<Group, StoreError> {
        sqlx::query_as::<_, Group>(&format!("SELECT {GROUP_COLUMNS} FROM groups WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("group {id}")))
    }

    async fn get_group_by_name(&self, name: &str) -> Result<Group, StoreError> {
        sqlx::query_as::<_, Group>(&format!(
            "SELECT {GROUP_COLUMNS} FROM groups WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("group '{name}'")))
    }

    async fn create_group(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Group, StoreError> {
        sqlx::query_as::<_, Group>(&format!(
            "INSERT INTO groups (name, description) VALUES ($1, $2) RETURNING {GROUP_COLUMNS}"
        ))
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::unique_or(e, format!("group '{name}' already exists")))
    }

    async fn update_group(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Group, StoreError> {
        let group = self.require_group(id).await?;
        if group.is_system_group && name.is_some_and(|n| n != group.name) {
            return Err(StoreError::Protected(format!(
                "system group '{}' cannot be renamed",
                group.name
            )));
        }

        sqlx::query_as::<_, Group>(&format!(
            "UPDATE groups
             SET name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {GROUP_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            StoreError::unique_or(
                e,
                format!("group '{}' already exists", name.unwrap_or_default()),
            )
        })
    }

    async fn delete_group(&self, id: Uuid) -> Result<(), StoreError> {
        let group = self.require_group(id).await?;
        if group.is_system_group {
            return Err(StoreError::Protected(format!(
                "system group '{}' cannot be deleted",
                group.name
            )));
        }

        sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // --- Group-Right ---

    async fn list_group_rights(&self, group_id: Uuid) -> Result<Vec<Right>, StoreError> {
        let rights = sqlx::query_as::<_, Right>(
            "SELECT r.id, r.code, r.description, r.created_at
             FROM rights r
             JOIN group_rights gr ON gr.right_id = r.id
             WHERE gr.group_id = $1
             ORDER BY r.code",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rights)
    }

    async fn list_assignments(&self) -> Result<Vec<GroupRight>, StoreError> {
        let pairs = sqlx::query_as::<_, GroupRight>("SELECT group_id, right_id FROM group_rights")
            .fetch_all(&self.pool)
            .await?;
        Ok(pairs)
    }

    async fn insert_assignments(&self, pairs: &[GroupRight]) -> Result<u64, StoreError> {
        if pairs.is_empty() {
            return Ok(0);
        }

        let (group_ids, right_ids): (Vec<Uuid>, Vec<Uuid>) =
            pairs.iter().map(|p| (p.group_id, p.right_id)).unzip();

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO group_rights (group_id, right_id)
             SELECT * FROM UNNEST($1::uuid[], $2::uuid[])
             ON CONFLICT (group_id, right_id) DO NOTHING",
        )
        .bind(&group_ids)
        .bind(&right_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(result.rows_affected())
    }

    async fn replace_group_rights(
        &self,
        group_id: Uuid,
        codes: &[String],
    ) -> Result<Vec<Right>, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, Uuid>("SELECT id FROM groups WHERE id = $1 FOR UPDATE")
            .bind(group_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("group {group_id}")))?;

        let rights = sqlx::query_as::<_, Right>(&format!(
            "SELECT {RIGHT_COLUMNS} FROM rights WHERE code = ANY($1) ORDER BY code"
        ))
        .bind(codes)
        .fetch_all(&mut *tx)
        .await?;

        let unknown = unknown_codes(codes, |code| rights.iter().any(|r| r.code == code));
        if !unknown.is_empty() {
            return Err(unknown_codes_error(&unknown));
        }

        sqlx::query("DELETE FROM group_rights WHERE group_id = $1")
            .bind(group_id)
            .execute(&mut *tx)
            .await?;

        let right_ids: Vec<Uuid> = rights.iter().map(|r| r.id).collect();
        sqlx::query(
            "INSERT INTO group_rights (group_id, right_id)
             SELECT $1, UNNEST($2::uuid[])",
        )
        .bind(group_id)
        .bind(&right_ids)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE groups SET updated_at = NOW() WHERE id = $1")
            .bind(group_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(rights)
    }

    // --- Users ---

    async fn create_user(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (full_name, email, password)
             VALUES ($1, $2, $3)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(full_name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::unique_or(e, format!("email '{email}' is already registered")))
    }

    async fn get_user(&self, id: Uuid) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))
    }

    async fn get_user_credentials(&self, email: &str) -> Result<UserCredentials, StoreError> {
        sqlx::query_as::<_, UserCredentials>(
            "SELECT id, full_name, email, password, created_at, updated_at
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("user '{email}'")))
    }

    // --- User-Group ---

    async fn add_user_group(&self, user_id: Uuid, group_id: Uuid) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO user_groups (user_id, group_id)
             VALUES ($1, $2)
             ON CONFLICT (user_id, group_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(group_id)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::foreign_key_or(e, "user or group not found"))?;
        Ok(())
    }

    async fn remove_user_group(&self, user_id: Uuid, group_id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM user_groups WHERE user_id = $1 AND group_id = $2")
            .bind(user_id)
            .bind(group_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "user {user_id} is not a member of group {group_id}"
            )));
        }
        Ok(())
    }

    async fn list_user_groups(&self, user_id: Uuid) -> Result<Vec<Group>, StoreError> {
        let groups = sqlx::query_as::<_, Group>(
            "SELECT g.id, g.name, g.description, g.is_system_group, g.created_at, g.updated_at
             FROM groups g
             JOIN user_groups ug ON ug.group_id = g.id
             WHERE ug.user_id = $1
             ORDER BY g.name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(groups)
    }

    async fn get_user_permissions(&self, user_id: Uuid) -> Result<Vec<String>, StoreError> {
        let codes = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT r.code
             FROM user_groups ug
             JOIN group_rights gr ON gr.group_id = ug.group_id
             JOIN rights r ON r.id = gr.right_id
             WHERE ug.user_id = $1
             ORDER BY r.code",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(codes)
    }

    async fn user_has_permission(&self, user_id: Uuid, code: &str) -> Result<bool, StoreError> {
        let granted = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                 SELECT 1
                 FROM user_groups ug
                 JOIN group_rights gr ON gr.group_id = ug.group_id
                 JOIN rights r ON r.id = gr.right_id
                 WHERE ug.user_id = $1 AND r.code = $2
             )",
        )
        .bind(user_id)
        .bind(code)
        .fetch_one(&self.pool)
        .await?;
        Ok(granted)
    }
}
