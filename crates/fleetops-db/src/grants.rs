//! Grant ceiling for the management API.
//!
//! Holding `GROUP_EDIT` or `USER_EDIT` lets a user hand out rights, but only
//! rights they already hold. Membership of a system group can only be given
//! by one of its members.

use std::collections::HashSet;

use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{PermissionStore, unknown_codes, unknown_codes_error};

/// Who is granting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grantor {
    /// Startup seeding and the administrative CLI. No ceiling.
    System,
    /// An authenticated API caller, limited to the rights they hold.
    User(Uuid),
}

/// Check that `grantor` may set `codes` as the rights of `group_id`
/// (`None` for a group that does not exist yet).
///
/// Codes the group already holds are not new grants and are always allowed,
/// so resubmitting an unchanged set never fails. Unknown codes are reported
/// before the ceiling.
pub async fn check_rights_grant(
    store: &dyn PermissionStore,
    grantor: Grantor,
    group_id: Option<Uuid>,
    codes: &[String],
) -> Result<(), StoreError> {
    let known: HashSet<String> = store.list_rights().await?.into_iter().map(|r| r.code).collect();
    let unknown = unknown_codes(codes, |code| known.contains(code));
    if !unknown.is_empty() {
        return Err(unknown_codes_error(&unknown));
    }

    let Grantor::User(caller) = grantor else {
        return Ok(());
    };

    let current: HashSet<String> = match group_id {
        Some(id) => {
            store.get_group(id).await?;
            store
                .list_group_rights(id)
                .await?
                .into_iter()
                .map(|r| r.code)
                .collect()
        }
        None => HashSet::new(),
    };
    let held: HashSet<String> = store.get_user_permissions(caller).await?.into_iter().collect();

    let beyond = unknown_codes(codes, |code| current.contains(code) || held.contains(code));
    if !beyond.is_empty() {
        return Err(StoreError::Forbidden(format!(
            "cannot grant rights you do not hold: {}",
            beyond.join(", ")
        )));
    }

    Ok(())
}

/// Check that `grantor` may add a user to `group_id`.
///
/// The caller must hold every right of the group, and must be a member of it
/// when it is a system group.
pub async fn check_membership_grant(
    store: &dyn PermissionStore,
    grantor: Grantor,
    group_id: Uuid,
) -> Result<(), StoreError> {
    let group = store.get_group(group_id).await?;

    let Grantor::User(caller) = grantor else {
        return Ok(());
    };

    if group.is_system_group {
        let member = store
            .list_user_groups(caller)
            .await?
            .iter()
            .any(|g| g.id == group.id);
        if !member {
            return Err(StoreError::Forbidden(format!(
                "only members of system group '{}' can add users to it",
                group.name
            )));
        }
    }

    let held: HashSet<String> = store.get_user_permissions(caller).await?.into_iter().collect();
    let group_codes: Vec<String> = store
        .list_group_rights(group.id)
        .await?
        .into_iter()
        .map(|r| r.code)
        .collect();

    let beyond = unknown_codes(&group_codes, |code| held.contains(code));
    if !beyond.is_empty() {
        return Err(StoreError::Forbidden(format!(
            "group '{}' grants rights you do not hold: {}",
            group.name,
            beyond.join(", ")
        )));
    }

    Ok(())
}
