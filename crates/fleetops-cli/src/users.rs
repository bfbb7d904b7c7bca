use anyhow::{Context, Result};

use fleetops_auth::SessionPermissions;
use fleetops_core::hash_password;
use fleetops_db::PermissionStore;
use fleetops_models::User;

/// Create a user and put them in each named group.
///
/// Group names are resolved before the user is written, so an unknown name
/// leaves nothing behind.
pub async fn create_user_in_groups(
    store: &dyn PermissionStore,
    full_name: &str,
    email: &str,
    password: &str,
    group_names: &[String],
) -> Result<User> {
    let mut groups = Vec::with_capacity(group_names.len());
    for name in group_names {
        let group = store
            .get_group_by_name(name)
            .await
            .with_context(|| format!("Unknown group '{name}'"))?;
        groups.push(group);
    }

    let hashed = hash_password(password).map_err(|e| e.error)?;
    let user = store.create_user(full_name, email, &hashed).await?;

    for group in &groups {
        store.add_user_group(user.id, group.id).await?;
    }

    Ok(user)
}

/// Load the permission set a session for `email` would receive at login.
pub async fn session_for(store: &dyn PermissionStore, email: &str) -> Result<SessionPermissions> {
    let user = store
        .get_user_credentials(email)
        .await
        .with_context(|| format!("Unknown user '{email}'"))?;
    let permissions = store.get_user_permissions(user.id).await?;

    let mut session = SessionPermissions::default();
    session.load(permissions);
    Ok(session)
}

#[cfg(test)]
mod tests {
    use fleetops_auth::GuardDecision;
    use fleetops_core::{RightCatalog, Tier};
    use fleetops_db::MemoryPermissionStore;

    use super::*;

    #[tokio::test]
    async fn test_create_user_in_groups() {
        let store = MemoryPermissionStore::new();
        store.ensure_groups(&Tier::ALL).await.unwrap();

        let user = create_user_in_groups(
            &store,
            "Ada Dispatch",
            "ada@fleet.test",
            "secret123",
            &["LEVEL1".to_string(), "LEVEL3".to_string()],
        )
        .await
        .unwrap();

        let groups: Vec<String> = store
            .list_user_groups(user.id)
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(groups, vec!["LEVEL1", "LEVEL3"]);
    }

    #[tokio::test]
    async fn test_unknown_group_creates_nothing() {
        let store = MemoryPermissionStore::new();
        let err = create_user_in_groups(
            &store,
            "Ada",
            "ada@fleet.test",
            "secret123",
            &["Dispatchers".to_string()],
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("Dispatchers"));
        assert!(store.get_user_credentials("ada@fleet.test").await.is_err());
    }

    #[tokio::test]
    async fn test_session_for_reflects_group_rights() {
        let store = MemoryPermissionStore::new();
        let catalog = RightCatalog::new([("FUEL_VIEW", ""), ("FUEL_ADD", "")]).unwrap();
        store.ensure_rights(&catalog).await.unwrap();
        store.ensure_groups(&Tier::ALL).await.unwrap();
        let level3 = store.get_group_by_name("LEVEL3").await.unwrap();
        store
            .replace_group_rights(level3.id, &["FUEL_VIEW".to_string()])
            .await
            .unwrap();
        create_user_in_groups(
            &store,
            "Ada Dispatch",
            "ada@fleet.test",
            "secret123",
            &["LEVEL3".to_string()],
        )
        .await
        .unwrap();

        let session = session_for(&store, "ada@fleet.test").await.unwrap();
        assert!(session.is_loaded());
        assert_eq!(session.guard("FUEL_VIEW"), GuardDecision::Allow);
        assert_eq!(session.guard("FUEL_ADD"), GuardDecision::Deny);

        let err = session_for(&store, "ghost@fleet.test").await.unwrap_err();
        assert!(err.to_string().contains("ghost@fleet.test"));
    }
}
