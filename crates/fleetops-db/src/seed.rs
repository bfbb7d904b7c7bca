//! Startup seeding: make sure every right, every tier group and every
//! rule-derived `(group, right)` pair exists.
//!
//! Seeding only ever adds. Rights and groups are upserted by code and name,
//! then the pairs the tier rules require are diffed against what is stored
//! and the missing ones are inserted in a single batch. A second run, or two
//! runs racing each other, ends with the same rows as one run.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{error, info, instrument, warn};

use fleetops_core::tiers::compute_desired_assignments;
use fleetops_core::{RightCatalog, Tier, TierRule};
use fleetops_models::{GroupRight, GroupRightsEntry, GroupSaveOutcome, Right};

use crate::error::StoreError;
use crate::grants::{Grantor, check_rights_grant};
use crate::store::PermissionStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub rights_created: u64,
    pub groups_created: u64,
    pub assignments_created: u64,
    pub assignments_desired: usize,
}

/// Ensure rights and groups, then reconcile assignments.
///
/// Any storage error aborts the run and is returned; a later run picks up
/// where this one stopped.
#[instrument(skip_all, fields(rights = catalog.len(), tiers = rules.len()))]
pub async fn run_seed(
    store: &dyn PermissionStore,
    catalog: &RightCatalog,
    rules: &[(Tier, TierRule)],
) -> Result<SeedReport, StoreError> {
    let result = seed_inner(store, catalog, rules).await;

    match &result {
        Ok(report) => info!(
            rights_created = report.rights_created,
            groups_created = report.groups_created,
            assignments_created = report.assignments_created,
            assignments_desired = report.assignments_desired,
            "Permission seeding complete"
        ),
        Err(e) => error!(error = %e, "Permission seeding failed"),
    }

    result
}

async fn seed_inner(
    store: &dyn PermissionStore,
    catalog: &RightCatalog,
    rules: &[(Tier, TierRule)],
) -> Result<SeedReport, StoreError> {
    let rights_created = store.ensure_rights(catalog).await?;

    let tiers: Vec<Tier> = rules.iter().map(|(tier, _)| *tier).collect();
    let groups_created = store.ensure_groups(&tiers).await?;

    let (assignments_created, assignments_desired) =
        reconcile_assignments(store, catalog, rules).await?;

    Ok(SeedReport {
        rights_created,
        groups_created,
        assignments_created,
        assignments_desired,
    })
}

/// Insert the rule-derived pairs that are missing. Returns `(inserted, desired)`.
pub async fn reconcile_assignments(
    store: &dyn PermissionStore,
    catalog: &RightCatalog,
    rules: &[(Tier, TierRule)],
) -> Result<(u64, usize), StoreError> {
    let desired = compute_desired_assignments(catalog, rules);

    let right_ids: HashMap<String, _> = store
        .list_rights()
        .await?
        .into_iter()
        .map(|r| (r.code, r.id))
        .collect();
    let group_ids: HashMap<String, _> = store
        .list_groups()
        .await?
        .into_iter()
        .map(|g| (g.name, g.id))
        .collect();
    let existing: HashSet<GroupRight> = store.list_assignments().await?.into_iter().collect();

    let mut missing = Vec::new();
    for (tier, code) in &desired {
        let group_id = *group_ids
            .get(tier.name())
            .ok_or_else(|| StoreError::NotFound(format!("group '{}'", tier.name())))?;
        let right_id = *right_ids
            .get(code.as_str())
            .ok_or_else(|| StoreError::NotFound(format!("right '{code}'")))?;

        let pair = GroupRight { group_id, right_id };
        if !existing.contains(&pair) {
            missing.push(pair);
        }
    }

    let inserted = store.insert_assignments(&missing).await?;
    Ok((inserted, desired.len()))
}

/// Save several groups' right sets, one independent replace per group.
///
/// Each group is checked against `grantor`'s ceiling before it is replaced.
/// A failing group is reported in its outcome and does not stop the others.
#[instrument(skip_all, fields(groups = entries.len()))]
pub async fn save_all_groups(
    store: &dyn PermissionStore,
    grantor: Grantor,
    entries: &[GroupRightsEntry],
) -> Vec<GroupSaveOutcome> {
    let mut outcomes = Vec::with_capacity(entries.len());

    for entry in entries {
        let outcome = match save_group(store, grantor, entry).await {
            Ok(rights) => GroupSaveOutcome::saved(entry.group_id, rights.len()),
            Err(e) => {
                warn!(group_id = %entry.group_id, error = %e, "Group rights save failed");
                GroupSaveOutcome::failed(entry.group_id, e.to_string())
            }
        };
        outcomes.push(outcome);
    }

    outcomes
}

async fn save_group(
    store: &dyn PermissionStore,
    grantor: Grantor,
    entry: &GroupRightsEntry,
) -> Result<Vec<Right>, StoreError> {
    check_rights_grant(store, grantor, Some(entry.group_id), &entry.right_codes).await?;
    store
        .replace_group_rights(entry.group_id, &entry.right_codes)
        .await
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use async_trait::async_trait;
    use fleetops_core::tiers::default_rules;
    use fleetops_models::{Group, User, UserCredentials};
    use uuid::Uuid;

    use super::*;
    use crate::store::MemoryPermissionStore;

    /// Memory store whose batch insert of assignments always fails.
    struct BrokenAssignments {
        inner: MemoryPermissionStore,
    }

    #[async_trait]
    impl PermissionStore for BrokenAssignments {
        async fn ensure_rights(&self, catalog: &RightCatalog) -> Result<u64, StoreError> {
            self.inner.ensure_rights(catalog).await
        }
        async fn list_rights(&self) -> Result<Vec<Right>, StoreError> {
            self.inner.list_rights().await
        }
        async fn ensure_groups(&self, tiers: &[Tier]) -> Result<u64, StoreError> {
            self.inner.ensure_groups(tiers).await
        }
        async fn list_groups(&self) -> Result<Vec<Group>, StoreError> {
            self.inner.list_groups().await
        }
        async fn get_group(&self, id: Uuid) -> Result<Group, StoreError> {
            self.inner.get_group(id).await
        }
        async fn get_group_by_name(&self, name: &str) -> Result<Group, StoreError> {
            self.inner.get_group_by_name(name).await
        }
        async fn create_group(
            &self,
            name: &str,
            description: Option<&str>,
        ) -> Result<Group, StoreError> {
            self.inner.create_group(name, description).await
        }
        async fn update_group(
            &self,
            id: Uuid,
            name: Option<&str>,
            description: Option<&str>,
        ) -> Result<Group, StoreError> {
            self.inner.update_group(id, name, description).await
        }
        async fn delete_group(&self, id: Uuid) -> Result<(), StoreError> {
            self.inner.delete_group(id).await
        }
        async fn list_group_rights(&self, group_id: Uuid) -> Result<Vec<Right>, StoreError> {
            self.inner.list_group_rights(group_id).await
        }
        async fn list_assignments(&self) -> Result<Vec<GroupRight>, StoreError> {
            self.inner.list_assignments().await
        }
        async fn insert_assignments(&self, _pairs: &[GroupRight]) -> Result<u64, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn replace_group_rights(
            &self,
            group_id: Uuid,
            codes: &[String],
        ) -> Result<Vec<Right>, StoreError> {
            self.inner.replace_group_rights(group_id, codes).await
        }
        async fn create_user(
            &self,
            full_name: &str,
            email: &str,
            password_hash: &str,
        ) -> Result<User, StoreError> {
            self.inner.create_user(full_name, email, password_hash).await
        }
        async fn get_user(&self, id: Uuid) -> Result<User, StoreError> {
            self.inner.get_user(id).await
        }
        async fn get_user_credentials(&self, email: &str) -> Result<UserCredentials, StoreError> {
            self.inner.get_user_credentials(email).await
        }
        async fn add_user_group(&self, user_id: Uuid, group_id: Uuid) -> Result<(), StoreError> {
            self.inner.add_user_group(user_id, group_id).await
        }
        async fn remove_user_group(
            &self,
            user_id: Uuid,
            group_id: Uuid,
        ) -> Result<(), StoreError> {
            self.inner.remove_user_group(user_id, group_id).await
        }
        async fn list_user_groups(&self, user_id: Uuid) -> Result<Vec<Group>, StoreError> {
            self.inner.list_user_groups(user_id).await
        }
        async fn get_user_permissions(&self, user_id: Uuid) -> Result<Vec<String>, StoreError> {
            self.inner.get_user_permissions(user_id).await
        }
        async fn user_has_permission(
            &self,
            user_id: Uuid,
            code: &str,
        ) -> Result<bool, StoreError> {
            self.inner.user_has_permission(user_id, code).await
        }
    }

    async fn held(store: &MemoryPermissionStore, group: &str) -> BTreeSet<String> {
        let group = store.get_group_by_name(group).await.unwrap();
        store
            .list_group_rights(group.id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.code)
            .collect()
    }

    fn scenario_catalog() -> RightCatalog {
        RightCatalog::new([
            ("TRIP_VIEW", "View trips"),
            ("TRIP_DELETE", "Delete trips"),
            ("OVERTIME_VIEW", "View overtime"),
            ("OVERTIME_ADD", "Add overtime"),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = MemoryPermissionStore::new();
        let catalog = RightCatalog::standard().unwrap();
        let rules = default_rules();

        let first = run_seed(&store, &catalog, &rules).await.unwrap();
        assert_eq!(first.rights_created, catalog.len() as u64);
        assert_eq!(first.groups_created, 5);
        assert_eq!(first.assignments_created as usize, first.assignments_desired);
        let rows = store.assignment_count().await;

        let second = run_seed(&store, &catalog, &rules).await.unwrap();
        assert_eq!(
            second,
            SeedReport {
                assignments_desired: first.assignments_desired,
                ..SeedReport::default()
            }
        );
        assert_eq!(store.assignment_count().await, rows);
    }

    #[tokio::test]
    async fn test_scenario_catalog() {
        let store = MemoryPermissionStore::new();
        run_seed(&store, &scenario_catalog(), &default_rules())
            .await
            .unwrap();

        let all: BTreeSet<String> = ["TRIP_VIEW", "TRIP_DELETE", "OVERTIME_VIEW", "OVERTIME_ADD"]
            .into_iter()
            .map(String::from)
            .collect();
        let views: BTreeSet<String> = ["TRIP_VIEW", "OVERTIME_VIEW"]
            .into_iter()
            .map(String::from)
            .collect();

        assert_eq!(held(&store, "SuperAdmin").await, all);
        assert!(held(&store, "Admin").await.is_empty());
        assert!(held(&store, "LEVEL1").await.is_empty());
        assert!(held(&store, "LEVEL2").await.is_empty());
        assert_eq!(held(&store, "LEVEL3").await, views);
    }

    #[tokio::test]
    async fn test_seeded_tiers_keep_subset_chain() {
        let store = MemoryPermissionStore::new();
        let catalog = RightCatalog::standard().unwrap();
        run_seed(&store, &catalog, &default_rules()).await.unwrap();

        let super_admin = held(&store, "SuperAdmin").await;
        let admin = held(&store, "Admin").await;
        let level1 = held(&store, "LEVEL1").await;
        let level2 = held(&store, "LEVEL2").await;

        assert_eq!(super_admin.len(), catalog.len());
        assert!(admin.is_subset(&super_admin));
        assert!(level1.is_subset(&admin));
        assert!(level2.is_subset(&level1));
        assert!(!admin.iter().any(|c| c.starts_with("TRUCK_MAINTENANCE_")));
        assert!(held(&store, "LEVEL3").await.contains("TRUCK_MAINTENANCE_VIEW"));
    }

    #[tokio::test]
    async fn test_seed_adds_new_catalog_rights() {
        let store = MemoryPermissionStore::new();
        let rules = default_rules();
        run_seed(&store, &scenario_catalog(), &rules).await.unwrap();

        let grown = RightCatalog::new([
            ("TRIP_VIEW", "View trips"),
            ("TRIP_DELETE", "Delete trips"),
            ("OVERTIME_VIEW", "View overtime"),
            ("OVERTIME_ADD", "Add overtime"),
            ("FUEL_VIEW", "View fuel"),
        ])
        .unwrap();
        let report = run_seed(&store, &grown, &rules).await.unwrap();

        assert_eq!(report.rights_created, 1);
        // SuperAdmin, Admin, LEVEL1, LEVEL2 and LEVEL3 all gain FUEL_VIEW
        assert_eq!(report.assignments_created, 5);
    }

    #[tokio::test]
    async fn test_concurrent_seeds_match_single_run() {
        let catalog = RightCatalog::standard().unwrap();
        let rules = default_rules();

        let single = MemoryPermissionStore::new();
        run_seed(&single, &catalog, &rules).await.unwrap();
        let expected = single.assignment_count().await;

        let shared = Arc::new(MemoryPermissionStore::new());
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let store = Arc::clone(&shared);
                let catalog = catalog.clone();
                let rules = rules.clone();
                tokio::spawn(async move { run_seed(&*store, &catalog, &rules).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            created += handle.await.unwrap().unwrap().assignments_created;
        }

        assert_eq!(shared.assignment_count().await, expected);
        assert_eq!(created as usize, expected);
        assert_eq!(shared.list_groups().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_level2_save_replaces_exactly() {
        let store = MemoryPermissionStore::new();
        let catalog = RightCatalog::standard().unwrap();
        run_seed(&store, &catalog, &default_rules()).await.unwrap();

        let level2 = store.get_group_by_name("LEVEL2").await.unwrap();
        let outcomes = save_all_groups(
            &store,
            Grantor::System,
            &[GroupRightsEntry {
                group_id: level2.id,
                right_codes: vec!["FUEL_VIEW".to_string()],
            }],
        )
        .await;

        assert_eq!(outcomes, vec![GroupSaveOutcome::saved(level2.id, 1)]);
        assert_eq!(
            held(&store, "LEVEL2").await,
            BTreeSet::from(["FUEL_VIEW".to_string()])
        );
    }

    #[tokio::test]
    async fn test_save_all_reports_each_group() {
        let store = MemoryPermissionStore::new();
        let catalog = RightCatalog::standard().unwrap();
        run_seed(&store, &catalog, &default_rules()).await.unwrap();

        let level1 = store.get_group_by_name("LEVEL1").await.unwrap();
        let level3 = store.get_group_by_name("LEVEL3").await.unwrap();
        let before_level3 = held(&store, "LEVEL3").await;
        let missing = Uuid::new_v4();

        let outcomes = save_all_groups(
            &store,
            Grantor::System,
            &[
                GroupRightsEntry {
                    group_id: missing,
                    right_codes: vec!["ZONE_VIEW".to_string()],
                },
                GroupRightsEntry {
                    group_id: level3.id,
                    right_codes: vec!["NOT_A_REAL_VIEW".to_string()],
                },
                GroupRightsEntry {
                    group_id: level1.id,
                    right_codes: vec!["ZONE_VIEW".to_string(), "ZONE_EDIT".to_string()],
                },
            ],
        )
        .await;

        assert!(!outcomes[0].is_saved());
        assert!(!outcomes[1].is_saved());
        assert_eq!(outcomes[2], GroupSaveOutcome::saved(level1.id, 2));

        assert_eq!(held(&store, "LEVEL3").await, before_level3);
        assert_eq!(held(&store, "LEVEL1").await.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_seed_aborts_and_rerun_completes() {
        let broken = BrokenAssignments {
            inner: MemoryPermissionStore::new(),
        };
        let catalog = RightCatalog::standard().unwrap();
        let rules = default_rules();

        let err = run_seed(&broken, &catalog, &rules).await.unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
        assert_eq!(broken.inner.assignment_count().await, 0);

        let healthy = broken.inner;
        let report = run_seed(&healthy, &catalog, &rules).await.unwrap();
        assert_eq!(report.rights_created, 0);
        assert_eq!(report.groups_created, 0);
        assert_eq!(report.assignments_created as usize, report.assignments_desired);
        assert_eq!(healthy.assignment_count().await, report.assignments_desired);
    }

    #[tokio::test]
    async fn test_super_admin_unchanged_set_saves() {
        let store = MemoryPermissionStore::new();
        let catalog = RightCatalog::standard().unwrap();
        run_seed(&store, &catalog, &default_rules()).await.unwrap();
        let super_admin = store.get_group_by_name("SuperAdmin").await.unwrap();

        let outcomes = save_all_groups(
            &store,
            Grantor::System,
            &[GroupRightsEntry {
                group_id: super_admin.id,
                right_codes: held(&store, "SuperAdmin").await.into_iter().collect(),
            }],
        )
        .await;

        assert_eq!(
            outcomes,
            vec![GroupSaveOutcome::saved(super_admin.id, catalog.len())]
        );
    }

    #[tokio::test]
    async fn test_save_all_holds_caller_to_own_rights() {
        let store = MemoryPermissionStore::new();
        let catalog = RightCatalog::standard().unwrap();
        run_seed(&store, &catalog, &default_rules()).await.unwrap();

        let level2 = store.get_group_by_name("LEVEL2").await.unwrap();
        let level3 = store.get_group_by_name("LEVEL3").await.unwrap();
        let caller = store
            .create_user("Omar Haddad", "omar@fleet.test", "hash")
            .await
            .unwrap();
        store.add_user_group(caller.id, level2.id).await.unwrap();

        let mut escalated: Vec<String> = held(&store, "LEVEL2").await.into_iter().collect();
        escalated.push("TRIP_DELETE".to_string());

        let outcomes = save_all_groups(
            &store,
            Grantor::User(caller.id),
            &[
                GroupRightsEntry {
                    group_id: level2.id,
                    right_codes: escalated,
                },
                GroupRightsEntry {
                    group_id: level3.id,
                    right_codes: vec!["CITY_VIEW".to_string()],
                },
            ],
        )
        .await;

        assert!(!outcomes[0].is_saved());
        assert!(outcomes[0].error.as_deref().unwrap().contains("TRIP_DELETE"));
        assert_eq!(outcomes[1], GroupSaveOutcome::saved(level3.id, 1));
        assert!(!held(&store, "LEVEL2").await.contains("TRIP_DELETE"));
    }

    #[tokio::test]
    async fn test_empty_catalog_seeds_groups_only() {
        let store = MemoryPermissionStore::new();
        let catalog = RightCatalog::new(std::iter::empty()).unwrap();
        let report = run_seed(&store, &catalog, &default_rules()).await.unwrap();

        assert_eq!(report.groups_created, 5);
        assert_eq!(report.assignments_desired, 0);
        assert_eq!(store.assignment_count().await, 0);
    }
}
