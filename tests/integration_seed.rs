use sqlx::PgPool;

use fleetops_core::tiers::default_rules;
use fleetops_core::{RightCatalog, Tier};
use fleetops_db::{PermissionStore, PgPermissionStore, SeedReport, run_seed};

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_seed_is_idempotent(pool: PgPool) {
    let store = PgPermissionStore::new(pool.clone());
    let catalog = RightCatalog::standard().unwrap();

    let first = run_seed(&store, &catalog, &default_rules()).await.unwrap();
    assert_eq!(first.rights_created, catalog.len() as u64);
    assert_eq!(first.groups_created, Tier::ALL.len() as u64);
    assert_eq!(first.assignments_created, first.assignments_desired as u64);
    let rows = count(&pool, "group_rights").await;

    let second = run_seed(&store, &catalog, &default_rules()).await.unwrap();
    assert_eq!(
        second,
        SeedReport {
            assignments_desired: first.assignments_desired,
            ..SeedReport::default()
        }
    );
    assert_eq!(count(&pool, "group_rights").await, rows);
    assert_eq!(count(&pool, "rights").await, catalog.len() as i64);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_seeds_match_single_run(pool: PgPool) {
    let catalog = RightCatalog::standard().unwrap();
    let rules = default_rules();
    let a = PgPermissionStore::new(pool.clone());
    let b = PgPermissionStore::new(pool.clone());

    let (ra, rb) = tokio::join!(
        run_seed(&a, &catalog, &rules),
        run_seed(&b, &catalog, &rules)
    );
    let ra = ra.unwrap();
    rb.unwrap();

    assert_eq!(count(&pool, "group_rights").await, ra.assignments_desired as i64);
    assert_eq!(count(&pool, "groups").await, Tier::ALL.len() as i64);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_seed_keeps_manual_grants(pool: PgPool) {
    let store = PgPermissionStore::new(pool.clone());
    let catalog = RightCatalog::standard().unwrap();
    run_seed(&store, &catalog, &default_rules()).await.unwrap();

    let level2 = store.get_group_by_name("LEVEL2").await.unwrap();
    let mut codes: Vec<String> = store
        .list_group_rights(level2.id)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.code)
        .collect();
    codes.push("TRIP_DELETE".to_string());
    store.replace_group_rights(level2.id, &codes).await.unwrap();

    run_seed(&store, &catalog, &default_rules()).await.unwrap();

    let after: Vec<String> = store
        .list_group_rights(level2.id)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.code)
        .collect();
    assert!(after.contains(&"TRIP_DELETE".to_string()));
    assert_eq!(after.len(), codes.len());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_seed_restores_removed_tier_rights(pool: PgPool) {
    let store = PgPermissionStore::new(pool.clone());
    let catalog = RightCatalog::standard().unwrap();
    let first = run_seed(&store, &catalog, &default_rules()).await.unwrap();

    let level3 = store.get_group_by_name("LEVEL3").await.unwrap();
    store
        .replace_group_rights(level3.id, &["TRUCK_VIEW".to_string()])
        .await
        .unwrap();

    let second = run_seed(&store, &catalog, &default_rules()).await.unwrap();
    assert!(second.assignments_created > 0);
    assert_eq!(count(&pool, "group_rights").await, first.assignments_desired as i64);
}
