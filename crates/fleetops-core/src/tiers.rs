//! Group tiers and the declarative rules that decide which rights each tier holds.
//!
//! Every tier owns one [`TierRule`]: a module filter and an action filter,
//! evaluated independently against each right in the catalog. The rules are
//! plain data so the policy can be inspected and tested apart from storage;
//! [`compute_desired_assignments`] turns a catalog plus rules into the full set
//! of `(tier, right)` pairs that must exist.
//!
//! | Tier       | Modules                             | Actions               |
//! |------------|-------------------------------------|-----------------------|
//! | SuperAdmin | any                                 | any                   |
//! | Admin      | all but [`FORBIDDEN_ADMIN_MODULES`] | any                   |
//! | LEVEL1     | all but [`FORBIDDEN_ADMIN_MODULES`] | all but DELETE        |
//! | LEVEL2     | all but [`FORBIDDEN_ADMIN_MODULES`] | all but DELETE, PRINT |
//! | LEVEL3     | any                                 | VIEW only             |
//!
//! LEVEL3 is not derived from Admin: it may view modules that Admin, LEVEL1
//! and LEVEL2 cannot touch.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::rights::{RightAction, RightCatalog, RightCode};

/// Modules withheld from Admin and every tier derived from it.
pub const FORBIDDEN_ADMIN_MODULES: &[&str] = &[
    "OVERTIME",
    "AVAILABILITY",
    "DAYOFF",
    "MECHANIC",
    "VENDOR",
    "TRUCK_MAINTENANCE",
    "CHAUFFEUR",
    "CONVOYER",
    "TRIP",
];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum Tier {
    SuperAdmin,
    Admin,
    #[serde(rename = "LEVEL1")]
    Level1,
    #[serde(rename = "LEVEL2")]
    Level2,
    #[serde(rename = "LEVEL3")]
    Level3,
}

impl Tier {
    /// Tiers in seeding order.
    pub const ALL: [Tier; 5] = [
        Tier::SuperAdmin,
        Tier::Admin,
        Tier::Level1,
        Tier::Level2,
        Tier::Level3,
    ];

    /// Group name as stored in the database.
    pub fn name(&self) -> &'static str {
        match self {
            Tier::SuperAdmin => "SuperAdmin",
            Tier::Admin => "Admin",
            Tier::Level1 => "LEVEL1",
            Tier::Level2 => "LEVEL2",
            Tier::Level3 => "LEVEL3",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Tier::SuperAdmin => "Full access to every module",
            Tier::Admin => "Administration without personnel, trip and maintenance modules",
            Tier::Level1 => "Admin access without deletion",
            Tier::Level2 => "Admin access without deletion or printing",
            Tier::Level3 => "Read-only access to every module",
        }
    }

    /// Only SuperAdmin is protected from renaming and deletion.
    pub fn is_system_group(&self) -> bool {
        matches!(self, Tier::SuperAdmin)
    }

    pub fn from_name(name: &str) -> Option<Tier> {
        Tier::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn rule(&self) -> TierRule {
        match self {
            Tier::SuperAdmin => TierRule {
                modules: ModuleFilter::Any,
                actions: ActionFilter::Any,
            },
            Tier::Admin => TierRule {
                modules: ModuleFilter::Except(FORBIDDEN_ADMIN_MODULES),
                actions: ActionFilter::Any,
            },
            Tier::Level1 => TierRule {
                modules: ModuleFilter::Except(FORBIDDEN_ADMIN_MODULES),
                actions: ActionFilter::Except(&[RightAction::Delete]),
            },
            Tier::Level2 => TierRule {
                modules: ModuleFilter::Except(FORBIDDEN_ADMIN_MODULES),
                actions: ActionFilter::Except(&[RightAction::Delete, RightAction::Print]),
            },
            Tier::Level3 => TierRule {
                modules: ModuleFilter::Any,
                actions: ActionFilter::Only(&[RightAction::View]),
            },
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::from_name(s).ok_or_else(|| format!("unknown tier: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleFilter {
    Any,
    Except(&'static [&'static str]),
}

impl ModuleFilter {
    pub fn allows(&self, module: &str) -> bool {
        match self {
            ModuleFilter::Any => true,
            ModuleFilter::Except(excluded) => !excluded.contains(&module),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionFilter {
    Any,
    Except(&'static [RightAction]),
    Only(&'static [RightAction]),
}

impl ActionFilter {
    pub fn allows(&self, action: RightAction) -> bool {
        match self {
            ActionFilter::Any => true,
            ActionFilter::Except(excluded) => !excluded.contains(&action),
            ActionFilter::Only(allowed) => allowed.contains(&action),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierRule {
    pub modules: ModuleFilter,
    pub actions: ActionFilter,
}

impl TierRule {
    pub fn allows(&self, code: &RightCode) -> bool {
        self.modules.allows(code.module()) && self.actions.allows(code.action())
    }
}

/// The rule set used at startup: every tier paired with its own rule.
pub fn default_rules() -> Vec<(Tier, TierRule)> {
    Tier::ALL.into_iter().map(|t| (t, t.rule())).collect()
}

/// Every `(tier, right)` pair the rules require, with no side effects.
pub fn compute_desired_assignments(
    catalog: &RightCatalog,
    rules: &[(Tier, TierRule)],
) -> BTreeSet<(Tier, RightCode)> {
    rules
        .iter()
        .flat_map(|(tier, rule)| {
            catalog
                .codes()
                .filter(move |code| rule.allows(code))
                .map(move |code| (*tier, code.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rights::CATALOG;

    fn holdings(
        desired: &BTreeSet<(Tier, RightCode)>,
        tier: Tier,
    ) -> BTreeSet<String> {
        desired
            .iter()
            .filter(|(t, _)| *t == tier)
            .map(|(_, c)| c.to_string())
            .collect()
    }

    #[test]
    fn test_tier_names_round_trip() {
        for tier in Tier::ALL {
            assert_eq!(Tier::from_name(tier.name()), Some(tier));
        }
        assert_eq!(Tier::from_name("level1"), None);
        assert!("Dispatcher".parse::<Tier>().is_err());
    }

    #[test]
    fn test_only_super_admin_is_system_group() {
        let system: Vec<Tier> = Tier::ALL
            .into_iter()
            .filter(|t| t.is_system_group())
            .collect();
        assert_eq!(system, vec![Tier::SuperAdmin]);
    }

    #[test]
    fn test_scenario_forbidden_modules_only() {
        let catalog = RightCatalog::new([
            ("TRIP_VIEW", ""),
            ("TRIP_DELETE", ""),
            ("OVERTIME_VIEW", ""),
            ("OVERTIME_ADD", ""),
        ])
        .unwrap();

        let desired = compute_desired_assignments(&catalog, &default_rules());

        assert!(holdings(&desired, Tier::Admin).is_empty());
        assert!(holdings(&desired, Tier::Level1).is_empty());
        assert!(holdings(&desired, Tier::Level2).is_empty());
        assert_eq!(holdings(&desired, Tier::SuperAdmin).len(), 4);
        assert_eq!(
            holdings(&desired, Tier::Level3),
            BTreeSet::from(["OVERTIME_VIEW".to_string(), "TRIP_VIEW".to_string()])
        );
    }

    #[test]
    fn test_super_admin_holds_whole_catalog() {
        let catalog = RightCatalog::standard().unwrap();
        let desired = compute_desired_assignments(&catalog, &default_rules());
        assert_eq!(holdings(&desired, Tier::SuperAdmin).len(), CATALOG.len());
    }

    #[test]
    fn test_tier_subset_chain() {
        let catalog = RightCatalog::standard().unwrap();
        let desired = compute_desired_assignments(&catalog, &default_rules());

        let super_admin = holdings(&desired, Tier::SuperAdmin);
        let admin = holdings(&desired, Tier::Admin);
        let level1 = holdings(&desired, Tier::Level1);
        let level2 = holdings(&desired, Tier::Level2);

        assert!(admin.is_subset(&super_admin));
        assert!(level1.is_subset(&admin));
        assert!(level2.is_subset(&level1));
    }

    #[test]
    fn test_level3_is_not_a_subset_of_level2() {
        let catalog = RightCatalog::standard().unwrap();
        let desired = compute_desired_assignments(&catalog, &default_rules());

        let level2 = holdings(&desired, Tier::Level2);
        let level3 = holdings(&desired, Tier::Level3);

        assert!(level3.contains("TRIP_VIEW"));
        assert!(!level2.contains("TRIP_VIEW"));
        assert!(level3.iter().all(|c| c.ends_with("_VIEW")));
    }

    #[test]
    fn test_forbidden_modules_excluded_from_admin_family() {
        let catalog = RightCatalog::standard().unwrap();
        let desired = compute_desired_assignments(&catalog, &default_rules());

        for (tier, code) in &desired {
            if matches!(tier, Tier::Admin | Tier::Level1 | Tier::Level2) {
                assert!(
                    !FORBIDDEN_ADMIN_MODULES.contains(&code.module()),
                    "{tier} must not hold {code}"
                );
            }
        }
        // TRUCK is allowed even though TRUCK_MAINTENANCE is not
        assert!(holdings(&desired, Tier::Admin).contains("TRUCK_DELETE"));
        assert!(!holdings(&desired, Tier::Admin).contains("TRUCK_MAINTENANCE_VIEW"));
    }

    #[test]
    fn test_level_action_exclusions() {
        let catalog = RightCatalog::standard().unwrap();
        let desired = compute_desired_assignments(&catalog, &default_rules());

        let level1 = holdings(&desired, Tier::Level1);
        let level2 = holdings(&desired, Tier::Level2);

        assert!(level1.contains("FUEL_PRINT"));
        assert!(!level1.contains("FUEL_DELETE"));
        assert!(!level2.contains("FUEL_PRINT"));
        assert!(level2.contains("FUEL_EDIT"));
    }

    #[test]
    fn test_empty_catalog_yields_no_assignments() {
        let catalog = RightCatalog::new([]).unwrap();
        assert!(compute_desired_assignments(&catalog, &default_rules()).is_empty());
    }
}
