//! Right codes and the right catalog for the FleetOps API.
//!
//! A right is an atomic permission code of the form `MODULE_ACTION`, for
//! example `TRIP_VIEW` or `TRUCK_MAINTENANCE_DELETE`. The action is the token
//! after the last underscore and must be one of [`RightAction`]; the module is
//! everything in front of it.
//!
//! Codes are validated once, when a [`RightCatalog`] is built. Runtime checks
//! (see [`module_of`] and [`action_of`]) never fail: an unparseable code is
//! simply treated as belonging to no module.
//!
//! # Example
//!
//! ```ignore
//! use fleetops_core::rights::{self, RightCatalog, RightCode, RightAction};
//!
//! let catalog = RightCatalog::standard()?;
//! assert!(catalog.contains(rights::TRIP_VIEW));
//!
//! let code = RightCode::parse("TRUCK_MAINTENANCE_PRINT")?;
//! assert_eq!(code.module(), "TRUCK_MAINTENANCE");
//! assert_eq!(code.action(), RightAction::Print);
//! ```

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

// =============================================================================
// Trucks
// =============================================================================

pub const TRUCK_VIEW: &str = "TRUCK_VIEW";
pub const TRUCK_ADD: &str = "TRUCK_ADD";
pub const TRUCK_EDIT: &str = "TRUCK_EDIT";
pub const TRUCK_DELETE: &str = "TRUCK_DELETE";
pub const TRUCK_PRINT: &str = "TRUCK_PRINT";

// =============================================================================
// Truck maintenance
// =============================================================================

pub const TRUCK_MAINTENANCE_VIEW: &str = "TRUCK_MAINTENANCE_VIEW";
pub const TRUCK_MAINTENANCE_ADD: &str = "TRUCK_MAINTENANCE_ADD";
pub const TRUCK_MAINTENANCE_EDIT: &str = "TRUCK_MAINTENANCE_EDIT";
pub const TRUCK_MAINTENANCE_DELETE: &str = "TRUCK_MAINTENANCE_DELETE";
pub const TRUCK_MAINTENANCE_PRINT: &str = "TRUCK_MAINTENANCE_PRINT";

// =============================================================================
// Drivers (chauffeurs) and escorts (convoyers)
// =============================================================================

pub const CHAUFFEUR_VIEW: &str = "CHAUFFEUR_VIEW";
pub const CHAUFFEUR_ADD: &str = "CHAUFFEUR_ADD";
pub const CHAUFFEUR_EDIT: &str = "CHAUFFEUR_EDIT";
pub const CHAUFFEUR_DELETE: &str = "CHAUFFEUR_DELETE";
pub const CHAUFFEUR_PRINT: &str = "CHAUFFEUR_PRINT";

pub const CONVOYER_VIEW: &str = "CONVOYER_VIEW";
pub const CONVOYER_ADD: &str = "CONVOYER_ADD";
pub const CONVOYER_EDIT: &str = "CONVOYER_EDIT";
pub const CONVOYER_DELETE: &str = "CONVOYER_DELETE";

// =============================================================================
// Trips
// =============================================================================

pub const TRIP_VIEW: &str = "TRIP_VIEW";
pub const TRIP_ADD: &str = "TRIP_ADD";
pub const TRIP_EDIT: &str = "TRIP_EDIT";
pub const TRIP_DELETE: &str = "TRIP_DELETE";
pub const TRIP_PRINT: &str = "TRIP_PRINT";

// =============================================================================
// Fuel fills
// =============================================================================

pub const FUEL_VIEW: &str = "FUEL_VIEW";
pub const FUEL_ADD: &str = "FUEL_ADD";
pub const FUEL_EDIT: &str = "FUEL_EDIT";
pub const FUEL_DELETE: &str = "FUEL_DELETE";
pub const FUEL_PRINT: &str = "FUEL_PRINT";

// =============================================================================
// Customers, zones and cities
// =============================================================================

pub const CUSTOMER_VIEW: &str = "CUSTOMER_VIEW";
pub const CUSTOMER_ADD: &str = "CUSTOMER_ADD";
pub const CUSTOMER_EDIT: &str = "CUSTOMER_EDIT";
pub const CUSTOMER_DELETE: &str = "CUSTOMER_DELETE";
pub const CUSTOMER_PRINT: &str = "CUSTOMER_PRINT";

pub const ZONE_VIEW: &str = "ZONE_VIEW";
pub const ZONE_ADD: &str = "ZONE_ADD";
pub const ZONE_EDIT: &str = "ZONE_EDIT";
pub const ZONE_DELETE: &str = "ZONE_DELETE";

pub const CITY_VIEW: &str = "CITY_VIEW";
pub const CITY_ADD: &str = "CITY_ADD";
pub const CITY_EDIT: &str = "CITY_EDIT";
pub const CITY_DELETE: &str = "CITY_DELETE";

// =============================================================================
// Vendors and mechanics
// =============================================================================

pub const VENDOR_VIEW: &str = "VENDOR_VIEW";
pub const VENDOR_ADD: &str = "VENDOR_ADD";
pub const VENDOR_EDIT: &str = "VENDOR_EDIT";
pub const VENDOR_DELETE: &str = "VENDOR_DELETE";

pub const MECHANIC_VIEW: &str = "MECHANIC_VIEW";
pub const MECHANIC_ADD: &str = "MECHANIC_ADD";
pub const MECHANIC_EDIT: &str = "MECHANIC_EDIT";
pub const MECHANIC_DELETE: &str = "MECHANIC_DELETE";

// =============================================================================
// Day-off, overtime and driver availability
// =============================================================================

pub const DAYOFF_VIEW: &str = "DAYOFF_VIEW";
pub const DAYOFF_ADD: &str = "DAYOFF_ADD";
pub const DAYOFF_EDIT: &str = "DAYOFF_EDIT";
pub const DAYOFF_DELETE: &str = "DAYOFF_DELETE";

pub const OVERTIME_VIEW: &str = "OVERTIME_VIEW";
pub const OVERTIME_ADD: &str = "OVERTIME_ADD";
pub const OVERTIME_EDIT: &str = "OVERTIME_EDIT";
pub const OVERTIME_DELETE: &str = "OVERTIME_DELETE";

pub const AVAILABILITY_VIEW: &str = "AVAILABILITY_VIEW";
pub const AVAILABILITY_EDIT: &str = "AVAILABILITY_EDIT";

// =============================================================================
// Dashboard
// =============================================================================

pub const DASHBOARD_VIEW: &str = "DASHBOARD_VIEW";

// =============================================================================
// Groups and users (administration)
// =============================================================================

/// Permission to list groups, their rights and the right catalog
pub const GROUP_VIEW: &str = "GROUP_VIEW";
/// Permission to create custom groups
pub const GROUP_ADD: &str = "GROUP_ADD";
/// Permission to rename groups and save their rights
pub const GROUP_EDIT: &str = "GROUP_EDIT";
/// Permission to delete non-system groups
pub const GROUP_DELETE: &str = "GROUP_DELETE";

/// Permission to read users and their group memberships
pub const USER_VIEW: &str = "USER_VIEW";
/// Permission to create users
pub const USER_ADD: &str = "USER_ADD";
/// Permission to change a user's group memberships
pub const USER_EDIT: &str = "USER_EDIT";
/// Permission to delete users
pub const USER_DELETE: &str = "USER_DELETE";

/// The standard catalog as `(code, description)` pairs, in display order.
pub const CATALOG: &[(&str, &str)] = &[
    (TRUCK_VIEW, "View trucks"),
    (TRUCK_ADD, "Register trucks"),
    (TRUCK_EDIT, "Edit trucks"),
    (TRUCK_DELETE, "Delete trucks"),
    (TRUCK_PRINT, "Print and export trucks"),
    (TRUCK_MAINTENANCE_VIEW, "View truck maintenance"),
    (TRUCK_MAINTENANCE_ADD, "Record truck maintenance"),
    (TRUCK_MAINTENANCE_EDIT, "Edit truck maintenance"),
    (TRUCK_MAINTENANCE_DELETE, "Delete truck maintenance"),
    (TRUCK_MAINTENANCE_PRINT, "Print and export truck maintenance"),
    (CHAUFFEUR_VIEW, "View drivers"),
    (CHAUFFEUR_ADD, "Register drivers"),
    (CHAUFFEUR_EDIT, "Edit drivers"),
    (CHAUFFEUR_DELETE, "Delete drivers"),
    (CHAUFFEUR_PRINT, "Print and export drivers"),
    (CONVOYER_VIEW, "View escorts"),
    (CONVOYER_ADD, "Register escorts"),
    (CONVOYER_EDIT, "Edit escorts"),
    (CONVOYER_DELETE, "Delete escorts"),
    (TRIP_VIEW, "View trips"),
    (TRIP_ADD, "Create trips"),
    (TRIP_EDIT, "Edit trips and change their status"),
    (TRIP_DELETE, "Delete trips"),
    (TRIP_PRINT, "Print and export trips"),
    (FUEL_VIEW, "View fuel fills"),
    (FUEL_ADD, "Record fuel fills"),
    (FUEL_EDIT, "Edit fuel fills"),
    (FUEL_DELETE, "Delete fuel fills"),
    (FUEL_PRINT, "Print and export fuel fills"),
    (CUSTOMER_VIEW, "View customers"),
    (CUSTOMER_ADD, "Create customers"),
    (CUSTOMER_EDIT, "Edit customers"),
    (CUSTOMER_DELETE, "Delete customers"),
    (CUSTOMER_PRINT, "Print and export customers"),
    (ZONE_VIEW, "View zones"),
    (ZONE_ADD, "Create zones"),
    (ZONE_EDIT, "Edit zones"),
    (ZONE_DELETE, "Delete zones"),
    (CITY_VIEW, "View cities"),
    (CITY_ADD, "Create cities"),
    (CITY_EDIT, "Edit cities"),
    (CITY_DELETE, "Delete cities"),
    (VENDOR_VIEW, "View vendors"),
    (VENDOR_ADD, "Create vendors"),
    (VENDOR_EDIT, "Edit vendors"),
    (VENDOR_DELETE, "Delete vendors"),
    (MECHANIC_VIEW, "View mechanics"),
    (MECHANIC_ADD, "Create mechanics"),
    (MECHANIC_EDIT, "Edit mechanics"),
    (MECHANIC_DELETE, "Delete mechanics"),
    (DAYOFF_VIEW, "View days off"),
    (DAYOFF_ADD, "Grant days off"),
    (DAYOFF_EDIT, "Edit days off"),
    (DAYOFF_DELETE, "Delete days off"),
    (OVERTIME_VIEW, "View overtime settings"),
    (OVERTIME_ADD, "Create overtime settings"),
    (OVERTIME_EDIT, "Edit overtime settings"),
    (OVERTIME_DELETE, "Delete overtime settings"),
    (AVAILABILITY_VIEW, "View driver availability"),
    (AVAILABILITY_EDIT, "Edit driver availability"),
    (DASHBOARD_VIEW, "View the dashboard"),
    (GROUP_VIEW, "View groups and rights"),
    (GROUP_ADD, "Create groups"),
    (GROUP_EDIT, "Edit groups and their rights"),
    (GROUP_DELETE, "Delete groups"),
    (USER_VIEW, "View users"),
    (USER_ADD, "Create users"),
    (USER_EDIT, "Edit users and their groups"),
    (USER_DELETE, "Delete users"),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("malformed right code '{0}': expected MODULE_ACTION in upper case")]
    MalformedCode(String),
    #[error("right code '{code}' ends with unknown action '{action}'")]
    UnknownAction { code: String, action: String },
    #[error("right code '{0}' is defined more than once")]
    DuplicateRight(String),
}

/// The action token of a right code.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum RightAction {
    View,
    Add,
    Edit,
    Delete,
    Print,
}

impl RightAction {
    /// Actions in matrix column order.
    pub const ALL: [RightAction; 5] = [
        RightAction::View,
        RightAction::Add,
        RightAction::Edit,
        RightAction::Delete,
        RightAction::Print,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RightAction::View => "VIEW",
            RightAction::Add => "ADD",
            RightAction::Edit => "EDIT",
            RightAction::Delete => "DELETE",
            RightAction::Print => "PRINT",
        }
    }
}

impl fmt::Display for RightAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RightAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VIEW" => Ok(RightAction::View),
            "ADD" => Ok(RightAction::Add),
            "EDIT" => Ok(RightAction::Edit),
            "DELETE" => Ok(RightAction::Delete),
            "PRINT" => Ok(RightAction::Print),
            _ => Err(()),
        }
    }
}

/// A validated `MODULE_ACTION` right code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
#[serde(transparent)]
pub struct RightCode(String);

impl RightCode {
    pub fn parse(code: &str) -> Result<Self, CatalogError> {
        let malformed = || CatalogError::MalformedCode(code.to_string());

        let (module, action) = code.rsplit_once('_').ok_or_else(malformed)?;

        let well_formed_token = |token: &str| {
            !token.is_empty()
                && token
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        };

        if !module.split('_').all(well_formed_token) || !well_formed_token(action) {
            return Err(malformed());
        }
        if !module.starts_with(|c: char| c.is_ascii_uppercase()) {
            return Err(malformed());
        }

        action
            .parse::<RightAction>()
            .map_err(|_| CatalogError::UnknownAction {
                code: code.to_string(),
                action: action.to_string(),
            })?;

        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn module(&self) -> &str {
        // parse() guarantees an underscore is present
        self.0.rsplit_once('_').map(|(m, _)| m).unwrap_or(&self.0)
    }

    pub fn action(&self) -> RightAction {
        action_of(&self.0).unwrap_or(RightAction::View)
    }
}

impl fmt::Display for RightCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RightCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for RightCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        RightCode::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Module of an arbitrary code, or `None` if it is not `MODULE_ACTION` shaped.
pub fn module_of(code: &str) -> Option<&str> {
    let (module, action) = code.rsplit_once('_')?;
    action.parse::<RightAction>().ok()?;
    (!module.is_empty()).then_some(module)
}

/// Action of an arbitrary code, or `None` if the last token is not a known action.
pub fn action_of(code: &str) -> Option<RightAction> {
    code.rsplit_once('_')
        .and_then(|(_, action)| action.parse().ok())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CatalogEntry {
    pub code: RightCode,
    pub description: String,
}

/// Rights of one module, in catalog order.
#[derive(Debug, Clone)]
pub struct CatalogModule<'a> {
    pub module: &'a str,
    pub rights: Vec<&'a CatalogEntry>,
}

/// Immutable, ordered set of rights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RightCatalog {
    entries: Vec<CatalogEntry>,
}

impl RightCatalog {
    /// Build a catalog, rejecting malformed and duplicate codes.
    pub fn new<'a, I>(definitions: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for (code, description) in definitions {
            let code = RightCode::parse(code)?;
            if !seen.insert(code.clone()) {
                return Err(CatalogError::DuplicateRight(code.to_string()));
            }
            entries.push(CatalogEntry {
                code,
                description: description.to_string(),
            });
        }

        Ok(Self { entries })
    }

    /// The catalog shipped with the application ([`CATALOG`]).
    pub fn standard() -> Result<Self, CatalogError> {
        Self::new(CATALOG.iter().copied())
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn codes(&self) -> impl Iterator<Item = &RightCode> {
        self.entries.iter().map(|e| &e.code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.code.as_str() == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// Rights grouped by module, modules in order of first appearance.
    pub fn modules(&self) -> Vec<CatalogModule<'_>> {
        let mut modules: Vec<CatalogModule<'_>> = Vec::new();

        for entry in &self.entries {
            let module = entry.code.module();
            match modules.iter_mut().find(|m| m.module == module) {
                Some(existing) => existing.rights.push(entry),
                None => modules.push(CatalogModule {
                    module,
                    rights: vec![entry],
                }),
            }
        }

        modules
    }
}
