//! # FleetOps Core
//!
//! Core types, errors, and authorization policy for the FleetOps API.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`password`]: bcrypt hashing helpers
//! - [`rights`]: Right codes (`MODULE_ACTION`) and the right catalog
//! - [`tiers`]: Group tiers, their rules, and the pure assignment computation
//!
//! # Example
//!
//! ```ignore
//! use fleetops_core::{RightCatalog, tiers};
//!
//! let catalog = RightCatalog::standard()?;
//! let desired = tiers::compute_desired_assignments(&catalog, &tiers::default_rules());
//! ```

pub mod errors;
pub mod password;
pub mod rights;
pub mod tiers;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use password::{hash_password, verify_password};
pub use rights::{CatalogError, RightAction, RightCatalog, RightCode};
pub use tiers::{Tier, TierRule};
