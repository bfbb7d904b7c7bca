//! # FleetOps Auth
//!
//! Authentication types and JWT utilities for the FleetOps API.
//!
//! - [`claims`]: access token claims (groups + resolved right codes)
//! - [`jwt`]: token creation and verification
//! - [`session`]: the client-side permission set and its route guard helpers
//!
//! # Example
//!
//! ```ignore
//! use fleetops_auth::{SessionPermissions, verify_token};
//!
//! let claims = verify_token(&token, &config)?;
//! let session = SessionPermissions::from_claims(&claims);
//! if session.has_permission("TRUCK_ADD") {
//!     // show the "new truck" button
//! }
//! ```

pub mod claims;
pub mod jwt;
pub mod session;

// Re-export commonly used types at crate root
pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
pub use session::{GuardDecision, SessionPermissions};
