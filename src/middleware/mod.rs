//! Request extractors for authentication and authorization.
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. [`auth::AuthUser`] verifies the JWT and exposes its claims
//! 3. A `Require*` extractor asks the store whether the user's groups hold
//!    the right code, and rejects with `403` otherwise
//!
//! ```ignore
//! use crate::middleware::auth::RequireGroupEdit;
//!
//! async fn save_rights(RequireGroupEdit(auth_user): RequireGroupEdit) -> impl IntoResponse {
//!     // only runs if one of the caller's groups holds GROUP_EDIT
//! }
//! ```

pub mod auth;
