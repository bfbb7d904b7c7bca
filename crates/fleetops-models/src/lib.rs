//! # FleetOps Models
//!
//! Domain models and DTOs for the FleetOps API.
//!
//! - [`auth`]: login request/response and the profile payload
//! - [`groups`]: rights, groups and the group-rights save DTOs
//! - [`matrix`]: the module × action editing matrix for one group
//! - [`users`]: users and group membership
//!
//! # Example
//!
//! ```ignore
//! use fleetops_core::RightCatalog;
//! use fleetops_models::GroupMatrix;
//!
//! let mut matrix = GroupMatrix::build(group.id, &group.name, &RightCatalog::standard()?, held);
//! matrix.toggle_module("TRUCK");
//! let codes = matrix.selected_codes();
//! ```

pub mod auth;
pub mod groups;
pub mod matrix;
pub mod users;

pub use auth::{LoginRequest, LoginResponse, ProfileResponse};

pub use groups::{
    CreateGroupDto, Group, GroupRight, GroupRightsEntry, GroupSaveOutcome, GroupWithRights, Right,
    RightFilterParams, RightModule, SaveAllGroupRightsDto, SaveAllResponse, SaveGroupRightsDto,
    SaveStatus, UpdateGroupDto,
};

pub use matrix::{GroupMatrix, MatrixCell, MatrixRow};

pub use users::{
    AssignGroupDto, CreateUserDto, User, UserCredentials, UserGroupsResponse,
    UserPermissionsResponse,
};
