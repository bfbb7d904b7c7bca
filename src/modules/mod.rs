pub mod auth;
pub mod groups;
pub mod rights;
pub mod users;
