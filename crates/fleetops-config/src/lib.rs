//! # FleetOps Config
//!
//! Configuration types for the FleetOps API, loaded from environment variables.
//!
//! - [`cors`]: allowed CORS origins (`CORS_ALLOWED_ORIGINS`)
//! - [`jwt`]: token signing secret and expiry (`JWT_SECRET`, `JWT_ACCESS_EXPIRY`)
//! - [`server`]: listener address and pool size (`SERVER_HOST`, `SERVER_PORT`,
//!   `DATABASE_MAX_CONNECTIONS`)

pub mod cors;
pub mod jwt;
pub mod server;

pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;
