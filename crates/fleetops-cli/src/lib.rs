//! # FleetOps CLI
//!
//! Administrative helpers behind the `fleetops-cli` binary.
//!
//! ```ignore
//! use fleetops_cli::matrix::{MatrixEdit, apply_edits, load_matrix, save_matrix};
//! use fleetops_cli::{render_matrix, users::create_user_in_groups};
//!
//! let groups = ["LEVEL1".to_string()];
//! let user = create_user_in_groups(&store, "Ada Dispatch", "ada@fleet.test", "secret123", &groups)
//!     .await?;
//!
//! let mut matrix = load_matrix(&store, &catalog, "LEVEL1").await?;
//! apply_edits(&mut matrix, &[MatrixEdit::GrantModule("FUEL".into())])?;
//! save_matrix(&store, &matrix).await?;
//! println!("{}", render_matrix(&matrix));
//! ```

pub mod matrix;
pub mod users;

pub use matrix::render_matrix;
