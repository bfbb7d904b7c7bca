//! Module × action matrix of a group's rights, as edited in the admin console.
//!
//! Edits stay local to the matrix until the selected codes are saved; a save
//! sends [`GroupMatrix::selected_codes`] and replaces the group's rights.

use std::collections::HashSet;

use fleetops_core::{RightAction, RightCatalog};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MatrixCell {
    pub action: RightAction,
    pub code: String,
    pub granted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MatrixRow {
    pub module: String,
    /// One cell per action the module defines, in [`RightAction::ALL`] order
    pub cells: Vec<MatrixCell>,
}

impl MatrixRow {
    pub fn all_granted(&self) -> bool {
        self.cells.iter().all(|c| c.granted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GroupMatrix {
    pub group_id: Uuid,
    pub group_name: String,
    pub rows: Vec<MatrixRow>,
}

impl GroupMatrix {
    /// Lay out every catalog right, marking those in `granted`.
    ///
    /// Granted codes that are not in the catalog are dropped.
    pub fn build<'a, I>(
        group_id: Uuid,
        group_name: impl Into<String>,
        catalog: &RightCatalog,
        granted: I,
    ) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let granted: HashSet<&str> = granted.into_iter().collect();

        let rows = catalog
            .modules()
            .into_iter()
            .map(|module| {
                let mut cells: Vec<MatrixCell> = module
                    .rights
                    .iter()
                    .map(|entry| MatrixCell {
                        action: entry.code.action(),
                        code: entry.code.to_string(),
                        granted: granted.contains(entry.code.as_str()),
                    })
                    .collect();
                cells.sort_by_key(|c| c.action);

                MatrixRow {
                    module: module.module.to_string(),
                    cells,
                }
            })
            .collect();

        Self {
            group_id,
            group_name: group_name.into(),
            rows,
        }
    }

    fn cell_mut(&mut self, code: &str) -> Option<&mut MatrixCell> {
        self.rows
            .iter_mut()
            .flat_map(|row| row.cells.iter_mut())
            .find(|cell| cell.code == code)
    }

    pub fn is_granted(&self, code: &str) -> bool {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .any(|cell| cell.code == code && cell.granted)
    }

    /// Flip one right. Returns `false` if the code is not in the matrix.
    pub fn toggle_right(&mut self, code: &str) -> bool {
        match self.cell_mut(code) {
            Some(cell) => {
                cell.granted = !cell.granted;
                true
            }
            None => false,
        }
    }

    /// Set one right. Returns `false` if the code is not in the matrix.
    pub fn set_right(&mut self, code: &str, granted: bool) -> bool {
        match self.cell_mut(code) {
            Some(cell) => {
                cell.granted = granted;
                true
            }
            None => false,
        }
    }

    /// Set every action of a module to `granted`. Returns `false` for an unknown module.
    pub fn set_module(&mut self, module: &str, granted: bool) -> bool {
        match self.rows.iter_mut().find(|row| row.module == module) {
            Some(row) => {
                row.cells.iter_mut().for_each(|cell| cell.granted = granted);
                true
            }
            None => false,
        }
    }

    /// Grant the whole module, or revoke it if it is already fully granted.
    pub fn toggle_module(&mut self, module: &str) -> bool {
        let Some(all_granted) = self
            .rows
            .iter()
            .find(|row| row.module == module)
            .map(MatrixRow::all_granted)
        else {
            return false;
        };
        self.set_module(module, !all_granted)
    }

    /// Codes currently marked as granted, in matrix order.
    pub fn selected_codes(&self) -> Vec<String> {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .filter(|cell| cell.granted)
            .map(|cell| cell.code.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> RightCatalog {
        RightCatalog::new([
            ("TRUCK_VIEW", ""),
            ("TRUCK_ADD", ""),
            ("TRUCK_DELETE", ""),
            ("TRIP_EDIT", ""),
            ("TRIP_VIEW", ""),
        ])
        .unwrap()
    }

    #[test]
    fn test_build_marks_granted_cells() {
        let granted = ["TRUCK_VIEW", "GHOST_VIEW"];
        let matrix = GroupMatrix::build(Uuid::nil(), "LEVEL2", &catalog(), granted);

        assert_eq!(matrix.rows.len(), 2);
        assert!(matrix.is_granted("TRUCK_VIEW"));
        assert!(!matrix.is_granted("TRUCK_ADD"));
        assert!(!matrix.is_granted("GHOST_VIEW"));
        assert_eq!(matrix.selected_codes(), vec!["TRUCK_VIEW".to_string()]);
    }

    #[test]
    fn test_cells_follow_action_order() {
        let matrix = GroupMatrix::build(Uuid::nil(), "g", &catalog(), []);
        let trip = matrix.rows.iter().find(|r| r.module == "TRIP").unwrap();
        let actions: Vec<RightAction> = trip.cells.iter().map(|c| c.action).collect();
        assert_eq!(actions, vec![RightAction::View, RightAction::Edit]);
    }

    #[test]
    fn test_toggle_right() {
        let mut matrix = GroupMatrix::build(Uuid::nil(), "g", &catalog(), []);
        assert!(matrix.toggle_right("TRUCK_ADD"));
        assert!(matrix.is_granted("TRUCK_ADD"));
        assert!(matrix.toggle_right("TRUCK_ADD"));
        assert!(!matrix.is_granted("TRUCK_ADD"));
        assert!(!matrix.toggle_right("TRUCK_PRINT"));
    }

    #[test]
    fn test_set_right_is_idempotent() {
        let mut matrix = GroupMatrix::build(Uuid::nil(), "g", &catalog(), ["TRUCK_VIEW"]);
        assert!(matrix.set_right("TRUCK_VIEW", true));
        assert!(matrix.set_right("TRUCK_ADD", true));
        assert!(matrix.set_right("TRUCK_ADD", true));
        assert_eq!(matrix.selected_codes(), vec!["TRUCK_VIEW", "TRUCK_ADD"]);
        assert!(matrix.set_right("TRUCK_VIEW", false));
        assert_eq!(matrix.selected_codes(), vec!["TRUCK_ADD"]);
        assert!(!matrix.set_right("GHOST_VIEW", true));
    }

    #[test]
    fn test_toggle_module_grants_then_revokes() {
        let mut matrix = GroupMatrix::build(Uuid::nil(), "g", &catalog(), ["TRUCK_VIEW"]);

        assert!(matrix.toggle_module("TRUCK"));
        assert_eq!(
            matrix.selected_codes(),
            vec!["TRUCK_VIEW", "TRUCK_ADD", "TRUCK_DELETE"]
        );

        assert!(matrix.toggle_module("TRUCK"));
        assert!(matrix.selected_codes().is_empty());

        assert!(!matrix.toggle_module("FUEL"));
    }

    #[test]
    fn test_set_module_leaves_other_modules_alone() {
        let mut matrix = GroupMatrix::build(Uuid::nil(), "g", &catalog(), ["TRIP_VIEW"]);
        assert!(matrix.set_module("TRUCK", true));
        assert!(matrix.is_granted("TRIP_VIEW"));
        assert!(!matrix.is_granted("TRIP_EDIT"));
        assert_eq!(matrix.selected_codes().len(), 4);
    }
}
