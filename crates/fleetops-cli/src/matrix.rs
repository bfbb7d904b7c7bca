use std::fmt::Write;

use anyhow::{Context, Result, bail};

use fleetops_core::{RightAction, RightCatalog};
use fleetops_db::{Grantor, PermissionStore, save_all_groups};
use fleetops_models::{GroupMatrix, GroupRightsEntry, GroupSaveOutcome};

const MODULE_WIDTH: usize = 20;
const CELL_WIDTH: usize = 8;

/// Plain-text module × action grid. `[x]` granted, `[ ]` not granted, `-` undefined.
pub fn render_matrix(matrix: &GroupMatrix) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Group: {} ({})", matrix.group_name, matrix.group_id);

    let _ = write!(out, "{:<MODULE_WIDTH$}", "MODULE");
    for action in RightAction::ALL {
        let _ = write!(out, "{:<CELL_WIDTH$}", action.as_str());
    }
    out.push('\n');

    for row in &matrix.rows {
        let _ = write!(out, "{:<MODULE_WIDTH$}", row.module);
        for action in RightAction::ALL {
            let mark = match row.cells.iter().find(|c| c.action == action) {
                Some(cell) if cell.granted => "[x]",
                Some(_) => "[ ]",
                None => "-",
            };
            let _ = write!(out, "{:<CELL_WIDTH$}", mark);
        }
        out.push('\n');
    }

    let _ = writeln!(out, "{} right(s) granted", matrix.selected_codes().len());
    out
}

/// A change to apply to a group's matrix before it is saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixEdit {
    Grant(String),
    Revoke(String),
    Toggle(String),
    GrantModule(String),
    RevokeModule(String),
    ToggleModule(String),
}

impl MatrixEdit {
    fn apply(&self, matrix: &mut GroupMatrix) -> Result<()> {
        let (found, what, name) = match self {
            Self::Grant(code) => (matrix.set_right(code, true), "right", code),
            Self::Revoke(code) => (matrix.set_right(code, false), "right", code),
            Self::Toggle(code) => (matrix.toggle_right(code), "right", code),
            Self::GrantModule(module) => (matrix.set_module(module, true), "module", module),
            Self::RevokeModule(module) => (matrix.set_module(module, false), "module", module),
            Self::ToggleModule(module) => (matrix.toggle_module(module), "module", module),
        };
        if !found {
            bail!("Unknown {what} '{name}'");
        }
        Ok(())
    }
}

/// Apply `edits` in order. Stops at the first unknown right or module.
pub fn apply_edits(matrix: &mut GroupMatrix, edits: &[MatrixEdit]) -> Result<()> {
    for edit in edits {
        edit.apply(matrix)?;
    }
    Ok(())
}

/// Load the named group's matrix against `catalog`.
pub async fn load_matrix(
    store: &dyn PermissionStore,
    catalog: &RightCatalog,
    group_name: &str,
) -> Result<GroupMatrix> {
    let group = store
        .get_group_by_name(group_name)
        .await
        .with_context(|| format!("Unknown group '{group_name}'"))?;
    let rights = store.list_group_rights(group.id).await?;

    Ok(GroupMatrix::build(
        group.id,
        group.name,
        catalog,
        rights.iter().map(|r| r.code.as_str()),
    ))
}

/// Save the matrix's selected codes as the group's exact right set.
pub async fn save_matrix(
    store: &dyn PermissionStore,
    matrix: &GroupMatrix,
) -> Result<GroupSaveOutcome> {
    let entry = GroupRightsEntry {
        group_id: matrix.group_id,
        right_codes: matrix.selected_codes(),
    };
    let outcome = save_all_groups(store, Grantor::System, &[entry])
        .await
        .into_iter()
        .next()
        .context("No save outcome returned")?;

    if let Some(error) = &outcome.error {
        bail!("Saving rights of '{}' failed: {error}", matrix.group_name);
    }
    Ok(outcome)
}
