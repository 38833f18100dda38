// src/save/commands.rs
//! Save entry points offered to the command layer.
//!
//! Each ultimately resolves a target and hands one or more sheets to the
//! orchestrator; multi-sheet saves go straight to
//! [`SaveEngine::save_sheets`].

use std::sync::Arc;

use crate::error::Result;
use crate::model::Sheet;

use super::engine::{LaunchedSave, SaveEngine};
use super::target::SaveTarget;

/// Save a single sheet.
pub fn save_sheet(
    engine: &SaveEngine,
    sheet: &Arc<Sheet>,
    target: &SaveTarget,
) -> Result<LaunchedSave> {
    engine.save_sheets(target, std::slice::from_ref(sheet))
}

/// Save a subset of one sheet's columns, as a derived sheet sharing the
/// parent's rows.
pub fn save_cols(
    engine: &SaveEngine,
    sheet: &Sheet,
    column_indices: &[usize],
    target: &SaveTarget,
) -> Result<LaunchedSave> {
    let derived = Arc::new(sheet.with_column_subset(column_indices));
    engine.save_sheets(target, std::slice::from_ref(&derived))
}
