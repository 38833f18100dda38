// src/load.rs
//! Minimal delimited-text loader.
//!
//! The inverse collaborator of the delimited encoders: enough to feed the
//! CLI and to round-trip what [`crate::encode::save_delimited`] writes. Cell
//! values load as text; column typing is the producer's concern.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{ExportError, Result};
use crate::model::{Column, ColumnType, Row, Sheet, SheetSource};
use crate::options::ExportOptions;

/// Parse a delimited text file into a sheet.
///
/// With `has_header`, the first line names the columns; otherwise columns
/// are named positionally (`col0`, `col1`, …) and sized to the widest row.
pub fn load_delimited(path: &Path, options: &ExportOptions, has_header: bool) -> Result<Sheet> {
    let content = fs::read_to_string(path)?;
    if content.is_empty() {
        return Err(ExportError::Load {
            path: path.to_path_buf(),
            reason: "empty file".to_string(),
        });
    }

    let delimiter = options.delimiter.as_str();
    let row_delimiter = options.row_delimiter.as_str();

    let mut lines: Vec<&str> = content.split(row_delimiter).collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }

    let (names, data_lines): (Vec<String>, &[&str]) = if has_header {
        let header = lines.first().ok_or_else(|| ExportError::Load {
            path: path.to_path_buf(),
            reason: "missing header row".to_string(),
        })?;
        (
            header.split(delimiter).map(str::to_string).collect(),
            &lines[1..],
        )
    } else {
        let width = lines
            .iter()
            .map(|l| l.split(delimiter).count())
            .max()
            .unwrap_or(0);
        ((0..width).map(|i| format!("col{}", i)).collect(), &lines[..])
    };

    let columns = names
        .iter()
        .enumerate()
        .map(|(i, name)| Column::indexed(name, i, ColumnType::Any))
        .collect();

    let rows = data_lines
        .iter()
        .map(|line| {
            Row::new(
                line.split(delimiter)
                    .map(|field| Value::String(field.to_string()))
                    .collect(),
            )
        })
        .collect();

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("sheet")
        .to_string();
    let filetype = path.extension().and_then(|e| e.to_str()).map(str::to_string);

    let mut sheet = Sheet::new(name)
        .with_source(SheetSource::FilesystemPath(path.to_path_buf()))
        .with_columns(columns)
        .with_rows(rows);
    if let Some(ft) = filetype {
        sheet = sheet.with_filetype(ft);
    }
    Ok(sheet)
}
