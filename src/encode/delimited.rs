// src/encode/delimited.rs
//! Delimited text encoders.
//!
//! `save_delimited` is the reference encoder: display-mode projection over
//! visible columns, values joined by the sheet's field delimiter, rows ended
//! by its row delimiter. `save_tsv` and `save_csv` layer a header row (and,
//! for csv, a comma delimiter) over the same core. Every other encoder
//! conforms to this structural shape: target first, then variadic sheets.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;

use crate::error::Result;
use crate::model::Sheet;
use crate::options::ExportOptions;
use crate::project::{ProjectMode, RowProjector};
use crate::report::Reporter;
use crate::save::SaveTarget;

/// Reference encoder: plain delimited text, no header row.
pub fn save_delimited(
    target: &SaveTarget,
    sheets: &[Arc<Sheet>],
    options: &ExportOptions,
    reporter: &dyn Reporter,
) -> Result<()> {
    write_sheets(target, sheets, options, reporter, Layout::plain())
}

/// Tab-separated values with a header row of column names.
pub fn save_tsv(
    target: &SaveTarget,
    sheets: &[Arc<Sheet>],
    options: &ExportOptions,
    reporter: &dyn Reporter,
) -> Result<()> {
    write_sheets(target, sheets, options, reporter, Layout::with_header())
}

/// Comma-separated values with a header row of column names.
pub fn save_csv(
    target: &SaveTarget,
    sheets: &[Arc<Sheet>],
    options: &ExportOptions,
    reporter: &dyn Reporter,
) -> Result<()> {
    write_sheets(
        target,
        sheets,
        options,
        reporter,
        Layout {
            header: true,
            delimiter: Some(","),
        },
    )
}

struct Layout {
    header: bool,
    /// Overrides the sheet's resolved delimiter when set.
    delimiter: Option<&'static str>,
}

impl Layout {
    fn plain() -> Self {
        Self {
            header: false,
            delimiter: None,
        }
    }

    fn with_header() -> Self {
        Self {
            header: true,
            delimiter: None,
        }
    }
}

fn write_sheets(
    target: &SaveTarget,
    sheets: &[Arc<Sheet>],
    options: &ExportOptions,
    reporter: &dyn Reporter,
    layout: Layout,
) -> Result<()> {
    let mut out = BufWriter::new(File::create(target.path())?);

    for sheet in sheets {
        let resolved = sheet.options().resolve(options);
        let delimiter: &str = match layout.delimiter {
            Some(d) => d,
            None => resolved.delimiter(),
        };
        let row_delimiter = resolved.row_delimiter();

        let projector = RowProjector::over_visible(sheet, ProjectMode::Display, options);

        if layout.header {
            let names: Vec<&str> = projector.columns().iter().map(|c| c.name()).collect();
            out.write_all(names.join(delimiter).as_bytes())?;
            out.write_all(row_delimiter.as_bytes())?;
        }

        for record in projector {
            let mut first = true;
            for cell in &record {
                if !first {
                    out.write_all(delimiter.as_bytes())?;
                }
                first = false;
                out.write_all(cell.display().as_bytes())?;
            }
            out.write_all(row_delimiter.as_bytes())?;
        }

        log::debug!("wrote {} rows of '{}' to {}", sheet.rows().len(), sheet.name(), target);
    }

    out.flush()?;
    reporter.status(&format!("{} save finished", target));
    Ok(())
}
