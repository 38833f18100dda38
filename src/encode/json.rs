// src/encode/json.rs
//! JSON encoder: typed-mode projection serialized as an array of
//! name→value objects, one per row.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::Result;
use crate::model::{Sheet, TypedValue};
use crate::options::ExportOptions;
use crate::project::{CellOut, ProjectMode, RowProjector};
use crate::report::Reporter;
use crate::save::SaveTarget;

/// Serialize all given sheets' rows into one JSON array.
pub fn save_json(
    target: &SaveTarget,
    sheets: &[Arc<Sheet>],
    options: &ExportOptions,
    reporter: &dyn Reporter,
) -> Result<()> {
    let mut records: Vec<IndexMap<String, Value>> = Vec::new();

    for sheet in sheets {
        let projector = RowProjector::over_visible(sheet, ProjectMode::Typed, options);
        let names: Vec<String> = projector
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        for record in projector {
            let mut object = IndexMap::with_capacity(names.len());
            for (name, cell) in names.iter().zip(record) {
                object.insert(name.clone(), cell_to_json(cell));
            }
            records.push(object);
        }
    }

    let mut out = BufWriter::new(File::create(target.path())?);
    serde_json::to_writer_pretty(&mut out, &records)?;
    out.write_all(b"\n")?;
    out.flush()?;

    reporter.status(&format!("{} save finished", target));
    Ok(())
}

fn cell_to_json(cell: CellOut) -> Value {
    match cell {
        CellOut::Absent => Value::Null,
        CellOut::Typed(TypedValue::Bool(b)) => Value::Bool(b),
        CellOut::Typed(TypedValue::Int(i)) => Value::from(i),
        CellOut::Typed(TypedValue::Float(x)) => {
            serde_json::Number::from_f64(x).map_or(Value::Null, Value::Number)
        }
        CellOut::Typed(TypedValue::Text(s)) => Value::String(s),
        CellOut::Text(s) | CellOut::Error(s) => Value::String(s),
    }
}
