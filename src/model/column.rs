// src/model/column.rs
//! Columns: a named accessor/typing/formatting triple applied uniformly
//! across a sheet's rows.

use std::fmt;
use std::sync::Arc;

use super::sheet::Row;

/// Raw cell currency: whatever the loader or producer put in the row.
pub type Raw = serde_json::Value;

/// Failure raised inside a single cell's getter, coercion, or formatter.
///
/// Never escalates past the value pipeline; carried only so the pipeline can
/// substitute sentinel text.
#[derive(Debug, Clone)]
pub struct CellError(pub String);

impl CellError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for CellError {}

/// A cell value after type coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Declared type of a column; coerces raw values into [`TypedValue`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnType {
    /// Best-effort mapping, never fails.
    #[default]
    Any,
    Bool,
    Int,
    Float,
    Text,
}

impl ColumnType {
    /// Coerce a raw value to this column's type.
    pub fn coerce(&self, raw: &Raw) -> Result<TypedValue, CellError> {
        match self {
            Self::Any => Ok(Self::best_effort(raw)),
            Self::Bool => match raw {
                Raw::Bool(b) => Ok(TypedValue::Bool(*b)),
                Raw::String(s) => match s.as_str() {
                    "true" | "True" | "1" => Ok(TypedValue::Bool(true)),
                    "false" | "False" | "0" | "" => Ok(TypedValue::Bool(false)),
                    other => Err(CellError::new(format!("not a bool: '{}'", other))),
                },
                other => Err(CellError::new(format!("not a bool: {}", other))),
            },
            Self::Int => match raw {
                Raw::Number(n) => n
                    .as_i64()
                    .map(TypedValue::Int)
                    .ok_or_else(|| CellError::new(format!("not an int: {}", n))),
                Raw::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(TypedValue::Int)
                    .map_err(|e| CellError::new(format!("not an int: '{}' ({})", s, e))),
                other => Err(CellError::new(format!("not an int: {}", other))),
            },
            Self::Float => match raw {
                Raw::Number(n) => n
                    .as_f64()
                    .map(TypedValue::Float)
                    .ok_or_else(|| CellError::new(format!("not a float: {}", n))),
                Raw::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(TypedValue::Float)
                    .map_err(|e| CellError::new(format!("not a float: '{}' ({})", s, e))),
                other => Err(CellError::new(format!("not a float: {}", other))),
            },
            Self::Text => Ok(TypedValue::Text(Self::raw_text(raw))),
        }
    }

    fn best_effort(raw: &Raw) -> TypedValue {
        match raw {
            Raw::Bool(b) => TypedValue::Bool(*b),
            Raw::Number(n) => {
                if let Some(i) = n.as_i64() {
                    TypedValue::Int(i)
                } else {
                    TypedValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            other => TypedValue::Text(Self::raw_text(other)),
        }
    }

    /// Textual form of a raw value, without JSON quoting for plain strings.
    pub fn raw_text(raw: &Raw) -> String {
        match raw {
            Raw::String(s) => s.clone(),
            Raw::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// Extracts a cell's raw value from a row. May fail; may find nothing.
pub type Getter = Arc<dyn Fn(&Row) -> Result<Option<Raw>, CellError> + Send + Sync>;

/// Renders a typed value for display. May fail.
pub type Formatter = Arc<dyn Fn(&TypedValue) -> Result<String, CellError> + Send + Sync>;

/// A named accessor applied uniformly across a sheet's rows.
///
/// Immutable for the duration of an export.
#[derive(Clone)]
pub struct Column {
    name: String,
    visible: bool,
    ctype: ColumnType,
    getter: Getter,
    formatter: Option<Formatter>,
}

impl Column {
    /// Column backed by an arbitrary getter.
    pub fn new(name: impl Into<String>, ctype: ColumnType, getter: Getter) -> Self {
        Self {
            name: name.into(),
            visible: true,
            ctype,
            getter,
            formatter: None,
        }
    }

    /// Column reading the cell at `index` of each row. A missing cell or a
    /// JSON null is an absent value.
    pub fn indexed(name: impl Into<String>, index: usize, ctype: ColumnType) -> Self {
        let getter: Getter = Arc::new(move |row: &Row| {
            Ok(row
                .cell(index)
                .filter(|v| !v.is_null())
                .cloned())
        });
        Self::new(name, ctype, getter)
    }

    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn ctype(&self) -> ColumnType {
        self.ctype
    }

    /// Stage 1 of the value pipeline: raw extraction.
    pub fn get_raw(&self, row: &Row) -> Result<Option<Raw>, CellError> {
        (self.getter)(row)
    }

    /// Stage 3 of the value pipeline: display formatting.
    ///
    /// Falls back to the typed value's `Display` when the column carries no
    /// formatter of its own.
    pub fn format(&self, value: &TypedValue) -> Result<String, CellError> {
        match &self.formatter {
            Some(f) => f(value),
            None => Ok(value.to_string()),
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("visible", &self.visible)
            .field("ctype", &self.ctype)
            .field("formatter", &self.formatter.is_some())
            .finish()
    }
}
