// ============================================================
// CELL VALUES
// ============================================================
// A single cell of a loaded table and the rules for typing raw text

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tokens read as a missing value, in addition to the empty string
const MISSING_TOKENS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "null", "NULL", "None", "#N/A", "<NA>",
];

/// One cell of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Missing,
    Int(i64),
    Float(f64),
    Text(String),
}

/// Column type inferred from its cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
}

impl ColumnKind {
    pub fn is_numeric(&self) -> bool {
        !matches!(self, ColumnKind::Text)
    }

    /// Infer the kind of a raw text column.
    /// A column with no present values is a float column.
    pub fn infer<'a>(cells: impl Iterator<Item = &'a str>) -> Self {
        let mut all_int = true;
        let mut all_float = true;

        for raw in cells {
            if is_missing_token(raw) {
                continue;
            }
            let trimmed = raw.trim();
            if all_int && trimmed.parse::<i64>().is_err() {
                all_int = false;
            }
            if trimmed.parse::<f64>().is_err() {
                all_float = false;
                break;
            }
        }

        if !all_float {
            ColumnKind::Text
        } else if all_int {
            ColumnKind::Integer
        } else {
            ColumnKind::Float
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Integer => write!(f, "integer"),
            ColumnKind::Float => write!(f, "float"),
            ColumnKind::Text => write!(f, "text"),
        }
    }
}

pub fn is_missing_token(raw: &str) -> bool {
    raw.is_empty() || MISSING_TOKENS.contains(&raw)
}

impl Value {
    /// Parse a raw cell according to the kind inferred for its column
    pub fn parse_cell(raw: &str, kind: ColumnKind) -> Self {
        if is_missing_token(raw) {
            return Value::Missing;
        }

        match kind {
            ColumnKind::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .unwrap_or(Value::Missing),
            ColumnKind::Float => raw
                .trim()
                .parse::<f64>()
                .map(Value::from_float)
                .unwrap_or(Value::Missing),
            ColumnKind::Text => Value::Text(raw.to_string()),
        }
    }

    /// NaN never enters a table; it becomes missing
    pub fn from_float(value: f64) -> Self {
        if value.is_nan() {
            Value::Missing
        } else {
            Value::Float(value)
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Numeric view of the cell; text that does not parse is treated as missing
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|v| !v.is_nan()),
            Value::Missing => None,
        }
    }

    /// Integral view of the cell; floats with a fractional part are not integral
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            Value::Text(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Key used for grouping and duplicate detection
    pub fn key(&self) -> Option<String> {
        match self {
            Value::Missing => None,
            other => Some(other.render()),
        }
    }

    /// Text written to a CSV cell.
    /// Integral floats keep a `.0` suffix so the column reloads as float.
    pub fn render(&self) -> String {
        match self {
            Value::Missing => String::new(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) if v.is_finite() && v.fract() == 0.0 => format!("{:.1}", v),
            Value::Float(v) => v.to_string(),
            Value::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}
