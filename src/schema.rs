//! Column schema and typed row model
//!
//! These types describe the shape of the target table and the typed rows
//! produced by the codec. The schema is fixed for the lifetime of a load
//! run, and its declaration order is the canonical column order used for
//! statement generation and binding.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use rusqlite::types::{ToSql, ToSqlOutput};
use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};

/// Supported column types
///
/// The loader converts raw text into exactly these three types; anything
/// else in a schema specification is rejected when the schema is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// UTF-8 text, stored as-is
    Text,
    /// 64-bit signed integer
    Integer,
    /// 64-bit float
    Float,
}

impl ColumnType {
    /// SQL type name used when creating the target table
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Float => "REAL",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Float => "FLOAT",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ColumnType {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.to_ascii_uppercase().as_str() {
            "TEXT" => Ok(ColumnType::Text),
            "INTEGER" => Ok(ColumnType::Integer),
            "FLOAT" => Ok(ColumnType::Float),
            other => Err(ConfigError::UnsupportedType { ty: other.into() }),
        }
    }
}

impl<'de> Deserialize<'de> for ColumnType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A typed value ready for parameter binding
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Value::Text(s) => s.to_sql(),
            Value::Integer(i) => i.to_sql(),
            Value::Float(f) => f.to_sql(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
        }
    }
}

/// A single column declaration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Column {
    /// Column name (validated as a SQL identifier)
    pub name: String,

    /// Declared type
    #[serde(rename = "type")]
    pub ty: ColumnType,
}

/// Ordered column schema for the target table
///
/// Construction validates column names and rejects duplicates; the order
/// columns were declared in is preserved and used everywhere downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Build a schema from an ordered column list
    pub fn new(columns: Vec<Column>) -> ConfigResult<Self> {
        if columns.is_empty() {
            return Err(ConfigError::EmptySchema);
        }
        for (i, col) in columns.iter().enumerate() {
            validate_identifier(&col.name)?;
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(ConfigError::DuplicateColumn {
                    column: col.name.clone(),
                });
            }
        }
        Ok(Self { columns })
    }

    /// Parse the compact CLI form: `name:TYPE,name:TYPE,...`
    pub fn parse(spec: &str) -> ConfigResult<Self> {
        let mut columns = Vec::new();
        for entry in spec.split(',') {
            let entry = entry.trim();
            let (name, ty) = entry
                .split_once(':')
                .ok_or_else(|| ConfigError::InvalidSchemaSpec {
                    entry: entry.into(),
                })?;
            let name = name.trim();
            if name.is_empty() {
                return Err(ConfigError::InvalidSchemaSpec {
                    entry: entry.into(),
                });
            }
            columns.push(Column {
                name: name.to_string(),
                ty: ty.trim().parse()?,
            });
        }
        Self::new(columns)
    }

    /// Load a schema from a JSON file: `[{"name": "id", "type": "INTEGER"}, ...]`
    ///
    /// The array form keeps the declared column order deterministic.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let file = File::open(path).map_err(|e| ConfigError::SchemaFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let columns: Vec<Column> =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| ConfigError::SchemaFile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Self::new(columns)
    }

    /// Columns in declaration order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in declaration order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// A typed row in schema column order
///
/// Rows are fully populated or not produced at all; the codec never emits
/// a partial row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<(String, Value)>,
}

impl Row {
    /// Build a row from ordered (column, value) pairs
    pub fn new(values: Vec<(String, Value)>) -> Self {
        Self { values }
    }

    /// Look a value up by column name
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
    }

    /// Column names in row order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    /// Values in row order
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.iter().map(|(_, v)| v)
    }

    /// Number of columns in this row
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Check that a name is usable as an unquoted SQL identifier
pub fn validate_identifier(name: &str) -> ConfigResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier { name: name.into() })
    }
}
