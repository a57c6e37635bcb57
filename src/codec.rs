//! Row codec: delimited text lines to typed rows
//!
//! Two record layouts are supported:
//!
//! - `pairs` (default): each record carries name/value pairs as adjacent
//!   fields. For every schema column the codec finds the first field whose
//!   content equals the column name and takes the *following* field as the
//!   raw value. This matches feeds where each line self-describes, e.g.
//!   `id<TAB>42<TAB>name<TAB>Alice`.
//! - `header`: the first line of the stream names the columns; a
//!   [`HeaderIndex`] maps each schema column to its field position once,
//!   and every subsequent record is decoded positionally.
//!
//! Decoding is pure: a function of the line, the schema, and (for the
//! header layout) the prebuilt index. A failed conversion aborts the whole
//! line; no partial rows are produced.

use crate::error::{ParseError, ParseResult};
use crate::schema::{Column, ColumnType, Row, Schema, Value};

/// Split a line into raw fields on the configured delimiter
pub fn split_fields(line: &str, delimiter: char) -> Vec<&str> {
    line.split(delimiter).collect()
}

/// Decode one record in the pairs layout
///
/// For each schema column, scans the fields left to right for the first
/// field equal to the column name; the next field is the raw value. A
/// missing name, or a name with no field after it, is an error naming the
/// column rather than an out-of-range access.
pub fn parse_row(line: &str, schema: &Schema, delimiter: char) -> ParseResult<Row> {
    let fields = split_fields(line, delimiter);
    let mut values = Vec::with_capacity(schema.len());

    for column in schema.columns() {
        let pos = fields
            .iter()
            .position(|f| *f == column.name)
            .ok_or_else(|| ParseError::ColumnNotFound {
                column: column.name.clone(),
            })?;
        let raw = fields.get(pos + 1).ok_or_else(|| ParseError::ColumnNotFound {
            column: column.name.clone(),
        })?;
        values.push((column.name.clone(), convert(raw, column)?));
    }

    Ok(Row::new(values))
}

/// Field positions for the header layout
///
/// Built once from the header line; maps each schema column (in schema
/// order) to the index of its field in every subsequent record.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    positions: Vec<usize>,
}

impl HeaderIndex {
    /// Resolve schema columns against a header line
    pub fn build(header: &str, schema: &Schema, delimiter: char) -> ParseResult<Self> {
        let fields = split_fields(header, delimiter);
        let mut positions = Vec::with_capacity(schema.len());

        for column in schema.columns() {
            let pos = fields
                .iter()
                .position(|f| *f == column.name)
                .ok_or_else(|| ParseError::ColumnNotFound {
                    column: column.name.clone(),
                })?;
            positions.push(pos);
        }

        Ok(Self { positions })
    }

    /// Field position for the n-th schema column
    pub fn position(&self, column_idx: usize) -> usize {
        self.positions[column_idx]
    }
}

/// Decode one record positionally using a prebuilt header index
pub fn parse_row_at(
    line: &str,
    schema: &Schema,
    index: &HeaderIndex,
    delimiter: char,
) -> ParseResult<Row> {
    let fields = split_fields(line, delimiter);
    let mut values = Vec::with_capacity(schema.len());

    for (i, column) in schema.columns().iter().enumerate() {
        let raw = fields
            .get(index.position(i))
            .ok_or_else(|| ParseError::ColumnNotFound {
                column: column.name.clone(),
            })?;
        values.push((column.name.clone(), convert(raw, column)?));
    }

    Ok(Row::new(values))
}

/// Convert a raw field to the column's declared type
fn convert(raw: &str, column: &Column) -> ParseResult<Value> {
    match column.ty {
        ColumnType::Text => Ok(Value::Text(raw.to_string())),
        ColumnType::Integer => raw
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| ParseError::TypeConversion {
                column: column.name.clone(),
                value: raw.to_string(),
                ty: column.ty,
            }),
        ColumnType::Float => raw
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| ParseError::TypeConversion {
                column: column.name.clone(),
                value: raw.to_string(),
                ty: column.ty,
            }),
    }
}

/// Decoder facade shared by the driver and dispatch workers
///
/// Bundles the schema, the delimiter, and the lookup strategy so callers
/// decode with a single call regardless of layout.
#[derive(Debug, Clone)]
pub struct RowDecoder {
    schema: Schema,
    delimiter: char,
    lookup: Lookup,
}

#[derive(Debug, Clone)]
enum Lookup {
    Pairs,
    Positional(HeaderIndex),
}

impl RowDecoder {
    /// Decoder for the pairs layout
    pub fn pairs(schema: Schema, delimiter: char) -> Self {
        Self {
            schema,
            delimiter,
            lookup: Lookup::Pairs,
        }
    }

    /// Decoder for the header layout, with a prebuilt index
    pub fn positional(schema: Schema, delimiter: char, index: HeaderIndex) -> Self {
        Self {
            schema,
            delimiter,
            lookup: Lookup::Positional(index),
        }
    }

    /// Decode one record
    pub fn decode(&self, line: &str) -> ParseResult<Row> {
        match &self.lookup {
            Lookup::Pairs => parse_row(line, &self.schema, self.delimiter),
            Lookup::Positional(index) => parse_row_at(line, &self.schema, index, self.delimiter),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}
