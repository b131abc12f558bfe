//! Declared column schemas and numeric coercion.
//!
//! Every dataset is read with all columns as text. The schema then names the
//! columns that must become `Float64`; values that do not parse become null
//! ("missing") and the row is kept.

use polars::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub required: bool,
}

impl ColumnSpec {
    pub const fn numeric(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Numeric,
            required: true,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Text,
            required: true,
        }
    }

    pub const fn optional(self) -> Self {
        Self {
            required: false,
            ..self
        }
    }
}

/// Column declarations for one dataset. Columns not listed pass through untouched.
#[derive(Debug, Clone, Copy)]
pub struct DatasetSchema {
    pub columns: &'static [ColumnSpec],
}

impl DatasetSchema {
    /// Required columns absent from `df`, in declaration order.
    pub fn missing_required(&self, df: &DataFrame) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| c.required && !has_column(df, c.name))
            .map(|c| c.name)
            .collect()
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Numeric)
            .map(|c| c.name)
    }

    pub fn text_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Text)
            .map(|c| c.name)
    }

    /// Apply the schema: numeric columns to `Float64`, text columns to `String`.
    /// Declared columns missing from the frame are skipped.
    pub fn apply(&self, df: &DataFrame) -> PolarsResult<DataFrame> {
        let numeric: Vec<&str> = self.numeric_columns().collect();
        let text: Vec<&str> = self.text_columns().collect();
        let df = coerce_numeric(df, &numeric)?;
        coerce_text(&df, &text)
    }
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

fn numeric_expr(name: &str, dtype: &DataType) -> Expr {
    let column = col(PlSmallStr::from(name));
    let as_float = match dtype {
        DataType::String => {
            let trimmed = column
                .str()
                .strip_chars(lit(PlSmallStr::from_static(" \t\n\r")));
            when(trimmed.clone().eq(lit(PlSmallStr::from_static(""))))
                .then(Null {}.lit())
                .otherwise(trimmed)
                .cast(DataType::Float64)
        }
        DataType::Float64 => column,
        _ => column.cast(DataType::Float64),
    };
    // "nan" parses as NaN; treat it as missing like any other unparseable cell
    as_float.fill_nan(Null {}.lit()).alias(PlSmallStr::from(name))
}

/// Coerce the named columns to `Float64`. Unparseable cells become null; the
/// row count never changes. Running it twice is a no-op.
pub fn coerce_numeric(df: &DataFrame, columns: &[&str]) -> PolarsResult<DataFrame> {
    let schema = df.schema();
    let exprs: Vec<Expr> = columns
        .iter()
        .filter_map(|name| schema.get(name).map(|dtype| numeric_expr(name, dtype)))
        .collect();
    if exprs.is_empty() {
        return Ok(df.clone());
    }
    df.clone().lazy().with_columns(exprs).collect()
}

/// Coerce the named columns to text (e.g. an inning column read as `1`/`2`).
pub fn coerce_text(df: &DataFrame, columns: &[&str]) -> PolarsResult<DataFrame> {
    let schema = df.schema();
    let exprs: Vec<Expr> = columns
        .iter()
        .filter(|name| matches!(schema.get(name), Some(dtype) if *dtype != DataType::String))
        .map(|name| {
            col(PlSmallStr::from(*name))
                .cast(DataType::String)
                .alias(PlSmallStr::from(*name))
        })
        .collect();
    if exprs.is_empty() {
        return Ok(df.clone());
    }
    df.clone().lazy().with_columns(exprs).collect()
}
