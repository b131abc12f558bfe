use polars::prelude::*;
use serde::Serialize;

use crate::chart::format_number;

/// First rows of a table, already formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Rows in the source table, which may exceed `rows.len()`.
    pub total_rows: usize,
}

impl TablePreview {
    pub fn from_frame(df: &DataFrame, limit: usize) -> PolarsResult<Self> {
        let head = df.head(Some(limit));
        let headers = head
            .get_column_names()
            .iter()
            .map(|c| c.to_string())
            .collect();
        let columns = head.get_columns();
        let mut rows = Vec::with_capacity(head.height());
        for i in 0..head.height() {
            let row = columns
                .iter()
                .map(|c| c.get(i).map(|v| format_cell(&v)))
                .collect::<PolarsResult<Vec<_>>>()?;
            rows.push(row);
        }
        Ok(Self {
            headers,
            rows,
            total_rows: df.height(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Display width per column: widest of header and cells.
    pub fn column_widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                self.rows
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|c| c.chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

pub fn format_cell(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Float64(v) => format_number(*v),
        AnyValue::Float32(v) => format_number(*v as f64),
        other => other.str_value().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_and_formats() {
        let df = df!(
            "player" => &["A", "B", "C"],
            "runs" => &[Some(50.0), None, Some(12.5)]
        )
        .unwrap();
        let preview = TablePreview::from_frame(&df, 2).unwrap();
        assert_eq!(preview.headers, vec!["player", "runs"]);
        assert_eq!(preview.rows, vec![vec!["A", "50"], vec!["B", ""]]);
        assert_eq!(preview.total_rows, 3);
        assert_eq!(preview.column_widths(), vec![6, 4]);
    }
}
