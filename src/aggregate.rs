//! Aggregation engine: pure functions from a coerced table to a derived table.

use std::fmt;

use polars::prelude::*;
use serde::Serialize;

/// Batting filter from the sidebar. "All" means no restriction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerFilter {
    #[default]
    All,
    Player(String),
}

impl PlayerFilter {
    pub const ALL_LABEL: &'static str = "All";

    pub fn from_label(label: &str) -> Self {
        if label == Self::ALL_LABEL {
            PlayerFilter::All
        } else {
            PlayerFilter::Player(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PlayerFilter::All => Self::ALL_LABEL,
            PlayerFilter::Player(name) => name,
        }
    }
}

impl fmt::Display for PlayerFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Descending,
    Ascending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    AtLeast,
    LessThan,
}

impl Comparison {
    fn expr(self, column: Expr, bound: f64) -> Expr {
        match self {
            Comparison::AtLeast => column.gt_eq(lit(bound)),
            Comparison::LessThan => column.lt(lit(bound)),
        }
    }
}

fn name(s: &str) -> PlSmallStr {
    PlSmallStr::from(s)
}

/// Restrict a table with a `player` column to the exact label.
pub fn filter_player(df: &DataFrame, filter: &PlayerFilter) -> PolarsResult<DataFrame> {
    match filter {
        PlayerFilter::All => Ok(df.clone()),
        PlayerFilter::Player(player) => df
            .clone()
            .lazy()
            .filter(col("player").eq(lit(player.as_str())))
            .collect(),
    }
}

/// Add `total_boundaries = boundary_fours + boundary_sixes` (missing if either is).
pub fn with_total_boundaries(df: &DataFrame) -> PolarsResult<DataFrame> {
    df.clone()
        .lazy()
        .with_column((col("boundary_fours") + col("boundary_sixes")).alias("total_boundaries"))
        .collect()
}

/// Keep at most `n` rows ordered by `key`. Rows with a missing key are dropped;
/// ties keep their original order.
pub fn rank(df: &DataFrame, key: &str, order: Order, n: usize) -> PolarsResult<DataFrame> {
    let options = SortMultipleOptions::default()
        .with_order_descending(order == Order::Descending)
        .with_maintain_order(true);
    df.clone()
        .lazy()
        .filter(col(name(key)).is_not_null())
        .sort_by_exprs(vec![col(name(key))], options)
        .limit(n as IdxSize)
        .collect()
}

pub fn top_n(df: &DataFrame, key: &str, n: usize) -> PolarsResult<DataFrame> {
    rank(df, key, Order::Descending, n)
}

/// Rows whose `column` satisfies the comparison; missing values never match.
pub fn threshold(
    df: &DataFrame,
    column: &str,
    comparison: Comparison,
    bound: f64,
) -> PolarsResult<DataFrame> {
    df.clone()
        .lazy()
        .filter(comparison.expr(col(name(column)), bound))
        .collect()
}

/// Rows where `column` is present.
pub fn present(df: &DataFrame, column: &str) -> PolarsResult<DataFrame> {
    df.clone()
        .lazy()
        .filter(col(name(column)).is_not_null())
        .collect()
}

/// Rows where the boolean `column` is true.
pub fn flagged(df: &DataFrame, column: &str) -> PolarsResult<DataFrame> {
    df.clone()
        .lazy()
        .filter(col(name(column)).fill_null(lit(false)))
        .collect()
}

fn keys_present(keys: &[&str]) -> Expr {
    keys.iter()
        .map(|k| col(name(k)).is_not_null())
        .reduce(|a, b| a.and(b))
        .unwrap_or_else(|| lit(true))
}

/// Sum `value` per distinct combination of `keys`, in order of first appearance.
/// Only combinations present in the data appear; rows with a missing key are dropped.
pub fn group_sum(
    df: &DataFrame,
    keys: &[&str],
    value: &str,
    alias: &str,
) -> PolarsResult<DataFrame> {
    let key_exprs: Vec<Expr> = keys.iter().map(|k| col(name(k))).collect();
    df.clone()
        .lazy()
        .filter(keys_present(keys))
        .group_by_stable(key_exprs)
        .agg([col(name(value)).sum().alias(name(alias))])
        .collect()
}

/// Count rows per distinct combination of `keys`, in order of first appearance.
pub fn group_count(df: &DataFrame, keys: &[&str], alias: &str) -> PolarsResult<DataFrame> {
    let key_exprs: Vec<Expr> = keys.iter().map(|k| col(name(k))).collect();
    df.clone()
        .lazy()
        .filter(keys_present(keys))
        .group_by_stable(key_exprs)
        .agg([len().cast(DataType::Float64).alias(name(alias))])
        .collect()
}

/// Running total of `value` within each `partition`, in existing row order.
/// Rows are not re-sorted: the input order is taken as chronological.
pub fn cumulative_sum(
    df: &DataFrame,
    value: &str,
    partition: &str,
    alias: &str,
) -> PolarsResult<DataFrame> {
    df.clone()
        .lazy()
        .with_column(
            col(name(value))
                .cum_sum(false)
                .over([col(name(partition))])
                .alias(name(alias)),
        )
        .collect()
}

/// Add `over` as the integer floor of `ball_over`.
pub fn with_over(df: &DataFrame) -> PolarsResult<DataFrame> {
    df.clone()
        .lazy()
        .with_column(col("ball_over").floor().cast(DataType::Int64).alias("over"))
        .collect()
}

/// Add `is_boundary`: batsman_runs is 4 or 6 (false when missing).
pub fn with_is_boundary(df: &DataFrame) -> PolarsResult<DataFrame> {
    let runs = col("batsman_runs");
    df.clone()
        .lazy()
        .with_column(
            runs.clone()
                .eq(lit(4.0))
                .or(runs.eq(lit(6.0)))
                .fill_null(lit(false))
                .alias("is_boundary"),
        )
        .collect()
}
