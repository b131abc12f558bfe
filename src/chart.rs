//! Declarative chart specifications built from derived tables.
//!
//! A `ChartSpec` says what to draw (kind, encodings, colors) and carries the
//! already-extracted data, so widgets never touch a DataFrame. Distribution
//! bucketing (histogram bins, box quartiles, heatmap cells) happens here.

use polars::prelude::*;
use serde::Serialize;

/// Plotly's default qualitative palette; used for series colors.
pub const PLOTLY_PALETTE: &[&str] = &[
    "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3", "#ff6692", "#b6e880",
];

/// ColorBrewer Set2.
pub const SET2_PALETTE: &[&str] = &[
    "#66c2a5", "#fc8d62", "#8da0cb", "#e78ac3", "#a6d854", "#ffd92f", "#e5c494", "#b3b3b3",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Scatter,
    Histogram,
    Box,
    Line,
    Heatmap,
    Pie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

/// Continuous color scales used by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScale {
    Blues,
    Oranges,
    Viridis,
    Teal,
    Plasma,
    Inferno,
}

impl ColorScale {
    fn stops(self) -> &'static [(u8, u8, u8)] {
        match self {
            ColorScale::Blues => &[
                (222, 235, 247),
                (158, 202, 225),
                (66, 146, 198),
                (8, 81, 156),
                (8, 48, 107),
            ],
            ColorScale::Oranges => &[
                (254, 230, 206),
                (253, 174, 107),
                (241, 105, 19),
                (166, 54, 3),
                (127, 39, 4),
            ],
            ColorScale::Viridis => &[
                (68, 1, 84),
                (59, 82, 139),
                (33, 145, 140),
                (94, 201, 98),
                (253, 231, 37),
            ],
            ColorScale::Teal => &[(209, 238, 234), (133, 196, 201), (79, 144, 166), (42, 86, 116)],
            ColorScale::Plasma => &[
                (13, 8, 135),
                (126, 3, 168),
                (204, 71, 120),
                (248, 149, 64),
                (240, 249, 33),
            ],
            ColorScale::Inferno => &[
                (0, 0, 4),
                (87, 16, 110),
                (188, 55, 84),
                (249, 142, 9),
                (252, 255, 164),
            ],
        }
    }

    /// Color at position `t` in [0, 1], linearly interpolated between stops.
    pub fn sample(self, t: f64) -> (u8, u8, u8) {
        let stops = self.stops();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let scaled = t * (stops.len() - 1) as f64;
        let lo = scaled.floor() as usize;
        let hi = (lo + 1).min(stops.len() - 1);
        let frac = scaled - lo as f64;
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
        let (a, b) = (stops[lo], stops[hi]);
        (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
    }
}

/// Column names bound to visual channels.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Encoding {
    pub x: Option<String>,
    pub y: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub hover: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarDatum {
    pub label: String,
    pub value: f64,
    pub color_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarGroupDatum {
    pub label: String,
    /// One value per series, aligned with `ChartData::Groups::series`.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointDatum {
    pub x: f64,
    pub y: f64,
    pub size: Option<f64>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointSeries {
    pub name: String,
    pub points: Vec<PointDatum>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub label: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub points: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatGrid {
    pub x_labels: Vec<String>,
    pub y_labels: Vec<String>,
    /// `cells[y][x]`; `None` where the combination never occurs.
    pub cells: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartData {
    Bars {
        bars: Vec<BarDatum>,
    },
    Groups {
        series: Vec<String>,
        groups: Vec<BarGroupDatum>,
    },
    Points {
        series: Vec<PointSeries>,
        /// Category names when the y axis is categorical (index = y value).
        y_categories: Vec<String>,
    },
    Bins {
        bins: Vec<Bin>,
    },
    Boxes {
        boxes: Vec<BoxSummary>,
        show_points: bool,
    },
    Grid {
        grid: HeatGrid,
    },
    Slices {
        slices: Vec<Slice>,
        hole: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: Option<String>,
    pub encoding: Encoding,
    pub orientation: Orientation,
    pub color_scale: Option<ColorScale>,
    pub palette: Vec<String>,
    pub markers: bool,
    pub data: ChartData,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, data: ChartData) -> Self {
        Self {
            kind,
            title: None,
            encoding: Encoding::default(),
            orientation: Orientation::Vertical,
            color_scale: None,
            palette: PLOTLY_PALETTE.iter().map(|c| c.to_string()).collect(),
            markers: false,
            data,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn x(mut self, column: &str) -> Self {
        self.encoding.x = Some(column.to_string());
        self
    }

    pub fn y(mut self, column: &str) -> Self {
        self.encoding.y = Some(column.to_string());
        self
    }

    pub fn color(mut self, column: &str) -> Self {
        self.encoding.color = Some(column.to_string());
        self
    }

    pub fn size(mut self, column: &str) -> Self {
        self.encoding.size = Some(column.to_string());
        self
    }

    pub fn hover(mut self, columns: &[&str]) -> Self {
        self.encoding.hover = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn scale(mut self, scale: ColorScale) -> Self {
        self.color_scale = Some(scale);
        self
    }

    pub fn palette(mut self, colors: &[&str]) -> Self {
        self.palette = colors.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Bars grow along x; the category axis becomes y.
    pub fn horizontal(mut self) -> Self {
        self.orientation = Orientation::Horizontal;
        std::mem::swap(&mut self.encoding.x, &mut self.encoding.y);
        self
    }

    pub fn with_markers(mut self) -> Self {
        self.markers = true;
        self
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        match &self.data {
            ChartData::Bars { bars } => bars.is_empty(),
            ChartData::Groups { groups, .. } => groups.is_empty(),
            ChartData::Points { series, .. } => series.iter().all(|s| s.points.is_empty()),
            ChartData::Bins { bins } => bins.iter().all(|b| b.count == 0),
            ChartData::Boxes { boxes, .. } => boxes.is_empty(),
            ChartData::Grid { grid } => grid.cells.iter().flatten().all(Option::is_none),
            ChartData::Slices { slices, .. } => slices.is_empty(),
        }
    }
}

/// Compact number formatting: integers without decimals, otherwise up to 2 places.
pub fn format_number(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 && v.abs() < 1e15 {
        format!("{:.0}", v)
    } else {
        let s = format!("{:.2}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Column values as `f64` (null where missing or non-numeric).
pub fn numeric_values(df: &DataFrame, column: &str) -> PolarsResult<Vec<Option<f64>>> {
    let values = df.column(column)?.cast(&DataType::Float64)?;
    Ok(values.f64()?.into_iter().collect())
}

fn is_numeric_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Column values as display text (null stays `None`).
pub fn text_values(df: &DataFrame, column: &str) -> PolarsResult<Vec<Option<String>>> {
    let c = df.column(column)?;
    match c.dtype() {
        DataType::String => Ok(c.str()?.into_iter().map(|v| v.map(str::to_string)).collect()),
        dtype if is_numeric_type(dtype) => Ok(numeric_values(df, column)?
            .into_iter()
            .map(|v| v.map(format_number))
            .collect()),
        _ => {
            let as_text = c.cast(&DataType::String)?;
            Ok(as_text
                .str()?
                .into_iter()
                .map(|v| v.map(str::to_string))
                .collect())
        }
    }
}

/// Distinct values in order of first appearance.
fn distinct_in_order(values: &[Option<String>]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for v in values.iter().flatten() {
        if !seen.contains(v) {
            seen.push(v.clone());
        }
    }
    seen
}

/// One bar per row. Rows with a missing label or value are skipped.
pub fn bar_chart(df: &DataFrame, x: &str, y: &str, color: Option<&str>) -> PolarsResult<ChartSpec> {
    let labels = text_values(df, x)?;
    let values = numeric_values(df, y)?;
    let colors = match color {
        Some(c) => numeric_values(df, c)?,
        None => vec![None; values.len()],
    };
    let bars = labels
        .into_iter()
        .zip(values)
        .zip(colors)
        .filter_map(|((label, value), color_value)| {
            Some(BarDatum {
                label: label?,
                value: value?,
                color_value,
            })
        })
        .collect();
    let mut spec = ChartSpec::new(ChartKind::Bar, ChartData::Bars { bars })
        .x(x)
        .y(y);
    if let Some(c) = color {
        spec = spec.color(c);
    }
    Ok(spec)
}

/// Bars grouped by `x`, one bar per `series` value in each group. Groups are
/// ordered by `x` when numeric, by first appearance otherwise.
pub fn grouped_bar_chart(
    df: &DataFrame,
    x: &str,
    y: &str,
    series: &str,
) -> PolarsResult<ChartSpec> {
    let series_values = text_values(df, series)?;
    let x_text = text_values(df, x)?;
    let x_num = numeric_values(df, x).unwrap_or_else(|_| vec![None; x_text.len()]);
    let values = numeric_values(df, y)?;
    let series_names = distinct_in_order(&series_values);

    let mut keys: Vec<(Option<f64>, String)> = Vec::new();
    for (num, text) in x_num.iter().zip(&x_text) {
        if let Some(text) = text {
            if !keys.iter().any(|(_, t)| t == text) {
                keys.push((*num, text.clone()));
            }
        }
    }
    if keys.iter().all(|(n, _)| n.is_some()) {
        keys.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    }

    let groups = keys
        .into_iter()
        .map(|(_, label)| {
            let values = series_names
                .iter()
                .map(|s| {
                    let mut total: Option<f64> = None;
                    for i in 0..values.len() {
                        if x_text[i].as_deref() == Some(label.as_str())
                            && series_values[i].as_deref() == Some(s.as_str())
                        {
                            if let Some(v) = values[i] {
                                *total.get_or_insert(0.0) += v;
                            }
                        }
                    }
                    total
                })
                .collect();
            BarGroupDatum { label, values }
        })
        .collect();

    Ok(ChartSpec::new(
        ChartKind::Bar,
        ChartData::Groups {
            series: series_names,
            groups,
        },
    )
    .x(x)
    .y(y)
    .color(series))
}

fn point_series(
    df: &DataFrame,
    x: &str,
    y: &str,
    size: Option<&str>,
    hover: &[&str],
    series_by: Option<&str>,
) -> PolarsResult<(Vec<PointSeries>, Vec<String>)> {
    let xs = numeric_values(df, x)?;
    let y_is_text = df.column(y)?.dtype() == &DataType::String;
    let y_text = if y_is_text { text_values(df, y)? } else { Vec::new() };
    let y_categories = distinct_in_order(&y_text);
    let ys: Vec<Option<f64>> = if y_is_text {
        y_text
            .iter()
            .map(|v| {
                v.as_ref()
                    .and_then(|v| y_categories.iter().position(|c| c == v))
                    .map(|i| i as f64)
            })
            .collect()
    } else {
        numeric_values(df, y)?
    };
    let sizes = match size {
        Some(s) => numeric_values(df, s)?,
        None => vec![None; xs.len()],
    };
    let hover_columns = hover
        .iter()
        .map(|h| text_values(df, h))
        .collect::<PolarsResult<Vec<_>>>()?;
    let groups = match series_by {
        Some(s) => text_values(df, s)?,
        None => vec![None; xs.len()],
    };

    let mut series: Vec<PointSeries> = Vec::new();
    for i in 0..xs.len() {
        let (Some(px), Some(py)) = (xs[i], ys[i]) else {
            continue;
        };
        let name = match series_by {
            Some(_) => groups[i].clone().unwrap_or_else(|| "(missing)".to_string()),
            None => y.to_string(),
        };
        let label_parts: Vec<String> = hover_columns
            .iter()
            .filter_map(|values| values[i].clone())
            .collect();
        let point = PointDatum {
            x: px,
            y: py,
            size: sizes[i],
            label: (!label_parts.is_empty()).then(|| label_parts.join(" / ")),
        };
        match series.iter_mut().find(|s| s.name == name) {
            Some(existing) => existing.points.push(point),
            None => series.push(PointSeries {
                name,
                points: vec![point],
            }),
        }
    }
    Ok((series, y_categories))
}

/// Scatter plot; a text `y` column is treated as categorical.
pub fn scatter_chart(
    df: &DataFrame,
    x: &str,
    y: &str,
    size: Option<&str>,
    hover: &[&str],
    series_by: Option<&str>,
) -> PolarsResult<ChartSpec> {
    let (series, y_categories) = point_series(df, x, y, size, hover, series_by)?;
    let mut spec = ChartSpec::new(
        ChartKind::Scatter,
        ChartData::Points {
            series,
            y_categories,
        },
    )
    .x(x)
    .y(y)
    .hover(hover);
    if let Some(s) = size {
        spec = spec.size(s);
    }
    if let Some(c) = series_by {
        spec = spec.color(c);
    }
    Ok(spec)
}

/// Line chart with one line per `series_by` value, points in row order.
pub fn line_chart(df: &DataFrame, x: &str, y: &str, series_by: &str) -> PolarsResult<ChartSpec> {
    let (series, y_categories) = point_series(df, x, y, None, &[], Some(series_by))?;
    Ok(ChartSpec::new(
        ChartKind::Line,
        ChartData::Points {
            series,
            y_categories,
        },
    )
    .x(x)
    .y(y)
    .color(series_by))
}

/// Equal-width bins between the minimum and maximum present value.
pub fn bin_values(values: &[f64], nbins: usize) -> Vec<Bin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || nbins == 0 {
        return Vec::new();
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max <= min {
        return vec![Bin {
            start: min,
            end: min + 1.0,
            count: finite.len(),
        }];
    }
    let width = (max - min) / nbins as f64;
    let mut bins: Vec<Bin> = (0..nbins)
        .map(|i| Bin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    for v in finite {
        let idx = (((v - min) / width).floor() as usize).min(nbins - 1);
        bins[idx].count += 1;
    }
    bins
}

pub fn histogram(df: &DataFrame, column: &str, nbins: usize) -> PolarsResult<ChartSpec> {
    let values: Vec<f64> = numeric_values(df, column)?.into_iter().flatten().collect();
    Ok(ChartSpec::new(
        ChartKind::Histogram,
        ChartData::Bins {
            bins: bin_values(&values, nbins),
        },
    )
    .x(column))
}

/// Linear-interpolated quantile of sorted values.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Five-number summary with 1.5×IQR whiskers. `None` for no values.
pub fn box_summary(label: &str, values: &[f64]) -> Option<BoxSummary> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));
    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
    let lower_whisker = sorted
        .iter()
        .copied()
        .find(|v| *v >= lo_fence)
        .unwrap_or(sorted[0]);
    let upper_whisker = sorted
        .iter()
        .rev()
        .copied()
        .find(|v| *v <= hi_fence)
        .unwrap_or(sorted[sorted.len() - 1]);
    Some(BoxSummary {
        label: label.to_string(),
        count: sorted.len(),
        min: sorted[0],
        q1,
        median,
        q3,
        max: sorted[sorted.len() - 1],
        lower_whisker,
        upper_whisker,
        points: values.iter().copied().filter(|v| v.is_finite()).collect(),
    })
}

/// Box plot of `y`, one box per `group_by` value (first-appearance order) or a single box.
pub fn box_chart(
    df: &DataFrame,
    y: &str,
    group_by: Option<&str>,
    show_points: bool,
) -> PolarsResult<ChartSpec> {
    let values = numeric_values(df, y)?;
    let boxes = match group_by {
        None => {
            let present: Vec<f64> = values.iter().flatten().copied().collect();
            box_summary(y, &present).into_iter().collect()
        }
        Some(g) => {
            let groups = text_values(df, g)?;
            distinct_in_order(&groups)
                .iter()
                .filter_map(|label| {
                    let members: Vec<f64> = groups
                        .iter()
                        .zip(&values)
                        .filter(|(grp, _)| grp.as_deref() == Some(label.as_str()))
                        .filter_map(|(_, v)| *v)
                        .collect();
                    box_summary(label, &members)
                })
                .collect()
        }
    };
    let mut spec = ChartSpec::new(ChartKind::Box, ChartData::Boxes { boxes, show_points }).y(y);
    if let Some(g) = group_by {
        spec = spec.x(g).color(g);
    }
    Ok(spec)
}

/// Heatmap summing `z` per (`x`, `y`) cell. Numeric `x` labels are sorted.
pub fn heatmap(df: &DataFrame, x: &str, y: &str, z: &str) -> PolarsResult<ChartSpec> {
    let x_text = text_values(df, x)?;
    let x_num = numeric_values(df, x).unwrap_or_else(|_| vec![None; x_text.len()]);
    let y_text = text_values(df, y)?;
    let zs = numeric_values(df, z)?;

    let mut x_keys: Vec<(Option<f64>, String)> = Vec::new();
    for (num, text) in x_num.iter().zip(&x_text) {
        if let Some(text) = text {
            if !x_keys.iter().any(|(_, t)| t == text) {
                x_keys.push((*num, text.clone()));
            }
        }
    }
    if x_keys.iter().all(|(n, _)| n.is_some()) {
        x_keys.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    }
    let x_labels: Vec<String> = x_keys.into_iter().map(|(_, t)| t).collect();
    let y_labels = distinct_in_order(&y_text);

    let mut cells = vec![vec![None; x_labels.len()]; y_labels.len()];
    for i in 0..zs.len() {
        let (Some(xv), Some(yv), Some(zv)) = (&x_text[i], &y_text[i], zs[i]) else {
            continue;
        };
        let xi = x_labels.iter().position(|l| l == xv);
        let yi = y_labels.iter().position(|l| l == yv);
        if let (Some(xi), Some(yi)) = (xi, yi) {
            let cell: &mut Option<f64> = &mut cells[yi][xi];
            *cell.get_or_insert(0.0) += zv;
        }
    }

    Ok(ChartSpec::new(
        ChartKind::Heatmap,
        ChartData::Grid {
            grid: HeatGrid {
                x_labels,
                y_labels,
                cells,
            },
        },
    )
    .x(x)
    .y(y)
    .color(z))
}

/// Pie (donut when `hole` > 0) of `values` by `names`, in row order.
pub fn pie_chart(df: &DataFrame, names: &str, values: &str, hole: f64) -> PolarsResult<ChartSpec> {
    let labels = text_values(df, names)?;
    let amounts = numeric_values(df, values)?;
    let slices = labels
        .into_iter()
        .zip(amounts)
        .filter_map(|(label, value)| {
            Some(Slice {
                label: label?,
                value: value?,
            })
        })
        .collect();
    Ok(ChartSpec::new(ChartKind::Pie, ChartData::Slices { slices, hole })
        .x(names)
        .y(values))
}
