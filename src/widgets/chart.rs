//! Draws a `ChartSpec` with ratatui primitives.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Chart, Dataset, GraphType, LegendPosition, Paragraph,
        Widget,
    },
};

use crate::chart::{
    format_number, BarDatum, BarGroupDatum, Bin, BoxSummary, ChartData, ChartKind, ChartSpec,
    HeatGrid, Orientation, PointSeries, Slice,
};
use crate::config::Theme;

const MAX_BAR_WIDTH: u16 = 9;
const HEATMAP_LABEL_WIDTH: u16 = 8;

/// BarChart takes integer values; keep two decimals of precision.
fn bar_value(v: f64) -> u64 {
    (v.max(0.0) * 100.0).round() as u64
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Widen a degenerate range so axes never collapse.
fn padded((lo, hi): (f64, f64)) -> (f64, f64) {
    if hi > lo {
        (lo, hi)
    } else {
        (lo - 0.5, hi + 0.5)
    }
}

fn unit(v: f64, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo {
        (v - lo) / (hi - lo)
    } else {
        1.0
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else if width <= 1 {
        s.chars().take(width).collect()
    } else {
        let mut out: String = s.chars().take(width - 1).collect();
        out.push('…');
        out
    }
}

fn axis_labels(lo: f64, hi: f64, style: Style) -> Vec<Span<'static>> {
    vec![
        Span::styled(format_number(lo), style),
        Span::styled(format_number((lo + hi) / 2.0), style),
        Span::styled(format_number(hi), style),
    ]
}

pub struct ChartView<'a> {
    spec: &'a ChartSpec,
    theme: &'a Theme,
}

impl<'a> ChartView<'a> {
    pub fn new(spec: &'a ChartSpec, theme: &'a Theme) -> Self {
        Self { spec, theme }
    }

    fn palette_color(&self, i: usize) -> Color {
        match self.spec.palette.get(i % self.spec.palette.len().max(1)) {
            Some(hex) => self.theme.parse_or_primary(hex),
            None => self.theme.get("primary"),
        }
    }

    fn scale_color(&self, t: f64) -> Color {
        match self.spec.color_scale {
            Some(scale) => self.theme.rgb(scale.sample(t)),
            None => self.palette_color(0),
        }
    }

    fn axis_style(&self) -> Style {
        Style::default().fg(self.theme.get("chart_axis"))
    }

    fn axis_title(&self, column: &Option<String>) -> String {
        column.clone().unwrap_or_default()
    }

    fn render_bars(&self, bars: &[BarDatum], area: Rect, buf: &mut Buffer) {
        let range = bounds(bars.iter().filter_map(|b| b.color_value));
        let horizontal = self.spec.orientation == Orientation::Horizontal;
        let label_width = if horizontal {
            bars.iter()
                .map(|b| b.label.chars().count())
                .max()
                .unwrap_or(0)
                .min(area.width as usize / 3)
        } else {
            let per_bar = area.width / (bars.len() as u16).max(1);
            per_bar.saturating_sub(1).clamp(1, MAX_BAR_WIDTH) as usize
        };

        let items: Vec<Bar> = bars
            .iter()
            .map(|b| {
                let color = match (b.color_value, range) {
                    (Some(v), Some(range)) => self.scale_color(unit(v, range)),
                    _ => self.palette_color(0),
                };
                Bar::default()
                    .value(bar_value(b.value))
                    .text_value(format_number(b.value))
                    .label(Line::from(truncate(&b.label, label_width)))
                    .style(Style::default().fg(color))
                    .value_style(Style::default().fg(Color::Black).bg(color))
            })
            .collect();

        let chart = BarChart::default()
            .data(BarGroup::default().bars(&items))
            .label_style(self.axis_style())
            .bar_gap(1);
        let chart = if horizontal {
            chart.direction(Direction::Horizontal).bar_width(1).bar_gap(0)
        } else {
            chart.bar_width(label_width as u16)
        };
        chart.render(area, buf);
    }

    fn render_groups(
        &self,
        series: &[String],
        groups: &[BarGroupDatum],
        area: Rect,
        buf: &mut Buffer,
    ) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(area);
        self.render_legend(series, layout[0], buf);

        let bars_per_group = series.len().max(1) as u16;
        let group_width = layout[1].width / (groups.len() as u16).max(1);
        let bar_width = (group_width.saturating_sub(1) / bars_per_group).clamp(1, MAX_BAR_WIDTH);

        let bar_groups: Vec<Vec<Bar>> = groups
            .iter()
            .map(|g| {
                g.values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| {
                        let v = v.unwrap_or(0.0);
                        Bar::default()
                            .value(bar_value(v))
                            .text_value(format_number(v))
                            .style(Style::default().fg(self.palette_color(i)))
                    })
                    .collect()
            })
            .collect();

        let mut chart = BarChart::default()
            .bar_width(bar_width)
            .bar_gap(0)
            .group_gap(1)
            .label_style(self.axis_style());
        for (group, bars) in groups.iter().zip(&bar_groups) {
            chart = chart.data(
                BarGroup::default()
                    .label(Line::from(group.label.clone()))
                    .bars(bars),
            );
        }
        chart.render(layout[1], buf);
    }

    fn render_legend(&self, names: &[String], area: Rect, buf: &mut Buffer) {
        let spans: Vec<Span> = names
            .iter()
            .enumerate()
            .flat_map(|(i, name)| {
                [
                    Span::styled("■ ", Style::default().fg(self.palette_color(i))),
                    Span::styled(format!("{}  ", name), self.axis_style()),
                ]
            })
            .collect();
        Paragraph::new(Line::from(spans)).render(area, buf);
    }

    fn render_points(
        &self,
        series: &[PointSeries],
        y_categories: &[String],
        area: Rect,
        buf: &mut Buffer,
    ) {
        let data: Vec<Vec<(f64, f64)>> = series
            .iter()
            .map(|s| s.points.iter().map(|p| (p.x, p.y)).collect())
            .collect();
        let all = || data.iter().flatten();
        let Some(x_range) = bounds(all().map(|(x, _)| *x)) else {
            return;
        };
        let (x_lo, x_hi) = padded(x_range);

        let line = self.spec.kind == ChartKind::Line;
        let datasets: Vec<Dataset> = series
            .iter()
            .zip(&data)
            .enumerate()
            .map(|(i, (s, points))| {
                Dataset::default()
                    .name(s.name.clone())
                    .marker(if line || !self.spec.markers {
                        symbols::Marker::Braille
                    } else {
                        symbols::Marker::Dot
                    })
                    .graph_type(if line {
                        GraphType::Line
                    } else {
                        GraphType::Scatter
                    })
                    .style(Style::default().fg(self.palette_color(i)))
                    .data(points)
            })
            .collect();

        let style = self.axis_style();
        let (y_bounds, y_labels) = if y_categories.is_empty() {
            let (lo, hi) = padded(bounds(all().map(|(_, y)| *y)).unwrap_or((0.0, 1.0)));
            ([lo, hi], axis_labels(lo, hi, style))
        } else if y_categories.len() == 1 {
            (
                [-0.5, 0.5],
                vec![
                    Span::raw(""),
                    Span::styled(y_categories[0].clone(), style),
                    Span::raw(""),
                ],
            )
        } else {
            (
                [0.0, (y_categories.len() - 1) as f64],
                y_categories
                    .iter()
                    .map(|c| Span::styled(c.clone(), style))
                    .collect(),
            )
        };

        let legend = (series.len() > 1).then_some(LegendPosition::TopLeft);
        Chart::new(datasets)
            .x_axis(
                Axis::default()
                    .title(self.axis_title(&self.spec.encoding.x))
                    .bounds([x_lo, x_hi])
                    .style(style)
                    .labels(axis_labels(x_lo, x_hi, style)),
            )
            .y_axis(
                Axis::default()
                    .title(self.axis_title(&self.spec.encoding.y))
                    .bounds(y_bounds)
                    .style(style)
                    .labels(y_labels),
            )
            .legend_position(legend)
            .render(area, buf);
    }

    fn render_bins(&self, bins: &[Bin], area: Rect, buf: &mut Buffer) {
        let points: Vec<(f64, f64)> = bins
            .iter()
            .map(|b| ((b.start + b.end) / 2.0, b.count as f64))
            .collect();
        let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
            return;
        };
        let (x_lo, x_hi) = padded((first.start, last.end));
        let y_hi = bins.iter().map(|b| b.count).max().unwrap_or(1).max(1) as f64;
        let style = self.axis_style();

        let dataset = Dataset::default()
            .name("")
            .marker(symbols::Marker::HalfBlock)
            .graph_type(GraphType::Bar)
            .style(Style::default().fg(self.palette_color(0)))
            .data(&points);

        Chart::new(vec![dataset])
            .x_axis(
                Axis::default()
                    .title(self.axis_title(&self.spec.encoding.x))
                    .bounds([x_lo, x_hi])
                    .style(style)
                    .labels(axis_labels(x_lo, x_hi, style)),
            )
            .y_axis(
                Axis::default()
                    .title("count")
                    .bounds([0.0, y_hi])
                    .style(style)
                    .labels(axis_labels(0.0, y_hi, style)),
            )
            .render(area, buf);
    }

    fn render_boxes(&self, boxes: &[BoxSummary], show_points: bool, area: Rect, buf: &mut Buffer) {
        let Some(y_range) = bounds(boxes.iter().flat_map(|b| [b.min, b.max])) else {
            return;
        };
        let (y_lo, y_hi) = padded(y_range);

        let box_half = 0.3;
        let cap_half = 0.15;
        let mut segments: Vec<(Vec<(f64, f64)>, Color)> = Vec::new();
        let mut dots: Vec<(Vec<(f64, f64)>, Color)> = Vec::new();
        for (i, b) in boxes.iter().enumerate() {
            let x = i as f64;
            let color = self.palette_color(i);
            segments.push((
                vec![
                    (x - box_half, b.q1),
                    (x + box_half, b.q1),
                    (x + box_half, b.q3),
                    (x - box_half, b.q3),
                    (x - box_half, b.q1),
                ],
                color,
            ));
            segments.push((vec![(x - box_half, b.median), (x + box_half, b.median)], color));
            segments.push((vec![(x, b.lower_whisker), (x, b.q1)], color));
            segments.push((vec![(x, b.q3), (x, b.upper_whisker)], color));
            segments.push((
                vec![(x - cap_half, b.lower_whisker), (x + cap_half, b.lower_whisker)],
                color,
            ));
            segments.push((
                vec![(x - cap_half, b.upper_whisker), (x + cap_half, b.upper_whisker)],
                color,
            ));
            let shown: Vec<(f64, f64)> = b
                .points
                .iter()
                .filter(|v| show_points || **v < b.lower_whisker || **v > b.upper_whisker)
                .map(|v| (x + box_half + 0.1, *v))
                .collect();
            dots.push((shown, color));
        }

        let mut datasets: Vec<Dataset> = segments
            .iter()
            .map(|(points, color)| {
                Dataset::default()
                    .graph_type(GraphType::Line)
                    .marker(symbols::Marker::Braille)
                    .style(Style::default().fg(*color))
                    .data(points)
            })
            .collect();
        datasets.extend(dots.iter().map(|(points, color)| {
            Dataset::default()
                .graph_type(GraphType::Scatter)
                .marker(symbols::Marker::Dot)
                .style(Style::default().fg(*color))
                .data(points)
        }));

        let style = self.axis_style();
        let x_labels: Vec<Span> = boxes
            .iter()
            .map(|b| Span::styled(b.label.clone(), style))
            .collect();
        let x_hi = (boxes.len() as f64 - 1.0).max(0.0) + 0.5;
        Chart::new(datasets)
            .x_axis(
                Axis::default()
                    .bounds([-0.5, x_hi])
                    .style(style)
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .title(self.axis_title(&self.spec.encoding.y))
                    .bounds([y_lo, y_hi])
                    .style(style)
                    .labels(axis_labels(y_lo, y_hi, style)),
            )
            .render(area, buf);
    }

    fn render_grid(&self, grid: &HeatGrid, area: Rect, buf: &mut Buffer) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(HEATMAP_LABEL_WIDTH), Constraint::Min(1)])
            .split(layout[0]);
        let (label_area, plot) = (body[0], body[1]);
        if plot.width == 0 || plot.height == 0 || grid.x_labels.is_empty() || grid.y_labels.is_empty() {
            return;
        }

        let range = bounds(grid.cells.iter().flatten().flatten().copied()).unwrap_or((0.0, 1.0));
        let range = (0.0_f64.min(range.0), range.1);
        let label_style = self.axis_style();
        let rows = grid.y_labels.len() as u16;
        let cols = grid.x_labels.len() as u16;

        for row in 0..plot.height {
            let yi = ((row as u32 * rows as u32) / plot.height as u32) as usize;
            for col in 0..plot.width {
                let xi = ((col as u32 * cols as u32) / plot.width as u32) as usize;
                let cell = grid
                    .cells
                    .get(yi)
                    .and_then(|r| r.get(xi))
                    .copied()
                    .flatten();
                let target = &mut buf[(plot.x + col, plot.y + row)];
                match cell {
                    Some(v) => {
                        target.set_symbol("█");
                        target.set_style(Style::default().fg(self.scale_color(unit(v, range))));
                    }
                    None => {
                        target.set_symbol("·");
                        target.set_style(Style::default().fg(self.theme.get("dimmed")));
                    }
                }
            }
        }

        for (yi, label) in grid.y_labels.iter().enumerate() {
            let row = (yi as u32 * plot.height as u32 / rows as u32) as u16;
            buf.set_string(
                label_area.x,
                label_area.y + row,
                truncate(label, HEATMAP_LABEL_WIDTH as usize - 1),
                label_style,
            );
        }

        let x_axis = layout[1];
        let mut next_free = x_axis.x + HEATMAP_LABEL_WIDTH;
        for (xi, label) in grid.x_labels.iter().enumerate() {
            let x = plot.x + (xi as u32 * plot.width as u32 / cols as u32) as u16;
            if x >= next_free && x + label.len() as u16 <= x_axis.x + x_axis.width {
                buf.set_string(x, x_axis.y, label, label_style);
                next_free = x + label.len() as u16 + 1;
            }
        }
    }

    fn render_slices(&self, slices: &[Slice], hole: f64, area: Rect, buf: &mut Buffer) {
        let total: f64 = slices.iter().map(|s| s.value.max(0.0)).sum();
        let label_width = slices
            .iter()
            .map(|s| s.label.chars().count())
            .max()
            .unwrap_or(0)
            .min(24);
        let bar_room = area.width.saturating_sub(label_width as u16 + 18) as f64;

        let mut lines: Vec<Line> = slices
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let share = if total > 0.0 { s.value.max(0.0) / total } else { 0.0 };
                let bar = "█".repeat((share * bar_room).round() as usize);
                Line::from(vec![
                    Span::styled(
                        format!("{:<width$} ", truncate(&s.label, label_width), width = label_width),
                        self.axis_style(),
                    ),
                    Span::styled(bar, Style::default().fg(self.palette_color(i))),
                    Span::styled(
                        format!(" {} ({:.1}%)", format_number(s.value), share * 100.0),
                        self.axis_style(),
                    ),
                ])
            })
            .collect();
        if hole > 0.0 {
            lines.push(Line::from(Span::styled(
                format!("total {}", format_number(total)),
                Style::default()
                    .fg(self.theme.get("text_secondary"))
                    .add_modifier(Modifier::ITALIC),
            )));
        }
        Paragraph::new(lines).render(area, buf);
    }
}

impl Widget for ChartView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.spec.is_empty() {
            Paragraph::new("No data")
                .style(Style::default().fg(self.theme.get("text_secondary")))
                .centered()
                .render(area, buf);
            return;
        }

        let mut area = area;
        if let Some(title) = &self.spec.title {
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(1)])
                .split(area);
            Paragraph::new(title.as_str())
                .style(
                    Style::default()
                        .fg(self.theme.get("text_primary"))
                        .add_modifier(Modifier::BOLD),
                )
                .centered()
                .render(layout[0], buf);
            area = layout[1];
        }

        match &self.spec.data {
            ChartData::Bars { bars } => self.render_bars(bars, area, buf),
            ChartData::Groups { series, groups } => self.render_groups(series, groups, area, buf),
            ChartData::Points {
                series,
                y_categories,
            } => self.render_points(series, y_categories, area, buf),
            ChartData::Bins { bins } => self.render_bins(bins, area, buf),
            ChartData::Boxes { boxes, show_points } => {
                self.render_boxes(boxes, *show_points, area, buf)
            }
            ChartData::Grid { grid } => self.render_grid(grid, area, buf),
            ChartData::Slices { slices, hole } => self.render_slices(slices, *hole, area, buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{bar_chart, pie_chart};
    use polars::prelude::*;

    fn buffer_text(buf: &Buffer) -> String {
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn truncates_with_ellipsis() {
        assert_eq!(truncate("Sandeep Lamichhane", 7), "Sandee…");
        assert_eq!(truncate("Kushal", 10), "Kushal");
    }

    #[test]
    fn bar_values_keep_two_decimals() {
        assert_eq!(bar_value(6.25), 625);
        assert_eq!(bar_value(-3.0), 0);
    }

    #[test]
    fn renders_pie_as_share_list() {
        let df = df!("batsman" => &["A", "B"], "batsman_runs" => &[30.0, 10.0]).unwrap();
        let spec = pie_chart(&df, "batsman", "batsman_runs", 0.4).unwrap();
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 4);
        let mut buf = Buffer::empty(area);
        ChartView::new(&spec, &theme).render(area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains("(75.0%)"));
        assert!(text.contains("total 40"));
    }

    #[test]
    fn empty_chart_says_no_data() {
        let df = df!("player" => Vec::<String>::new(), "runs" => Vec::<f64>::new()).unwrap();
        let spec = bar_chart(&df, "player", "runs", None).unwrap();
        let theme = Theme::default();
        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        ChartView::new(&spec, &theme).render(area, &mut buf);
        assert!(buffer_text(&buf).contains("No data"));
    }
}
