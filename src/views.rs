//! One view function per tab: base table + filter state in, render description out.

use log::debug;
use npl_dash_cli::TabArg;
use polars::prelude::*;
use serde::Serialize;

use crate::aggregate::{
    Comparison, Order, PlayerFilter, cumulative_sum, filter_player, flagged, group_count,
    group_sum, present, rank, threshold, top_n, with_is_boundary, with_over,
    with_total_boundaries,
};
use crate::chart::{
    ChartSpec, ColorScale, SET2_PALETTE, bar_chart, box_chart, grouped_bar_chart, heatmap,
    histogram, line_chart, pie_chart, scatter_chart,
};
use crate::coerce::has_column;
use crate::dataset::{Dataset, Datasets};
use crate::error::ViewError;
use crate::preview::TablePreview;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Batting,
    Bowling,
    Fielding,
    Partnerships,
    FinalMatch,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Batting,
        Tab::Bowling,
        Tab::Fielding,
        Tab::Partnerships,
        Tab::FinalMatch,
    ];

    /// Tab bar label.
    pub fn label(self) -> &'static str {
        match self {
            Tab::Batting => "Batting",
            Tab::Bowling => "Bowling",
            Tab::Fielding => "Fielding",
            Tab::Partnerships => "Partnerships",
            Tab::FinalMatch => "Final Match",
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            Tab::Batting => "Batting Analysis",
            Tab::Bowling => "Bowling Analysis",
            Tab::Fielding => "Fielding Analysis",
            Tab::Partnerships => "Partnership Analysis",
            Tab::FinalMatch => "Final Match Analysis",
        }
    }

    pub fn dataset(self) -> Dataset {
        match self {
            Tab::Batting => Dataset::Batting,
            Tab::Bowling => Dataset::Bowling,
            Tab::Fielding => Dataset::Fielding,
            Tab::Partnerships => Dataset::Partnerships,
            Tab::FinalMatch => Dataset::FinalMatch,
        }
    }

    pub fn index(self) -> usize {
        Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<Tab> {
        Tab::ALL.get(index).copied()
    }

    pub fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

impl From<TabArg> for Tab {
    fn from(arg: TabArg) -> Self {
        match arg {
            TabArg::Batting => Tab::Batting,
            TabArg::Bowling => Tab::Bowling,
            TabArg::Fielding => Tab::Fielding,
            TabArg::Partnerships => Tab::Partnerships,
            TabArg::Final => Tab::FinalMatch,
        }
    }
}

/// Sizes used when building views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub top_n: usize,
    pub preview_rows: usize,
    pub final_preview_rows: usize,
    pub top_batsmen: usize,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            top_n: 10,
            preview_rows: 10,
            final_preview_rows: 100,
            top_batsmen: 6,
        }
    }
}

/// Per-session UI state. Only `player` crosses tabs, and only batting reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub player: PlayerFilter,
    pub tab: Tab,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum SectionBody {
    Chart(ChartSpec),
    NoData(String),
    Table(TablePreview),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub heading: String,
    pub body: SectionBody,
}

impl Section {
    /// A chart, or a "no data" notice when the chart has nothing to draw.
    fn chart(heading: impl Into<String>, spec: ChartSpec) -> Self {
        let heading = heading.into();
        let body = if spec.is_empty() {
            let subject = spec.title.clone().unwrap_or_else(|| heading.clone());
            SectionBody::NoData(format!("No data available for {} plot.", subject))
        } else {
            SectionBody::Chart(spec)
        };
        Self { heading, body }
    }

    fn table(heading: impl Into<String>, preview: TablePreview) -> Self {
        let body = if preview.is_empty() {
            SectionBody::NoData("No rows to display.".to_string())
        } else {
            SectionBody::Table(preview)
        };
        Self {
            heading: heading.into(),
            body,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self.body, SectionBody::NoData(_))
    }
}

/// Render description for one tab: rows of one or two sections each.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabView {
    pub tab: Tab,
    pub header: String,
    pub rows: Vec<Vec<Section>>,
}

impl TabView {
    fn new(tab: Tab) -> Self {
        Self {
            tab,
            header: tab.header().to_string(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, section: Section) {
        self.rows.push(vec![section]);
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.rows.iter().flatten()
    }

    pub fn section(&self, heading: &str) -> Option<&Section> {
        self.sections().find(|s| s.heading == heading)
    }
}

fn skipped(tab: Tab, heading: &str, columns: &[&str]) {
    debug!(
        "{} view: skipping \"{}\", needs column(s) {}",
        tab.label(),
        heading,
        columns.join(", ")
    );
}

pub fn batting_view(
    batting: &DataFrame,
    player: &PlayerFilter,
    opts: &ViewOptions,
) -> PolarsResult<TabView> {
    let n = opts.top_n;
    let df = with_total_boundaries(&filter_player(batting, player)?)?;
    let mut view = TabView::new(Tab::Batting);

    let top_runs = top_n(&df, "runs", n)?;
    let top_title = format!("Top {} Run Scorers", n);
    let top_chart = bar_chart(&top_runs, "player", "runs", Some("runs"))?
        .scale(ColorScale::Blues)
        .title(top_title.clone());

    let with_average = present(&df, "batting_average")?;
    let scatter = scatter_chart(
        &with_average,
        "strike_rate",
        "runs",
        Some("batting_average"),
        &["player"],
        None,
    )?
    .palette(SET2_PALETTE)
    .title("Runs vs Strike Rate");

    view.rows.push(vec![
        Section::chart(top_title.clone(), top_chart),
        Section::chart("Runs vs Strike Rate (All Players)", scatter),
    ]);

    view.push(Section::chart(
        "Distribution of Batting Averages",
        histogram(&df, "batting_average", 15)?.palette(&["#ff6f61"]),
    ));

    let top_boundaries = top_n(&df, "total_boundaries", n)?;
    view.push(Section::chart(
        "Most Boundaries (Fours + Sixes)",
        bar_chart(
            &top_boundaries,
            "player",
            "total_boundaries",
            Some("total_boundaries"),
        )?
        .scale(ColorScale::Oranges),
    ));

    view.push(Section::table(
        format!("{} (table)", top_title),
        TablePreview::from_frame(&top_runs, opts.preview_rows)?,
    ));
    Ok(view)
}

pub fn bowling_view(bowling: &DataFrame, opts: &ViewOptions) -> PolarsResult<TabView> {
    let n = opts.top_n;
    let mut view = TabView::new(Tab::Bowling);

    let top_wickets = top_n(bowling, "wicket", n)?;
    let top_title = format!("Top {} Wicket Takers", n);
    view.push(Section::chart(
        top_title.clone(),
        bar_chart(&top_wickets, "player", "wicket", Some("wicket"))?.scale(ColorScale::Viridis),
    ));

    let regulars = threshold(bowling, "overs", Comparison::AtLeast, 20.0)?;
    let economical = rank(&regulars, "economy_rate", Order::Ascending, n)?;
    view.push(Section::chart(
        "Best Economy Rates (Min 20 Overs)",
        bar_chart(&economical, "player", "economy_rate", Some("economy_rate"))?
            .scale(ColorScale::Blues)
            .horizontal(),
    ));

    let wicket_takers = threshold(bowling, "wicket", Comparison::AtLeast, 5.0)?;
    view.push(Section::chart(
        "Bowling Average Distribution",
        box_chart(&wicket_takers, "bowling_average", None, true)?.palette(&["#e67e22"]),
    ));

    view.push(Section::table(
        format!("{} (table)", top_title),
        TablePreview::from_frame(&top_wickets, opts.preview_rows)?,
    ));
    Ok(view)
}

pub fn fielding_view(fielding: &DataFrame, opts: &ViewOptions) -> PolarsResult<TabView> {
    let n = opts.top_n;
    let mut view = TabView::new(Tab::Fielding);

    let top_catchers = top_n(fielding, "catches", n)?;
    let top_title = format!("Top {} Fielders by Catches", n);
    view.push(Section::chart(
        top_title.clone(),
        bar_chart(&top_catchers, "player", "catches", Some("catches"))?.scale(ColorScale::Teal),
    ));

    view.push(Section::chart(
        "Distribution of Catches Among Players",
        histogram(fielding, "catches", 10)?.palette(&["#00b894"]),
    ));

    view.push(Section::table(
        format!("{} (table)", top_title),
        TablePreview::from_frame(&top_catchers, opts.preview_rows)?,
    ));
    Ok(view)
}

pub fn partnerships_view(partnerships: &DataFrame, opts: &ViewOptions) -> PolarsResult<TabView> {
    let n = opts.top_n;
    let mut view = TabView::new(Tab::Partnerships);

    let top_partnerships = top_n(partnerships, "runs", n)?;
    let top_title = format!("Top {} Highest Partnerships by Runs", n);
    view.push(Section::chart(
        top_title.clone(),
        bar_chart(&top_partnerships, "partners", "runs", Some("wickets"))?
            .scale(ColorScale::Plasma),
    ));

    view.push(Section::chart(
        "Distribution of Partnership Runs",
        histogram(partnerships, "runs", 20)?.palette(&["#6c5ce7"]),
    ));

    let by_team = "Partnership Runs by Team";
    if has_column(partnerships, "team") {
        view.push(Section::chart(
            by_team,
            box_chart(partnerships, "runs", Some("team"), false)?.title(by_team),
        ));
    } else {
        skipped(Tab::Partnerships, by_team, &["team"]);
    }

    view.push(Section::table(
        format!("{} (table)", top_title),
        TablePreview::from_frame(&top_partnerships, opts.preview_rows)?,
    ));
    Ok(view)
}

pub fn final_match_view(final_match: &DataFrame, opts: &ViewOptions) -> PolarsResult<TabView> {
    let mut view = TabView::new(Tab::FinalMatch);

    let mut df = cumulative_sum(final_match, "total_runs", "inning", "cumulative_runs")?;
    view.push(Section::chart(
        "Run Progression by Innings (Worm Plot)",
        line_chart(&df, "ball_over", "cumulative_runs", "inning")?
            .with_markers()
            .title("Run Progression by Innings"),
    ));

    df = with_over(&df)?;
    let runs_per_over = group_sum(&df, &["inning", "over"], "total_runs", "total_runs")?;
    view.push(Section::chart(
        "Runs Scored Per Over",
        grouped_bar_chart(&runs_per_over, "over", "total_runs", "inning")?.title("Runs Per Over"),
    ));

    let heatmap_heading = "Boundary Frequency Heatmap";
    if has_column(&df, "batsman_runs") {
        df = with_is_boundary(&df)?;
        let boundaries = group_count(
            &flagged(&df, "is_boundary")?,
            &["inning", "over"],
            "boundary_count",
        )?;
        view.push(Section::chart(
            heatmap_heading,
            heatmap(&boundaries, "over", "inning", "boundary_count")?.scale(ColorScale::Inferno),
        ));
    } else {
        skipped(Tab::FinalMatch, heatmap_heading, &["batsman_runs"]);
    }

    let pie_heading = "Top Batsmen - Run Contribution (Pie)";
    if has_column(&df, "batsman") && has_column(&df, "batsman_runs") {
        let per_batsman = group_sum(&df, &["batsman"], "batsman_runs", "batsman_runs")?;
        let leaders = top_n(&per_batsman, "batsman_runs", opts.top_batsmen)?;
        view.push(Section::chart(
            pie_heading,
            pie_chart(&leaders, "batsman", "batsman_runs", 0.4)?
                .title("Top Batsmen Run Contribution"),
        ));
    } else {
        skipped(Tab::FinalMatch, pie_heading, &["batsman", "batsman_runs"]);
    }

    let timeline_heading = "Wicket Fall Timeline";
    if has_column(&df, "player_dismissed") {
        let wickets = present(&df, "player_dismissed")?;
        if wickets.height() > 0 {
            let hover: Vec<&str> = ["player_dismissed", "bowler", "fielder"]
                .into_iter()
                .filter(|c| has_column(&wickets, c))
                .collect();
            let kind = has_column(&wickets, "dismissal_kind").then_some("dismissal_kind");
            view.push(Section::chart(
                timeline_heading,
                scatter_chart(&wickets, "ball_over", "inning", None, &hover, kind)?
                    .title(timeline_heading),
            ));
        } else {
            debug!("Final Match view: no dismissals, omitting \"{}\"", timeline_heading);
        }
    } else {
        skipped(Tab::FinalMatch, timeline_heading, &["player_dismissed"]);
    }

    view.push(Section::table(
        "Ball-by-Ball Log",
        TablePreview::from_frame(&df, opts.final_preview_rows)?,
    ));
    Ok(view)
}

/// Load the tab's dataset (through the cache) and build its view.
pub fn build_view(
    datasets: &mut Datasets,
    state: &ViewState,
    opts: &ViewOptions,
) -> Result<TabView, ViewError> {
    let df = datasets.get(state.tab.dataset())?;
    let view = match state.tab {
        Tab::Batting => batting_view(&df, &state.player, opts)?,
        Tab::Bowling => bowling_view(&df, opts)?,
        Tab::Fielding => fielding_view(&df, opts)?,
        Tab::Partnerships => partnerships_view(&df, opts)?,
        Tab::FinalMatch => final_match_view(&df, opts)?,
    };
    debug!(
        "recomputed {} view (player={}): {} sections",
        state.tab.label(),
        state.player,
        view.sections().count()
    );
    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartData;

    #[test]
    fn tab_cycling_wraps() {
        assert_eq!(Tab::Batting.prev(), Tab::FinalMatch);
        assert_eq!(Tab::FinalMatch.next(), Tab::Batting);
        assert_eq!(Tab::from_index(2), Some(Tab::Fielding));
        assert_eq!(Tab::from_index(5), None);
        assert_eq!(Tab::from(TabArg::Final), Tab::FinalMatch);
    }

    #[test]
    fn all_missing_catches_is_no_data() {
        let df = df!(
            "player" => &["A", "B"],
            "catches" => &[None::<f64>, None]
        )
        .unwrap();
        let view = fielding_view(&df, &ViewOptions::default()).unwrap();
        let top = view.section("Top 10 Fielders by Catches").unwrap();
        assert!(top.is_no_data());
        assert!(view.sections().last().unwrap().is_no_data());
    }

    #[test]
    fn economy_ranked_ascending_above_threshold() {
        let df = df!(
            "player" => &["A", "B", "C"],
            "wicket" => &[Some(10.0), Some(3.0), Some(6.0)],
            "economy_rate" => &[Some(7.0), Some(5.0), Some(6.0)],
            "bowling_average" => &[Some(20.0), Some(30.0), Some(15.0)],
            "overs" => &[Some(30.0), Some(10.0), Some(20.0)]
        )
        .unwrap();
        let view = bowling_view(&df, &ViewOptions::default()).unwrap();
        let SectionBody::Chart(spec) = &view
            .section("Best Economy Rates (Min 20 Overs)")
            .unwrap()
            .body
        else {
            panic!("expected chart");
        };
        let ChartData::Bars { bars } = &spec.data else {
            panic!("expected bars");
        };
        let labels: Vec<&str> = bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["C", "A"]);
        assert_eq!(spec.encoding.y.as_deref(), Some("player"));
    }

    #[test]
    fn partnerships_without_team_skip_box() {
        let df = df!(
            "partners" => &["A & B", "C & D"],
            "runs" => &[120.0, 80.0],
            "wickets" => &[1.0, 3.0]
        )
        .unwrap();
        let view = partnerships_view(&df, &ViewOptions::default()).unwrap();
        assert!(view.section("Partnership Runs by Team").is_none());
        assert_eq!(view.sections().count(), 3);
    }

    #[test]
    fn final_match_optional_sections() {
        let minimal = df!(
            "inning" => &["1", "1", "2"],
            "ball_over" => &[0.1, 0.2, 0.1],
            "total_runs" => &[4.0, 1.0, 6.0]
        )
        .unwrap();
        let view = final_match_view(&minimal, &ViewOptions::default()).unwrap();
        let headings: Vec<&str> = view.sections().map(|s| s.heading.as_str()).collect();
        assert_eq!(
            headings,
            vec![
                "Run Progression by Innings (Worm Plot)",
                "Runs Scored Per Over",
                "Ball-by-Ball Log"
            ]
        );
    }

    #[test]
    fn batting_player_filter_applies() {
        let df = df!(
            "player" => &["A", "B"],
            "runs" => &[10.0, 20.0],
            "batting_average" => &[None::<f64>, None],
            "strike_rate" => &[100.0, 120.0],
            "boundary_fours" => &[1.0, 2.0],
            "boundary_sixes" => &[0.0, 1.0]
        )
        .unwrap();
        let view = batting_view(
            &df,
            &PlayerFilter::Player("A".into()),
            &ViewOptions::default(),
        )
        .unwrap();
        assert_eq!(view.rows[0].len(), 2);
        let SectionBody::NoData(msg) = &view.rows[0][1].body else {
            panic!("expected no data");
        };
        assert_eq!(msg, "No data available for Runs vs Strike Rate plot.");
        let SectionBody::Table(table) = &view.rows.last().unwrap()[0].body else {
            panic!("expected table");
        };
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][0], "A");
    }
}
