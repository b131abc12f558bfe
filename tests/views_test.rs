use npl_dash::chart::{ChartData, ChartSpec, ColorScale, Orientation};
use npl_dash::views::{Section, SectionBody};
use npl_dash::{
    build_view, Dataset, Datasets, PlayerFilter, Tab, TabView, ViewError, ViewOptions, ViewState,
};
use tempfile::TempDir;

mod common;

fn view_for(dir: &TempDir, tab: Tab, player: PlayerFilter) -> TabView {
    let mut datasets = Datasets::new(common::dataset_paths(dir));
    let state = ViewState { player, tab };
    build_view(&mut datasets, &state, &ViewOptions::default()).unwrap()
}

fn chart<'a>(view: &'a TabView, heading: &str) -> &'a ChartSpec {
    match view.section(heading).map(|s| &s.body) {
        Some(SectionBody::Chart(spec)) => spec,
        other => panic!("expected chart for {:?}, got {:?}", heading, other),
    }
}

fn bar_labels(spec: &ChartSpec) -> Vec<&str> {
    match &spec.data {
        ChartData::Bars { bars } => bars.iter().map(|b| b.label.as_str()).collect(),
        other => panic!("expected bars, got {:?}", other),
    }
}

fn headings(view: &TabView) -> Vec<&str> {
    view.sections().map(|s| s.heading.as_str()).collect()
}

#[test]
fn test_batting_all_players() {
    let dir = common::create_data_dir();
    let view = view_for(&dir, Tab::Batting, PlayerFilter::All);

    assert_eq!(view.header, "Batting Analysis");
    assert_eq!(
        headings(&view),
        vec![
            "Top 10 Run Scorers",
            "Runs vs Strike Rate (All Players)",
            "Distribution of Batting Averages",
            "Most Boundaries (Fours + Sixes)",
            "Top 10 Run Scorers (table)",
        ]
    );
    assert_eq!(view.rows[0].len(), 2);

    let top = chart(&view, "Top 10 Run Scorers");
    assert_eq!(
        bar_labels(top),
        vec![
            "Kushal Bhurtel",
            "Aasif Sheikh",
            "Dipendra Singh Airee",
            "Rohit Paudel",
            "Sompal Kami"
        ]
    );
    assert_eq!(top.color_scale, Some(ColorScale::Blues));

    let boundaries = chart(&view, "Most Boundaries (Fours + Sixes)");
    match &boundaries.data {
        ChartData::Bars { bars } => {
            let values: Vec<f64> = bars.iter().map(|b| b.value).collect();
            assert_eq!(values, vec![44.0, 37.0, 33.0, 26.0, 5.0]);
        }
        other => panic!("expected bars, got {:?}", other),
    }

    match &chart(&view, "Runs vs Strike Rate (All Players)").data {
        ChartData::Points { series, .. } => {
            let points: usize = series.iter().map(|s| s.points.len()).sum();
            assert_eq!(points, 4);
        }
        other => panic!("expected points, got {:?}", other),
    }

    match &chart(&view, "Distribution of Batting Averages").data {
        ChartData::Bins { bins } => {
            assert_eq!(bins.len(), 15);
            assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 4);
        }
        other => panic!("expected bins, got {:?}", other),
    }
}

#[test]
fn test_batting_single_player() {
    let dir = common::create_data_dir();
    let view = view_for(
        &dir,
        Tab::Batting,
        PlayerFilter::Player("Kushal Bhurtel".to_string()),
    );

    assert_eq!(
        bar_labels(chart(&view, "Top 10 Run Scorers")),
        vec!["Kushal Bhurtel"]
    );
    match &view.section("Top 10 Run Scorers (table)").unwrap().body {
        SectionBody::Table(table) => {
            assert_eq!(table.total_rows, 1);
            assert_eq!(table.rows[0][0], "Kushal Bhurtel");
            assert_eq!(table.rows[0][1], "312");
        }
        other => panic!("expected table, got {:?}", other),
    }
}

#[test]
fn test_batting_unknown_player_has_no_data() {
    let dir = common::create_data_dir();
    let view = view_for(&dir, Tab::Batting, PlayerFilter::Player("Nobody".to_string()));

    assert!(view.sections().all(Section::is_no_data));
    match &view.section("Top 10 Run Scorers").unwrap().body {
        SectionBody::NoData(msg) => {
            assert_eq!(msg, "No data available for Top 10 Run Scorers plot.")
        }
        other => panic!("expected no data, got {:?}", other),
    }
    match &view.section("Top 10 Run Scorers (table)").unwrap().body {
        SectionBody::NoData(msg) => assert_eq!(msg, "No rows to display."),
        other => panic!("expected no data, got {:?}", other),
    }
}

#[test]
fn test_bowling_view() {
    let dir = common::create_data_dir();
    let view = view_for(&dir, Tab::Bowling, PlayerFilter::All);

    assert_eq!(
        bar_labels(chart(&view, "Top 10 Wicket Takers")),
        vec![
            "Sandeep Lamichhane",
            "Karan KC",
            "Abinash Bohara",
            "Lalit Rajbanshi",
            "Sompal Kami"
        ]
    );

    let economy = chart(&view, "Best Economy Rates (Min 20 Overs)");
    assert_eq!(economy.orientation, Orientation::Horizontal);
    assert_eq!(
        bar_labels(economy),
        vec!["Sandeep Lamichhane", "Abinash Bohara", "Karan KC"]
    );

    match &chart(&view, "Bowling Average Distribution").data {
        ChartData::Boxes { boxes, show_points } => {
            assert!(*show_points);
            assert_eq!(boxes.len(), 1);
            assert_eq!(boxes[0].count, 4);
            assert_eq!(boxes[0].min, 12.5);
            assert_eq!(boxes[0].max, 25.3);
        }
        other => panic!("expected boxes, got {:?}", other),
    }
}

#[test]
fn test_bowling_player_filter_is_ignored() {
    let dir = common::create_data_dir();
    let all = view_for(&dir, Tab::Bowling, PlayerFilter::All);
    let filtered = view_for(
        &dir,
        Tab::Bowling,
        PlayerFilter::Player("Kushal Bhurtel".to_string()),
    );
    assert_eq!(all, filtered);
}

#[test]
fn test_fielding_view() {
    let dir = common::create_data_dir();
    let view = view_for(&dir, Tab::Fielding, PlayerFilter::All);

    // ties keep file order; the unparseable row is dropped from the ranking
    assert_eq!(
        bar_labels(chart(&view, "Top 10 Fielders by Catches")),
        vec![
            "Aasif Sheikh",
            "Kushal Malla",
            "Rohit Paudel",
            "Dipendra Singh Airee"
        ]
    );
    match &chart(&view, "Distribution of Catches Among Players").data {
        ChartData::Bins { bins } => {
            assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 4);
        }
        other => panic!("expected bins, got {:?}", other),
    }
}

#[test]
fn test_partnerships_view() {
    let dir = common::create_data_dir();
    let view = view_for(&dir, Tab::Partnerships, PlayerFilter::All);

    let top = chart(&view, "Top 10 Highest Partnerships by Runs");
    assert_eq!(top.encoding.color.as_deref(), Some("wickets"));
    assert_eq!(bar_labels(top)[0], "Kushal Bhurtel & Aasif Sheikh");

    match &chart(&view, "Partnership Runs by Team").data {
        ChartData::Boxes { boxes, show_points } => {
            assert!(!*show_points);
            let teams: Vec<&str> = boxes.iter().map(|b| b.label.as_str()).collect();
            assert_eq!(
                teams,
                vec!["Janakpur Bolts", "Biratnagar Kings", "Lumbini Lions"]
            );
            assert_eq!(boxes[0].count, 2);
        }
        other => panic!("expected boxes, got {:?}", other),
    }
}

#[test]
fn test_final_match_view() {
    let dir = common::create_data_dir();
    let view = view_for(&dir, Tab::FinalMatch, PlayerFilter::All);

    assert_eq!(
        headings(&view),
        vec![
            "Run Progression by Innings (Worm Plot)",
            "Runs Scored Per Over",
            "Boundary Frequency Heatmap",
            "Top Batsmen - Run Contribution (Pie)",
            "Wicket Fall Timeline",
            "Ball-by-Ball Log",
        ]
    );

    let worm = chart(&view, "Run Progression by Innings (Worm Plot)");
    assert!(worm.markers);
    match &worm.data {
        ChartData::Points { series, .. } => {
            let totals: Vec<(&str, Vec<f64>)> = series
                .iter()
                .map(|s| (s.name.as_str(), s.points.iter().map(|p| p.y).collect()))
                .collect();
            assert_eq!(
                totals,
                vec![
                    ("1", vec![4.0, 5.0, 11.0, 11.0]),
                    ("2", vec![1.0, 5.0, 5.0])
                ]
            );
        }
        other => panic!("expected points, got {:?}", other),
    }

    match &chart(&view, "Runs Scored Per Over").data {
        ChartData::Groups { series, groups } => {
            assert_eq!(series, &vec!["1".to_string(), "2".to_string()]);
            assert_eq!(groups[0].label, "0");
            assert_eq!(groups[0].values, vec![Some(5.0), Some(5.0)]);
            assert_eq!(groups[1].values, vec![Some(6.0), Some(0.0)]);
        }
        other => panic!("expected groups, got {:?}", other),
    }

    match &chart(&view, "Boundary Frequency Heatmap").data {
        ChartData::Grid { grid } => {
            assert_eq!(grid.x_labels, vec!["0", "1"]);
            assert_eq!(grid.y_labels, vec!["1", "2"]);
            assert_eq!(
                grid.cells,
                vec![vec![Some(1.0), Some(1.0)], vec![Some(1.0), None]]
            );
        }
        other => panic!("expected grid, got {:?}", other),
    }

    match &chart(&view, "Top Batsmen - Run Contribution (Pie)").data {
        ChartData::Slices { slices, hole } => {
            assert_eq!(*hole, 0.4);
            let labels: Vec<&str> = slices.iter().map(|s| s.label.as_str()).collect();
            assert_eq!(
                labels,
                vec!["Aasif Sheikh", "Kushal Bhurtel", "Rohit Paudel", "Gulsan Jha"]
            );
        }
        other => panic!("expected slices, got {:?}", other),
    }

    match &chart(&view, "Wicket Fall Timeline").data {
        ChartData::Points {
            series,
            y_categories,
        } => {
            assert_eq!(y_categories, &vec!["1".to_string(), "2".to_string()]);
            let kinds: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
            assert_eq!(kinds, vec!["caught", "bowled"]);
            assert_eq!(
                series[0].points[0].label.as_deref(),
                Some("Aasif Sheikh / Sompal Kami / Kushal Malla")
            );
        }
        other => panic!("expected points, got {:?}", other),
    }

    match &view.section("Ball-by-Ball Log").unwrap().body {
        SectionBody::Table(table) => {
            assert_eq!(table.total_rows, 7);
            assert!(table.headers.iter().any(|h| h == "cumulative_runs"));
            assert!(table.headers.iter().any(|h| h == "over"));
        }
        other => panic!("expected table, got {:?}", other),
    }
}

#[test]
fn test_final_match_without_dismissals_omits_timeline() {
    let dir = TempDir::new().unwrap();
    common::write_dataset(
        dir.path(),
        Dataset::FinalMatch,
        "inning,ball_over,total_runs,player_dismissed\n1,0.1,4,\n1,0.2,2,\n",
    );
    let view = view_for(&dir, Tab::FinalMatch, PlayerFilter::All);
    assert!(view.section("Wicket Fall Timeline").is_none());
    assert!(view.section("Boundary Frequency Heatmap").is_none());
    assert!(view.section("Ball-by-Ball Log").is_some());
}

#[test]
fn test_header_only_file_shows_no_data() {
    let dir = TempDir::new().unwrap();
    common::write_dataset(dir.path(), Dataset::Fielding, "player,catches\n");
    let view = view_for(&dir, Tab::Fielding, PlayerFilter::All);
    assert!(view.sections().all(Section::is_no_data));
}

#[test]
fn test_failed_tab_does_not_affect_others() {
    let dir = common::create_data_dir();
    std::fs::remove_file(common::dataset_paths(&dir).resolve(Dataset::Bowling)).unwrap();
    let mut datasets = Datasets::new(common::dataset_paths(&dir));
    let opts = ViewOptions::default();

    let bowling = build_view(
        &mut datasets,
        &ViewState {
            player: PlayerFilter::All,
            tab: Tab::Bowling,
        },
        &opts,
    );
    match bowling {
        Err(ViewError::Load(e)) => assert_eq!(e.dataset(), Dataset::Bowling),
        other => panic!("expected load error, got {:?}", other.map(|v| v.header)),
    }

    let batting = build_view(&mut datasets, &ViewState::default(), &opts).unwrap();
    assert_eq!(batting.tab, Tab::Batting);
}

#[test]
fn test_custom_top_n() {
    let dir = common::create_data_dir();
    let mut datasets = Datasets::new(common::dataset_paths(&dir));
    let opts = ViewOptions {
        top_n: 3,
        ..ViewOptions::default()
    };
    let view = build_view(&mut datasets, &ViewState::default(), &opts).unwrap();
    assert_eq!(bar_labels(chart(&view, "Top 3 Run Scorers")).len(), 3);
}

#[test]
fn test_view_serializes_to_json() {
    let dir = common::create_data_dir();
    let view = view_for(&dir, Tab::Fielding, PlayerFilter::All);
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["tab"], "fielding");
    assert_eq!(json["header"], "Fielding Analysis");
    assert_eq!(json["rows"][0][0]["body"]["type"], "chart");
}
