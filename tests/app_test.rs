use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use npl_dash::{App, AppEvent, Dataset, PlayerFilter, Tab, ViewError};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;

mod common;

/// Feed an event through the app, following any events it emits.
/// Returns true if the app asked to exit.
fn dispatch(app: &mut App, event: AppEvent) -> bool {
    let mut next = Some(event);
    while let Some(event) = next {
        if matches!(event, AppEvent::Exit) {
            return true;
        }
        next = app.event(&event);
    }
    false
}

fn press(app: &mut App, code: KeyCode) -> bool {
    dispatch(app, AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
}

fn active_tab(app: &App) -> Option<Tab> {
    match app.view() {
        Some(Ok(view)) => Some(view.tab),
        _ => None,
    }
}

fn screen_text(app: &mut App, width: u16, height: u16) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    Widget::render(&mut *app, area, &mut buf);
    buf.content().iter().map(|cell| cell.symbol()).collect()
}

#[test]
fn test_app_starts_on_batting() {
    let dir = common::create_data_dir();
    let mut app = App::new(&common::config_for(&dir));

    assert!(app.view().is_none());
    assert_eq!(app.players().len(), 6);
    assert_eq!(app.state().player, PlayerFilter::All);

    dispatch(&mut app, AppEvent::Recompute);
    assert_eq!(active_tab(&app), Some(Tab::Batting));
}

#[test]
fn test_tab_keys() {
    let dir = common::create_data_dir();
    let mut app = App::new(&common::config_for(&dir));
    dispatch(&mut app, AppEvent::Recompute);

    press(&mut app, KeyCode::Char('2'));
    assert_eq!(active_tab(&app), Some(Tab::Bowling));

    press(&mut app, KeyCode::Tab);
    assert_eq!(active_tab(&app), Some(Tab::Fielding));

    press(&mut app, KeyCode::Char('5'));
    assert_eq!(active_tab(&app), Some(Tab::FinalMatch));

    press(&mut app, KeyCode::Tab);
    assert_eq!(active_tab(&app), Some(Tab::Batting));

    press(&mut app, KeyCode::BackTab);
    assert_eq!(active_tab(&app), Some(Tab::FinalMatch));
    assert_eq!(app.state().tab, Tab::FinalMatch);
}

#[test]
fn test_player_selection_recomputes_batting_only() {
    let dir = common::create_data_dir();
    let mut app = App::new(&common::config_for(&dir));
    dispatch(&mut app, AppEvent::Recompute);

    press(&mut app, KeyCode::Char('j'));
    assert_eq!(
        app.state().player,
        PlayerFilter::Player("Aasif Sheikh".to_string())
    );
    let reads = app.datasets().cache().disk_reads();
    match app.view() {
        Some(Ok(view)) => {
            let top = view.section("Top 10 Run Scorers (table)").unwrap();
            assert!(!top.is_no_data());
        }
        _ => panic!("expected batting view"),
    }

    press(&mut app, KeyCode::Char('2'));
    let bowling = app.view().and_then(|v| v.as_ref().ok()).cloned();
    press(&mut app, KeyCode::Char('j'));
    assert_eq!(
        app.state().player,
        PlayerFilter::Player("Dipendra Singh Airee".to_string())
    );
    // the bowling view does not depend on the player
    assert_eq!(
        app.view().and_then(|v| v.as_ref().ok()),
        bowling.as_ref()
    );

    press(&mut app, KeyCode::Char('a'));
    assert_eq!(app.state().player, PlayerFilter::All);

    press(&mut app, KeyCode::Char('1'));
    assert_eq!(active_tab(&app), Some(Tab::Batting));
    // batting and bowling were read once each
    assert_eq!(app.datasets().cache().disk_reads(), reads + 1);
}

#[test]
fn test_player_selection_stops_at_ends() {
    let dir = common::create_data_dir();
    let mut app = App::new(&common::config_for(&dir));

    press(&mut app, KeyCode::Char('k'));
    assert_eq!(app.state().player, PlayerFilter::All);

    for _ in 0..10 {
        press(&mut app, KeyCode::Char('j'));
    }
    assert_eq!(
        app.state().player,
        PlayerFilter::Player("Sompal Kami".to_string())
    );
}

#[test]
fn test_select_player_by_label() {
    let dir = common::create_data_dir();
    let mut app = App::new(&common::config_for(&dir));

    assert!(app.select_player(PlayerFilter::from_label("Rohit Paudel")));
    assert_eq!(app.state().player.label(), "Rohit Paudel");

    assert!(!app.select_player(PlayerFilter::from_label("Nobody")));
    assert_eq!(app.state().player.label(), "Rohit Paudel");

    assert!(app.select_player(PlayerFilter::from_label("All")));
    assert_eq!(app.state().player, PlayerFilter::All);
}

#[test]
fn test_help_and_quit() {
    let dir = common::create_data_dir();
    let mut app = App::new(&common::config_for(&dir));

    assert!(!press(&mut app, KeyCode::Char('?')));
    assert!(app.show_help());

    // tab keys are swallowed while help is open
    press(&mut app, KeyCode::Char('3'));
    assert_eq!(app.state().tab, Tab::Batting);

    press(&mut app, KeyCode::Esc);
    assert!(!app.show_help());

    press(&mut app, KeyCode::Char('?'));
    assert!(press(&mut app, KeyCode::Char('q')));

    assert!(press(&mut app, KeyCode::Char('q')));
}

#[test]
fn test_scroll_is_clamped() {
    let dir = common::create_data_dir();
    let mut app = App::new(&common::config_for(&dir));
    dispatch(&mut app, AppEvent::Recompute);

    let rows = match app.view() {
        Some(Ok(view)) => view.rows.len(),
        _ => panic!("expected batting view"),
    };
    for _ in 0..rows + 5 {
        press(&mut app, KeyCode::PageDown);
    }
    assert_eq!(app.scroll(), rows - 1);

    press(&mut app, KeyCode::PageUp);
    assert_eq!(app.scroll(), rows - 2);

    press(&mut app, KeyCode::Char('2'));
    assert_eq!(app.scroll(), 0);
}

#[test]
fn test_missing_dataset_is_contained_to_its_tab() {
    let dir = common::create_data_dir();
    std::fs::remove_file(common::dataset_paths(&dir).resolve(Dataset::Partnerships)).unwrap();
    let mut app = App::new(&common::config_for(&dir));

    press(&mut app, KeyCode::Char('4'));
    match app.view() {
        Some(Err(ViewError::Load(e))) => assert_eq!(e.dataset(), Dataset::Partnerships),
        _ => panic!("expected load error on partnerships tab"),
    }
    let text = screen_text(&mut app, 140, 45);
    assert!(text.contains("partnership data not found"));

    press(&mut app, KeyCode::Char('3'));
    assert_eq!(active_tab(&app), Some(Tab::Fielding));
}

#[test]
fn test_missing_batting_limits_selector() {
    let dir = common::create_data_dir();
    std::fs::remove_file(common::dataset_paths(&dir).resolve(Dataset::Batting)).unwrap();
    let mut app = App::new(&common::config_for(&dir));

    assert!(app.players().is_empty());
    press(&mut app, KeyCode::Char('j'));
    assert_eq!(app.state().player, PlayerFilter::All);

    press(&mut app, KeyCode::Char('2'));
    assert_eq!(active_tab(&app), Some(Tab::Bowling));
}

#[test]
fn test_render_dashboard() {
    let dir = common::create_data_dir();
    let mut app = App::new(&common::config_for(&dir));
    dispatch(&mut app, AppEvent::Recompute);

    let text = screen_text(&mut app, 160, 50);
    assert!(text.contains("Nepal Premier League 2024 Dashboard"));
    assert!(text.contains("Batting Analysis"));
    assert!(text.contains("Kushal Bhurtel"));

    press(&mut app, KeyCode::Char('5'));
    let text = screen_text(&mut app, 160, 50);
    assert!(text.contains("Final Match Analysis"));
}

#[test]
fn test_resize_and_unbound_keys_emit_nothing() {
    let dir = common::create_data_dir();
    let mut app = App::new(&common::config_for(&dir));
    dispatch(&mut app, AppEvent::Recompute);

    assert!(app.event(&AppEvent::Resize(80, 24)).is_none());
    assert!(app
        .event(&AppEvent::Key(KeyEvent::new(KeyCode::Char('z'), KeyModifiers::NONE)))
        .is_none());
    assert!(app.event(&AppEvent::Exit).is_none());
    assert_eq!(active_tab(&app), Some(Tab::Batting));
}
