use eframe::egui::{Pos2, Vec2};
use overlay_widgets::app::{self, AppRoot, ARDUINO, CLOCK, MONITOR, SETTINGS};
use overlay_widgets::overlay::WindowRole;
use overlay_widgets::settings::Settings;
use overlay_widgets::view::UiAction;

fn settings(dir: &tempfile::TempDir) -> Settings {
    Settings {
        notes_path: dir.path().join("notes.txt"),
        ..Settings::default()
    }
}

#[test]
fn windows_start_on_the_grid() {
    let dir = tempfile::tempdir().unwrap();
    let root = AppRoot::assemble(&settings(&dir)).unwrap();
    let reg = root.registry();
    assert_eq!(reg.len(), 9);

    let at = |name: &str| reg.get(name).unwrap().position();
    assert_eq!(at(ARDUINO), Pos2::new(80.0, 900.0));
    assert_eq!(at("BTC"), Pos2::new(80.0, 800.0));
    assert_eq!(at("USDT"), Pos2::new(80.0, 700.0));
    assert_eq!(at(MONITOR), Pos2::new(80.0, 600.0));
    assert_eq!(at(CLOCK), Pos2::new(250.0, 600.0));
    assert_eq!(at(SETTINGS), Pos2::new(80.0, 558.0));

    let bar = reg.get(SETTINGS).unwrap();
    assert_eq!(bar.role(), WindowRole::Control);
    assert_eq!(bar.size(), Vec2::new(160.0, 32.0));
    assert!(reg.iter().all(|w| w.is_visible()));
    assert!(reg.iter().all(|w| w.opacity().get() == 0.85));
    assert!(root.supervisor().is_empty());
}

#[test]
fn control_actions_go_through_the_registry() {
    let dir = tempfile::tempdir().unwrap();
    let mut root = AppRoot::assemble(&settings(&dir)).unwrap();

    root.apply(UiAction::SetGlobalOpacity(0.4));
    assert!(root.registry().iter().all(|w| w.opacity().get() == 0.4));
    root.apply(UiAction::SetGlobalOpacity(0.05));
    assert!(root.registry().iter().all(|w| w.opacity().get() == 0.4));

    root.apply(UiAction::ToggleAll);
    assert!(root.registry().all_hidden());
    assert!(root.registry().list_with_visibility().iter().all(|(_, v)| !v));
    assert!(root.registry().get(SETTINGS).unwrap().is_visible());

    root.apply(UiAction::ToggleOne(CLOCK.into()));
    assert!(root.registry().get(CLOCK).unwrap().is_visible());
    root.apply(UiAction::ToggleOne("Nope".into()));
}

#[test]
fn close_all_ends_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut root = AppRoot::assemble(&settings(&dir)).unwrap();
    assert!(root.is_running());
    root.apply(UiAction::CloseAll);
    assert!(!root.is_running());
}

#[test]
fn invalid_settings_are_rejected_before_any_window_exists() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = settings(&dir);
    s.opacity = 1.5;
    assert!(AppRoot::assemble(&s).is_err());

    let mut s = settings(&dir);
    s.prices[1].name = MONITOR.into();
    assert!(AppRoot::assemble(&s).is_err());
}

#[test]
fn plan_matches_created_windows() {
    let dir = tempfile::tempdir().unwrap();
    let s = settings(&dir);
    let root = AppRoot::assemble(&s).unwrap();
    for (name, placement) in app::plan(&s) {
        let w = root.registry().get(&name).unwrap();
        assert_eq!(w.position(), placement.position);
        assert_eq!(w.size(), placement.size);
    }
}
