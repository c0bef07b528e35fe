use eframe::egui::{self, Pos2, Vec2};
use overlay_widgets::overlay::{Opacity, OverlayWindow, WindowRole};
use overlay_widgets::registry::Registry;
use overlay_widgets::view::{ClockView, WidgetView};

#[path = "mock_ctx.rs"]
mod mock_ctx;
use mock_ctx::MockCtx;

fn registry(names: &[&str]) -> Registry {
    let mut reg = Registry::new(Opacity::DEFAULT);
    for name in names {
        reg.register(OverlayWindow::new(
            *name,
            WindowRole::Widget,
            Pos2::ZERO,
            Vec2::new(160.0, 90.0),
            Opacity::DEFAULT,
            WidgetView::Clock(ClockView),
        ))
        .unwrap();
    }
    reg
}

fn visibility(reg: &Registry) -> Vec<(String, bool)> {
    reg.list_with_visibility()
}

#[test]
fn toggle_all_twice_restores_state() {
    let mut reg = registry(&["A", "B", "C"]);
    let before = visibility(&reg);
    assert!(reg.toggle_all_visibility());
    assert!(visibility(&reg).iter().all(|(_, v)| !v));
    assert!(!reg.toggle_all_visibility());
    assert_eq!(visibility(&reg), before);
}

#[test]
fn toggle_all_forces_group_state_over_individual_state() {
    let mut reg = registry(&["A", "B"]);
    assert!(!reg.toggle_one("A").unwrap());
    // Group hide, then group show: A comes back even though it was hidden
    // on its own before.
    reg.toggle_all_visibility();
    reg.toggle_all_visibility();
    assert_eq!(
        visibility(&reg),
        vec![("A".to_string(), true), ("B".to_string(), true)]
    );
}

#[test]
fn toggle_one_ignores_group_flag() {
    let mut reg = registry(&["A", "B"]);
    reg.toggle_all_visibility();
    assert!(reg.all_hidden());
    assert!(reg.toggle_one("B").unwrap());
    assert!(reg.all_hidden());
    assert_eq!(
        visibility(&reg),
        vec![("A".to_string(), false), ("B".to_string(), true)]
    );
}

#[test]
fn visibility_is_idempotent_and_reaches_the_viewport() {
    let mut reg = registry(&["A"]);
    let ctx = MockCtx::default();
    let w = reg.get_mut("A").unwrap();
    w.flush(&ctx);
    ctx.take();

    w.set_visible(true);
    w.flush(&ctx);
    assert!(ctx.take().is_empty());

    w.set_visible(false);
    w.set_visible(false);
    w.flush(&ctx);
    assert_eq!(ctx.take(), vec![egui::ViewportCommand::Visible(false)]);

    w.set_visible(true);
    w.flush(&ctx);
    assert_eq!(
        ctx.take(),
        vec![
            egui::ViewportCommand::Visible(true),
            egui::ViewportCommand::Minimized(false)
        ]
    );
}

#[test]
fn menu_snapshot_is_point_in_time() {
    let mut reg = registry(&["A", "B"]);
    let snap = reg.list_with_visibility();
    reg.toggle_one("A").unwrap();
    assert_eq!(snap[0], ("A".to_string(), true));
    assert_eq!(reg.list_with_visibility()[0], ("A".to_string(), false));
}
