use eframe::egui::{self, Pos2, Vec2};
use overlay_widgets::overlay::{Opacity, OverlayWindow, WindowRole};
use overlay_widgets::view::{ClockView, WidgetView};

#[path = "mock_ctx.rs"]
mod mock_ctx;
use mock_ctx::MockCtx;

fn window() -> OverlayWindow {
    OverlayWindow::new(
        "Clock",
        WindowRole::Widget,
        Pos2::new(250.0, 600.0),
        Vec2::new(160.0, 90.0),
        Opacity::DEFAULT,
        WidgetView::Clock(ClockView),
    )
}

#[test]
fn drag_moves_by_total_pointer_delta() {
    let mut w = window();
    w.begin_drag(Pos2::new(300.0, 640.0));
    for p in [
        Pos2::new(301.0, 641.0),
        Pos2::new(320.0, 600.0),
        Pos2::new(290.0, 610.0),
        Pos2::new(330.0, 620.0),
    ] {
        w.continue_drag(p);
    }
    w.end_drag();
    assert_eq!(w.position(), Pos2::new(280.0, 580.0));
    assert_eq!(w.size(), Vec2::new(160.0, 90.0));
}

#[test]
fn single_step_and_many_steps_agree() {
    let mut one = window();
    one.begin_drag(Pos2::ZERO);
    one.continue_drag(Pos2::new(40.0, -25.0));

    let mut many = window();
    many.begin_drag(Pos2::ZERO);
    for i in 1..=40 {
        many.continue_drag(Pos2::new(i as f32, -25.0 * i as f32 / 40.0));
    }
    assert_eq!(one.position(), many.position());
}

#[test]
fn moves_are_pushed_to_the_viewport() {
    let mut w = window();
    let ctx = MockCtx::default();
    w.begin_drag(Pos2::new(10.0, 10.0));
    w.continue_drag(Pos2::new(15.0, 12.0));
    w.continue_drag(Pos2::new(15.0, 12.0));
    w.flush(&ctx);
    assert_eq!(
        ctx.take(),
        vec![egui::ViewportCommand::OuterPosition(Pos2::new(255.0, 602.0))]
    );
}

#[test]
fn continue_without_begin_is_ignored() {
    let mut w = window();
    w.continue_drag(Pos2::new(500.0, 500.0));
    assert_eq!(w.position(), Pos2::new(250.0, 600.0));
    w.begin_drag(Pos2::ZERO);
    assert!(w.is_dragging());
    w.end_drag();
    w.continue_drag(Pos2::new(5.0, 5.0));
    assert_eq!(w.position(), Pos2::new(250.0, 600.0));
}
