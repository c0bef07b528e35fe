use crate::app::{AppRoot, SETTINGS};
use crate::overlay::{OverlayWindow, WindowRole};
use crate::view::{theme, UiAction, ViewCx};
use eframe::egui::{self, Color32, Pos2, Sense};
use std::sync::Arc;
use std::time::Duration;

/// Repaint cadence that keeps the clock current without any poller.
const IDLE_REPAINT: Duration = Duration::from_millis(250);

/// The eframe application. The root viewport is the settings bar; every
/// other window is an immediate child viewport.
pub struct OverlayApp {
    root: AppRoot,
    root_hidden: bool,
}

impl OverlayApp {
    pub fn new(root: AppRoot, ctx: &egui::Context) -> Self {
        let waker = ctx.clone();
        root.queue()
            .set_waker(Arc::new(move || waker.request_repaint()));
        apply_style(ctx);
        Self {
            root,
            root_hidden: false,
        }
    }

    pub fn root(&self) -> &AppRoot {
        &self.root
    }
}

fn apply_style(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();
    visuals.panel_fill = Color32::TRANSPARENT;
    visuals.window_fill = theme::BG;
    visuals.override_text_color = Some(theme::FG);
    ctx.set_visuals(visuals);
}

/// Panel background with the window's opacity in the alpha channel.
fn panel_frame(window: &OverlayWindow) -> egui::Frame {
    let [r, g, b, _] = theme::BG.to_array();
    egui::Frame::none()
        .fill(Color32::from_rgba_unmultiplied(r, g, b, window.opacity().alpha_u8()))
        .inner_margin(egui::Margin::same(6.0))
        .rounding(egui::Rounding::same(4.0))
}

/// Pointer position in screen space, or `None` when off the window.
fn screen_pointer(ctx: &egui::Context, window: &OverlayWindow) -> Option<Pos2> {
    ctx.input(|i| {
        let local = i.pointer.interact_pos()?;
        let origin = i
            .viewport()
            .inner_rect
            .map(|r| r.min)
            .unwrap_or(window.position());
        Some(origin + local.to_vec2())
    })
}

struct Snapshot {
    menu: Vec<(String, bool)>,
    global_opacity: f32,
    all_hidden: bool,
}

/// Draw one window into the viewport `ctx` belongs to and push its queued
/// native changes.
fn draw_window(
    ctx: &egui::Context,
    window: &mut OverlayWindow,
    snap: &Snapshot,
    actions: &mut Vec<UiAction>,
) {
    let name = window.name().to_string();
    if ctx.input(|i| i.viewport().close_requested()) {
        actions.push(UiAction::Close(name.clone()));
    }
    let frame = panel_frame(window);
    let mut cx = ViewCx::new(&name, &snap.menu, snap.global_opacity, snap.all_hidden);
    let background = egui::CentralPanel::default()
        .frame(frame)
        .show(ctx, |ui| {
            // Registered before the content so widgets stay clickable on top.
            let bg = ui.interact(
                ui.max_rect(),
                ui.id().with("overlay-bg"),
                Sense::click_and_drag(),
            );
            window.view_mut().show(ui, &mut cx);
            bg
        })
        .inner;

    if background.drag_started() {
        if let Some(p) = screen_pointer(ctx, window) {
            window.begin_drag(p);
        }
    } else if background.dragged() {
        if let Some(p) = screen_pointer(ctx, window) {
            window.continue_drag(p);
        }
    }
    if background.drag_stopped() {
        window.end_drag();
    }
    background.context_menu(|ui| {
        if ui.button("Close").clicked() {
            cx.actions.push(UiAction::Close(name.clone()));
            ui.close_menu();
        }
        if ui.button("Close All").clicked() {
            cx.actions.push(UiAction::CloseAll);
            ui.close_menu();
        }
    });
    actions.append(&mut cx.actions);
    window.flush(ctx);
}

impl eframe::App for OverlayApp {
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        [0.0; 4]
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.root.is_running() && ctx.input(|i| i.viewport().close_requested()) {
            // Closing the bar itself only hides it; `Close All` ends the app.
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
        }
        let stats = self.root.pump();
        if stats.applied + stats.poll_errors + stats.render_errors > 0 {
            tracing::trace!(?stats, "dispatch drained");
        }

        let registry = self.root.registry();
        let snap = Snapshot {
            menu: registry.list_with_visibility(),
            global_opacity: registry.global_opacity().get(),
            all_hidden: registry.all_hidden(),
        };
        let mut actions = Vec::new();

        for window in self.root.registry_mut().iter_mut() {
            if window.role() != WindowRole::Widget {
                continue;
            }
            let builder = egui::ViewportBuilder::default()
                .with_title(window.name())
                .with_decorations(false)
                .with_always_on_top()
                .with_transparent(true)
                .with_resizable(false)
                .with_taskbar(false)
                .with_position(window.position())
                .with_inner_size(window.size());
            let id = egui::ViewportId::from_hash_of(("overlay", window.name()));
            ctx.show_viewport_immediate(id, builder, |ctx, _class| {
                draw_window(ctx, window, &snap, &mut actions);
            });
        }

        match self.root.registry_mut().get_mut(SETTINGS) {
            Some(control) => {
                draw_window(ctx, control, &snap, &mut actions);
            }
            None if !self.root_hidden => {
                ctx.send_viewport_cmd(egui::ViewportCommand::Visible(false));
                self.root_hidden = true;
            }
            None => {}
        }

        for action in actions {
            self.root.apply(action);
        }
        if self.root.is_running() && self.root.registry().is_empty() {
            self.root.shutdown();
        }
        if !self.root.is_running() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }
        ctx.request_repaint_after(IDLE_REPAINT);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.root.shutdown();
        tracing::info!("overlay closed");
    }
}
