use crate::error::{OverlayError, RenderError};
use crate::payload::Payload;
use crate::view::WidgetView;
use crate::visibility::{visibility_commands, ViewportCtx};
use eframe::egui::{self, Pos2, Vec2};
use std::marker::PhantomData;

/// Window opacity, always within [`Opacity::MIN`, `Opacity::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Opacity(f32);

impl Opacity {
    pub const MIN: f32 = 0.1;
    pub const MAX: f32 = 1.0;
    pub const DEFAULT: Opacity = Opacity(0.85);

    /// Validate `value`. Out-of-range and NaN inputs are rejected, never clamped.
    pub fn new(value: f32) -> Result<Self, OverlayError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(OverlayError::OpacityOutOfRange { value })
        }
    }

    pub fn get(self) -> f32 {
        self.0
    }

    /// Alpha channel used for the panel fill.
    pub fn alpha_u8(self) -> u8 {
        (self.0 * 255.0).round() as u8
    }
}

impl Default for Opacity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Whether a window takes part in group visibility and the management menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowRole {
    Widget,
    /// The settings bar. It receives opacity broadcasts but is never hidden
    /// by them and is not listed in its own menu.
    Control,
}

/// A borderless, always-on-top panel.
///
/// All state lives here and is mutated only on the UI thread; the type is
/// deliberately `!Send` so a poller thread cannot hold one. Changes that must
/// reach the native window are queued and pushed out by [`OverlayWindow::flush`].
pub struct OverlayWindow {
    name: String,
    role: WindowRole,
    position: Pos2,
    size: Vec2,
    opacity: Opacity,
    visible: bool,
    drag_anchor: Option<Pos2>,
    view: WidgetView,
    outbox: Vec<egui::ViewportCommand>,
    needs_repaint: bool,
    _ui_thread: PhantomData<*const ()>,
}

impl OverlayWindow {
    /// Create a visible window at `position` with a size fixed for its lifetime.
    pub fn new(
        name: impl Into<String>,
        role: WindowRole,
        position: Pos2,
        size: Vec2,
        opacity: Opacity,
        view: WidgetView,
    ) -> Self {
        Self {
            name: name.into(),
            role,
            position,
            size,
            opacity,
            visible: true,
            drag_anchor: None,
            view,
            outbox: Vec::new(),
            needs_repaint: true,
            _ui_thread: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> WindowRole {
        self.role
    }

    pub fn position(&self) -> Pos2 {
        self.position
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn opacity(&self) -> Opacity {
        self.opacity
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    pub fn view(&self) -> &WidgetView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut WidgetView {
        &mut self.view
    }

    /// Record the pointer position (screen space) where a drag starts.
    pub fn begin_drag(&mut self, pointer: Pos2) {
        self.drag_anchor = Some(pointer);
    }

    /// Move the window by the pointer delta since the previous drag event.
    pub fn continue_drag(&mut self, pointer: Pos2) {
        let Some(anchor) = self.drag_anchor else {
            return;
        };
        let delta = pointer - anchor;
        self.drag_anchor = Some(pointer);
        if delta == Vec2::ZERO {
            return;
        }
        self.position += delta;
        self.outbox
            .push(egui::ViewportCommand::OuterPosition(self.position));
        self.needs_repaint = true;
    }

    pub fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    pub fn set_opacity(&mut self, value: f32) -> Result<(), OverlayError> {
        let opacity = Opacity::new(value)?;
        self.apply_opacity(opacity);
        Ok(())
    }

    pub(crate) fn apply_opacity(&mut self, opacity: Opacity) {
        if self.opacity != opacity {
            self.opacity = opacity;
            self.needs_repaint = true;
        }
    }

    /// Show or withdraw the window. Setting the current state again is a no-op.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        self.outbox.extend(visibility_commands(visible));
        self.needs_repaint = true;
    }

    /// Hand a payload to the window's view. A rejected payload leaves the
    /// view showing its last good state.
    pub fn render_update(&mut self, payload: Payload) -> Result<(), RenderError> {
        self.view.apply(payload)?;
        self.needs_repaint = true;
        Ok(())
    }

    /// Commands queued since the last flush, oldest first.
    pub fn pending_commands(&self) -> &[egui::ViewportCommand] {
        &self.outbox
    }

    /// Push queued native window changes to `ctx`.
    pub fn flush(&mut self, ctx: &impl ViewportCtx) {
        for cmd in self.outbox.drain(..) {
            ctx.send_viewport_cmd(cmd);
        }
        if std::mem::take(&mut self.needs_repaint) {
            ctx.request_repaint();
        }
    }
}

impl std::fmt::Debug for OverlayWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayWindow")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("position", &self.position)
            .field("size", &self.size)
            .field("opacity", &self.opacity)
            .field("visible", &self.visible)
            .finish_non_exhaustive()
    }
}
