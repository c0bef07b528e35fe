//! Per-source render strategies. One generic [`crate::overlay::OverlayWindow`]
//! carries exactly one [`WidgetView`], which owns the widget's last good
//! display state and knows which payload shapes it accepts.

pub mod climate;
pub mod clock;
pub mod control;
pub mod launcher;
pub mod lexicon;
pub mod monitor;
pub mod notes;
pub mod price;

pub use climate::ClimateView;
pub use clock::ClockView;
pub use control::ControlView;
pub use launcher::LauncherView;
pub use lexicon::LexiconView;
pub use monitor::MonitorView;
pub use notes::NotesView;
pub use price::PriceView;

use crate::error::RenderError;
use crate::payload::{Payload, SourceKind};
use eframe::egui;

pub mod theme {
    use eframe::egui::Color32;

    pub const BG: Color32 = Color32::from_rgb(0x05, 0x05, 0x05);
    pub const FG: Color32 = Color32::from_rgb(0xe0, 0xe0, 0xe0);
    pub const MUTED: Color32 = Color32::from_rgb(0x77, 0x77, 0x77);
    pub const SOFT: Color32 = Color32::from_rgb(0xbb, 0xbb, 0xbb);
    pub const DIM: Color32 = Color32::from_rgb(0x44, 0x44, 0x44);
    pub const CYAN: Color32 = Color32::from_rgb(0x00, 0xe5, 0xff);
    pub const GREEN: Color32 = Color32::from_rgb(0x00, 0xe6, 0x76);
    pub const RED: Color32 = Color32::from_rgb(0xff, 0x17, 0x44);
    pub const YELLOW: Color32 = Color32::from_rgb(0xf1, 0xc4, 0x0f);
    pub const BLUE: Color32 = Color32::from_rgb(0x29, 0x79, 0xff);
}

/// Requests raised while drawing. They are applied by the UI loop after all
/// windows have been drawn, never from inside a window's draw pass.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    SetGlobalOpacity(f32),
    ToggleAll,
    ToggleOne(String),
    /// Wake the named window's poller for an immediate cycle.
    Refresh(String),
    Close(String),
    CloseAll,
}

/// Context handed to a view while it draws.
pub struct ViewCx<'a> {
    pub window: &'a str,
    /// Snapshot from [`crate::registry::Registry::list_with_visibility`].
    pub menu: &'a [(String, bool)],
    pub global_opacity: f32,
    pub all_hidden: bool,
    pub actions: Vec<UiAction>,
}

impl<'a> ViewCx<'a> {
    pub fn new(
        window: &'a str,
        menu: &'a [(String, bool)],
        global_opacity: f32,
        all_hidden: bool,
    ) -> Self {
        Self {
            window,
            menu,
            global_opacity,
            all_hidden,
            actions: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub enum WidgetView {
    Climate(ClimateView),
    Price(PriceView),
    Monitor(MonitorView),
    Lexicon(LexiconView),
    Notes(NotesView),
    Launcher(LauncherView),
    Clock(ClockView),
    Control(ControlView),
}

impl WidgetView {
    /// Source kind feeding this view, `None` for views without a poller.
    pub fn source_kind(&self) -> Option<SourceKind> {
        match self {
            WidgetView::Climate(_) => Some(SourceKind::Serial),
            WidgetView::Price(_) | WidgetView::Lexicon(_) => Some(SourceKind::Http),
            WidgetView::Monitor(_) => Some(SourceKind::LocalMetric),
            WidgetView::Notes(_)
            | WidgetView::Launcher(_)
            | WidgetView::Clock(_)
            | WidgetView::Control(_) => None,
        }
    }

    pub fn apply(&mut self, payload: Payload) -> Result<(), RenderError> {
        match self {
            WidgetView::Climate(v) => v.apply(payload),
            WidgetView::Price(v) => v.apply(payload),
            WidgetView::Monitor(v) => v.apply(payload),
            WidgetView::Lexicon(v) => v.apply(payload),
            WidgetView::Notes(v) => v.apply(payload),
            WidgetView::Launcher(v) => v.apply(payload),
            WidgetView::Clock(v) => v.apply(payload),
            WidgetView::Control(v) => v.apply(payload),
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, cx: &mut ViewCx<'_>) {
        match self {
            WidgetView::Climate(v) => v.show(ui, cx),
            WidgetView::Price(v) => v.show(ui, cx),
            WidgetView::Monitor(v) => v.show(ui, cx),
            WidgetView::Lexicon(v) => v.show(ui, cx),
            WidgetView::Notes(v) => v.show(ui, cx),
            WidgetView::Launcher(v) => v.show(ui, cx),
            WidgetView::Clock(v) => v.show(ui, cx),
            WidgetView::Control(v) => v.show(ui, cx),
        }
    }

    pub fn as_price(&self) -> Option<&PriceView> {
        match self {
            WidgetView::Price(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_climate(&self) -> Option<&ClimateView> {
        match self {
            WidgetView::Climate(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_climate_mut(&mut self) -> Option<&mut ClimateView> {
        match self {
            WidgetView::Climate(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_monitor(&self) -> Option<&MonitorView> {
        match self {
            WidgetView::Monitor(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_lexicon(&self) -> Option<&LexiconView> {
        match self {
            WidgetView::Lexicon(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_notes(&self) -> Option<&NotesView> {
        match self {
            WidgetView::Notes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_notes_mut(&mut self) -> Option<&mut NotesView> {
        match self {
            WidgetView::Notes(v) => Some(v),
            _ => None,
        }
    }
}

pub(crate) fn mismatch(expected: &'static str, got: &Payload) -> RenderError {
    RenderError::ShapeMismatch {
        expected,
        got: got.shape(),
    }
}
