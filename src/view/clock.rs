use super::{mismatch, theme, ViewCx};
use crate::error::RenderError;
use crate::payload::Payload;
use chrono::{DateTime, Local, TimeZone};
use eframe::egui::{self, RichText};
use std::time::Duration;

/// Local time, refreshed by the UI loop itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockView;

/// `("14:05", "TUE, 03 SEP")`.
pub fn clock_text<Tz: TimeZone>(now: &DateTime<Tz>) -> (String, String)
where
    Tz::Offset: std::fmt::Display,
{
    (
        now.format("%H:%M").to_string(),
        now.format("%a, %d %b").to_string().to_uppercase(),
    )
}

impl ClockView {
    pub fn apply(&mut self, payload: Payload) -> Result<(), RenderError> {
        Err(mismatch("clock", &payload))
    }

    pub(crate) fn show(&mut self, ui: &mut egui::Ui, _cx: &mut ViewCx<'_>) {
        let (time, date) = clock_text(&Local::now());
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(time).size(26.0).strong().color(theme::CYAN));
            ui.label(RichText::new(date).size(10.0).color(theme::SOFT));
        });
        ui.ctx().request_repaint_after(Duration::from_secs(1));
    }
}
