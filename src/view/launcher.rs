use super::{mismatch, theme, ViewCx};
use crate::error::RenderError;
use crate::payload::Payload;
use crate::settings::LauncherLink;
use eframe::egui::{self, Color32, RichText};

/// 3x2 grid of quick links.
#[derive(Debug, Clone)]
pub struct LauncherView {
    links: Vec<LauncherLink>,
}

impl LauncherView {
    pub fn new(links: Vec<LauncherLink>) -> Self {
        Self { links }
    }

    pub fn links(&self) -> &[LauncherLink] {
        &self.links
    }

    pub fn apply(&mut self, payload: Payload) -> Result<(), RenderError> {
        Err(mismatch("launcher", &payload))
    }

    pub(crate) fn show(&mut self, ui: &mut egui::Ui, _cx: &mut ViewCx<'_>) {
        egui::Grid::new("launcher_grid")
            .num_columns(3)
            .spacing([10.0, 6.0])
            .show(ui, |ui| {
                for (i, link) in self.links.iter().enumerate() {
                    let label = egui::Label::new(
                        RichText::new(&link.glyph).size(12.0).strong().color(theme::DIM),
                    )
                    .sense(egui::Sense::click());
                    let resp = ui.add(label);
                    if resp.hovered() {
                        let color = parse_hex(&link.color).unwrap_or(Color32::WHITE);
                        ui.painter().text(
                            resp.rect.center(),
                            egui::Align2::CENTER_CENTER,
                            &link.glyph,
                            egui::FontId::proportional(12.0),
                            color,
                        );
                    }
                    if resp.clicked() {
                        // Spawns the browser detached; never waits on it.
                        if let Err(err) = open::that_detached(&link.url) {
                            tracing::warn!(url = %link.url, ?err, "failed to open link");
                        }
                    }
                    if i % 3 == 2 {
                        ui.end_row();
                    }
                }
            });
    }
}

/// `"#rrggbb"` to a colour.
pub fn parse_hex(s: &str) -> Option<Color32> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let v = u32::from_str_radix(hex, 16).ok()?;
    Some(Color32::from_rgb((v >> 16) as u8, (v >> 8) as u8, v as u8))
}
