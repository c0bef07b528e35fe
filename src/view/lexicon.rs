use super::{mismatch, theme, UiAction, ViewCx};
use crate::error::RenderError;
use crate::payload::{Payload, SourceKind};
use eframe::egui::{self, Color32, RichText};

#[derive(Debug)]
pub struct LexiconView {
    word: String,
    definition: String,
}

impl Default for LexiconView {
    fn default() -> Self {
        Self {
            word: "...".into(),
            definition: "...".into(),
        }
    }
}

impl LexiconView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn definition(&self) -> &str {
        &self.definition
    }

    pub fn apply(&mut self, payload: Payload) -> Result<(), RenderError> {
        match payload {
            Payload::Word(entry) => {
                if entry.word.trim().is_empty() {
                    return Err(RenderError::Invalid("empty word".into()));
                }
                self.word = entry.word.to_lowercase();
                self.definition = entry.definition;
                Ok(())
            }
            Payload::Unavailable(SourceKind::Http) => {
                self.word = "offline".into();
                self.definition = "No Net".into();
                Ok(())
            }
            other => Err(mismatch("lexicon", &other)),
        }
    }

    pub(crate) fn show(&mut self, ui: &mut egui::Ui, cx: &mut ViewCx<'_>) {
        ui.label(
            RichText::new(&self.word)
                .size(11.0)
                .strong()
                .color(Color32::from_rgb(0xea, 0x00, 0xd9)),
        );
        ui.add(
            egui::Label::new(RichText::new(&self.definition).size(8.0).color(theme::SOFT)).wrap(true),
        );
        ui.with_layout(egui::Layout::bottom_up(egui::Align::Max), |ui| {
            let next = ui.add(
                egui::Label::new(RichText::new(">>").color(theme::DIM)).sense(egui::Sense::click()),
            );
            if next.clicked() {
                cx.actions.push(UiAction::Refresh(cx.window.to_string()));
            }
        });
    }
}
