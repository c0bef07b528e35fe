use super::{mismatch, theme, ViewCx};
use crate::error::RenderError;
use crate::notes::NotesWriter;
use crate::payload::Payload;
use eframe::egui;

/// Free-form text area persisted through a background [`NotesWriter`].
#[derive(Debug)]
pub struct NotesView {
    text: String,
    writer: Option<NotesWriter>,
}

impl NotesView {
    pub fn new(text: String, writer: Option<NotesWriter>) -> Self {
        Self { text, writer }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text and schedule a save, as an edit in the UI would.
    pub fn edit(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.persist();
    }

    fn persist(&self) {
        if let Some(writer) = &self.writer {
            writer.save(self.text.clone());
        }
    }

    pub fn apply(&mut self, payload: Payload) -> Result<(), RenderError> {
        Err(mismatch("notes", &payload))
    }

    pub(crate) fn show(&mut self, ui: &mut egui::Ui, _cx: &mut ViewCx<'_>) {
        let edit = egui::TextEdit::multiline(&mut self.text)
            .frame(false)
            .font(egui::TextStyle::Monospace)
            .text_color(theme::FG)
            .desired_width(f32::INFINITY)
            .desired_rows(4);
        if ui.add(edit).changed() {
            self.persist();
        }
    }
}
