use super::{mismatch, theme, ViewCx};
use crate::error::RenderError;
use crate::payload::{MetricsSample, Payload, SourceKind};
use eframe::egui::{self, Color32, RichText, Sense};

#[derive(Debug, Default)]
pub struct MonitorView {
    sample: Option<MetricsSample>,
    unavailable: bool,
}

impl MonitorView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample(&self) -> Option<MetricsSample> {
        self.sample
    }

    pub fn cpu_text(&self) -> String {
        match self.sample {
            Some(s) => format!("{:.1}%", s.cpu_percent),
            None if self.unavailable => "n/a".into(),
            None => "--%".into(),
        }
    }

    pub fn gpu_text(&self) -> String {
        match self.sample {
            Some(s) => format!("{:.1}% | {:.0}°C", s.gpu_percent, s.gpu_temp_c),
            None if self.unavailable => "n/a".into(),
            None => "--%".into(),
        }
    }

    pub fn apply(&mut self, payload: Payload) -> Result<(), RenderError> {
        match payload {
            Payload::Metrics(sample) => {
                self.sample = Some(sample);
                Ok(())
            }
            Payload::Unavailable(SourceKind::LocalMetric) => {
                self.unavailable = true;
                Ok(())
            }
            other => Err(mismatch("monitor", &other)),
        }
    }

    pub(crate) fn show(&mut self, ui: &mut egui::Ui, _cx: &mut ViewCx<'_>) {
        let sample = self.sample.unwrap_or(MetricsSample {
            cpu_percent: 0.0,
            gpu_percent: 0.0,
            gpu_temp_c: 0.0,
        });
        ui.add_space(6.0);
        meter(ui, "CPU", &self.cpu_text(), sample.cpu_percent, theme::BLUE);
        ui.add_space(6.0);
        meter(ui, "GPU", &self.gpu_text(), sample.gpu_percent, theme::GREEN);
    }
}

fn meter(ui: &mut egui::Ui, label: &str, value: &str, percent: f32, color: Color32) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(label).size(8.0).strong().color(color));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(RichText::new(value).size(7.0).color(Color32::WHITE));
        });
    });
    let (rect, _) = ui.allocate_exact_size(egui::vec2(ui.available_width(), 4.0), Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, Color32::from_gray(0x22));
    let mut filled = rect;
    filled.set_width(rect.width() * (percent.clamp(0.0, 100.0) / 100.0));
    painter.rect_filled(filled, 0.0, color);
}
