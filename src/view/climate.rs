use super::{mismatch, theme, ViewCx};
use crate::error::RenderError;
use crate::payload::{ClimateReading, LinkStatus, Payload, SourceKind};
use crate::poller::serial::{SerialCommand, SerialCommander};
use eframe::egui::{self, Color32, RichText};

/// Temperature/humidity panel for the serial climate controller.
#[derive(Debug, Default)]
pub struct ClimateView {
    reading: Option<ClimateReading>,
    connected: bool,
    unavailable: bool,
    commander: Option<SerialCommander>,
}

impl ClimateView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_commander(mut self, commander: SerialCommander) -> Self {
        self.commander = Some(commander);
        self
    }

    pub fn set_commander(&mut self, commander: SerialCommander) {
        self.commander = Some(commander);
    }

    pub fn reading(&self) -> Option<&ClimateReading> {
        self.reading.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn temperature_text(&self) -> String {
        match &self.reading {
            Some(r) => format!("{}°", r.temperature),
            None => "--°".into(),
        }
    }

    pub fn humidity_text(&self) -> String {
        match &self.reading {
            Some(r) => format!("{}%", r.humidity),
            None => "--%".into(),
        }
    }

    pub fn mode_text(&self) -> &'static str {
        if self.unavailable {
            "N/A"
        } else if self.reading.as_ref().is_some_and(|r| r.manual) {
            "MANUAL"
        } else {
            "AUTO"
        }
    }

    /// Command sent by the power button: off when the device reports on.
    pub fn power_command(&self) -> SerialCommand {
        if self.reading.as_ref().is_some_and(|r| r.power_on) {
            SerialCommand::Off
        } else {
            SerialCommand::On
        }
    }

    pub fn apply(&mut self, payload: Payload) -> Result<(), RenderError> {
        match payload {
            Payload::Climate(reading) => {
                if !reading.temperature.is_finite() || !reading.humidity.is_finite() {
                    return Err(RenderError::Invalid("non-finite climate reading".into()));
                }
                self.reading = Some(reading);
                Ok(())
            }
            Payload::Link(status) => {
                self.connected = status == LinkStatus::Connected;
                Ok(())
            }
            Payload::Unavailable(SourceKind::Serial) => {
                self.unavailable = true;
                self.connected = false;
                Ok(())
            }
            other => Err(mismatch("climate", &other)),
        }
    }

    fn send(&self, cmd: SerialCommand) {
        if let Some(commander) = &self.commander {
            commander.send(cmd);
        }
    }

    pub(crate) fn show(&mut self, ui: &mut egui::Ui, _cx: &mut ViewCx<'_>) {
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(self.temperature_text())
                    .size(20.0)
                    .strong()
                    .color(theme::FG),
            );
            ui.label(RichText::new(self.humidity_text()).size(12.0).color(theme::MUTED));
        });
        ui.horizontal(|ui| {
            let power_color = match self.reading.as_ref().map(|r| r.power_on) {
                Some(true) => theme::GREEN,
                Some(false) => theme::RED,
                None => theme::DIM,
            };
            let power = ui.add(
                egui::Label::new(RichText::new("⚡").size(16.0).color(power_color))
                    .sense(egui::Sense::click()),
            );
            if power.clicked() {
                self.send(self.power_command());
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let mode_color = if self.mode_text() == "MANUAL" {
                    theme::YELLOW
                } else {
                    theme::BLUE
                };
                let mode = ui.add(
                    egui::Label::new(RichText::new(self.mode_text()).size(9.0).strong().color(mode_color))
                        .sense(egui::Sense::click()),
                );
                if mode.clicked() {
                    self.send(SerialCommand::Auto);
                }
                let dot = if self.connected { theme::GREEN } else { Color32::from_gray(0x33) };
                ui.label(RichText::new("●").size(6.0).color(dot));
            });
        });
    }
}
