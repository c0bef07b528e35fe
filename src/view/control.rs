use super::{mismatch, theme, UiAction, ViewCx};
use crate::error::RenderError;
use crate::overlay::Opacity;
use crate::payload::Payload;
use eframe::egui::{self, RichText};

/// The slim settings bar: opacity slider, group visibility, window menu.
#[derive(Debug, Clone)]
pub struct ControlView {
    slider: f32,
}

impl ControlView {
    pub fn new(opacity: Opacity) -> Self {
        Self {
            slider: opacity.get(),
        }
    }

    pub fn apply(&mut self, payload: Payload) -> Result<(), RenderError> {
        Err(mismatch("control", &payload))
    }

    pub(crate) fn show(&mut self, ui: &mut egui::Ui, cx: &mut ViewCx<'_>) {
        // Follow opacity changes applied from elsewhere.
        if (self.slider - cx.global_opacity).abs() > f32::EPSILON && !ui.ctx().is_using_pointer() {
            self.slider = cx.global_opacity;
        }
        ui.horizontal_centered(|ui| {
            ui.label(RichText::new("◑").size(10.0).color(theme::DIM));
            let slider = egui::Slider::new(&mut self.slider, Opacity::MIN..=Opacity::MAX)
                .step_by(0.05)
                .show_value(false);
            if ui.add(slider).changed() {
                cx.actions.push(UiAction::SetGlobalOpacity(self.slider));
            }

            let (icon, color) = if cx.all_hidden {
                ("─", egui::Color32::from_gray(0x55))
            } else {
                ("👁", egui::Color32::from_gray(0xaa))
            };
            let toggle = ui.add(
                egui::Label::new(RichText::new(icon).size(11.0).color(color))
                    .sense(egui::Sense::click()),
            );
            if toggle.clicked() {
                cx.actions.push(UiAction::ToggleAll);
            }

            ui.menu_button(RichText::new("⋮").size(12.0), |ui| {
                for (name, visible) in cx.menu {
                    let label = if *visible {
                        format!("✓ {name}")
                    } else {
                        format!("   {name}")
                    };
                    if ui.button(label).clicked() {
                        cx.actions.push(UiAction::ToggleOne(name.clone()));
                        ui.close_menu();
                    }
                }
            });
        });
    }
}
