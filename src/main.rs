use overlay_widgets::app::{self, AppRoot, SETTINGS};
use overlay_widgets::gui::OverlayApp;
use overlay_widgets::logging;
use overlay_widgets::settings::Settings;

use eframe::egui;

const SETTINGS_FILE: &str = "settings.json";

fn main() -> anyhow::Result<()> {
    let settings = Settings::load(SETTINGS_FILE)?;
    let _log_guard = logging::init(settings.debug_logging, settings.log_file.as_deref());
    tracing::info!(file = SETTINGS_FILE, "settings loaded");

    let control = app::plan(&settings)
        .into_iter()
        .find(|(name, _)| name == SETTINGS)
        .map(|(_, placement)| placement)
        .ok_or_else(|| anyhow::anyhow!("layout has no settings bar"))?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(SETTINGS)
            .with_inner_size(control.size)
            .with_position(control.position)
            .with_decorations(false)
            .with_transparent(true)
            .with_resizable(false)
            .with_taskbar(false)
            .with_always_on_top(),
        ..Default::default()
    };

    let root = AppRoot::build(&settings)?;
    eframe::run_native(
        "Overlay Widgets",
        native_options,
        Box::new(move |cc| Box::new(OverlayApp::new(root, &cc.egui_ctx))),
    )
    .map_err(|e| anyhow::anyhow!("event loop failed: {e}"))?;
    Ok(())
}
