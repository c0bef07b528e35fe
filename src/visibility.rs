use eframe::egui;

/// The subset of [`egui::Context`] used to push window changes to the
/// native viewport. Tests substitute a recording implementation.
pub trait ViewportCtx {
    fn send_viewport_cmd(&self, cmd: egui::ViewportCommand);
    fn request_repaint(&self);
}

impl ViewportCtx for egui::Context {
    fn send_viewport_cmd(&self, cmd: egui::ViewportCommand) {
        egui::Context::send_viewport_cmd(self, cmd);
    }

    fn request_repaint(&self) {
        egui::Context::request_repaint(self);
    }
}

/// Commands that make a hidden overlay visible again or withdraw it.
pub fn visibility_commands(visible: bool) -> Vec<egui::ViewportCommand> {
    if visible {
        vec![
            egui::ViewportCommand::Visible(true),
            egui::ViewportCommand::Minimized(false),
        ]
    } else {
        vec![egui::ViewportCommand::Visible(false)]
    }
}
