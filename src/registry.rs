use crate::error::OverlayError;
use crate::overlay::{Opacity, OverlayWindow, WindowRole};
use hashlink::LinkedHashMap;

/// Process-wide name → window mapping, owned by the application root and
/// only ever touched on the UI thread.
///
/// Group visibility is a single flag: [`Registry::toggle_all_visibility`]
/// forces every widget to the flag's state, so a window hidden on its own
/// becomes visible again when the group is shown.
#[derive(Debug)]
pub struct Registry {
    windows: LinkedHashMap<String, OverlayWindow>,
    global_opacity: Opacity,
    all_hidden: bool,
}

impl Registry {
    pub fn new(global_opacity: Opacity) -> Self {
        Self {
            windows: LinkedHashMap::new(),
            global_opacity,
            all_hidden: false,
        }
    }

    /// Add a window. Names are unique for the life of the process.
    pub fn register(&mut self, window: OverlayWindow) -> Result<(), OverlayError> {
        if self.windows.contains_key(window.name()) {
            return Err(OverlayError::DuplicateName(window.name().to_string()));
        }
        tracing::debug!(window = %window.name(), "window registered");
        self.windows.insert(window.name().to_string(), window);
        Ok(())
    }

    /// Detach a window, e.g. when it is closed.
    pub fn remove(&mut self, name: &str) -> Option<OverlayWindow> {
        let removed = self.windows.remove(name);
        if removed.is_some() {
            tracing::debug!(window = %name, "window detached");
        }
        removed
    }

    pub fn get(&self, name: &str) -> Option<&OverlayWindow> {
        self.windows.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut OverlayWindow> {
        self.windows.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.windows.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OverlayWindow> {
        self.windows.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut OverlayWindow> {
        self.windows.values_mut()
    }

    /// Opacity given to windows created from now on.
    pub fn global_opacity(&self) -> Opacity {
        self.global_opacity
    }

    pub fn all_hidden(&self) -> bool {
        self.all_hidden
    }

    /// Validate `value` and apply it to every registered window, the
    /// settings bar included.
    pub fn set_global_opacity(&mut self, value: f32) -> Result<(), OverlayError> {
        let opacity = Opacity::new(value)?;
        self.global_opacity = opacity;
        for window in self.windows.values_mut() {
            window.apply_opacity(opacity);
        }
        tracing::debug!(opacity = value, "global opacity applied");
        Ok(())
    }

    /// Flip the group flag and force every widget to match it, regardless
    /// of each widget's own state. Returns the new "all hidden" flag.
    pub fn toggle_all_visibility(&mut self) -> bool {
        self.all_hidden = !self.all_hidden;
        let visible = !self.all_hidden;
        for window in self.widgets_mut() {
            window.set_visible(visible);
        }
        tracing::debug!(all_hidden = self.all_hidden, "group visibility toggled");
        self.all_hidden
    }

    /// Flip one window's visibility from its own current state. The group
    /// flag is not touched. Returns the window's new visibility.
    pub fn toggle_one(&mut self, name: &str) -> Result<bool, OverlayError> {
        let window = self
            .windows
            .get_mut(name)
            .ok_or_else(|| OverlayError::UnknownWindow(name.to_string()))?;
        let visible = !window.is_visible();
        window.set_visible(visible);
        Ok(visible)
    }

    /// Point-in-time `(name, visible)` list of widgets for the management menu.
    pub fn list_with_visibility(&self) -> Vec<(String, bool)> {
        self.windows
            .values()
            .filter(|w| w.role() == WindowRole::Widget)
            .map(|w| (w.name().to_string(), w.is_visible()))
            .collect()
    }

    fn widgets_mut(&mut self) -> impl Iterator<Item = &mut OverlayWindow> {
        self.windows
            .values_mut()
            .filter(|w| w.role() == WindowRole::Widget)
    }
}
