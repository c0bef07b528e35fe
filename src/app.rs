use crate::dispatch::{DispatchQueue, DrainStats};
use crate::layout::{Cell, Placement};
use crate::notes::NotesStore;
use crate::overlay::{Opacity, OverlayWindow, WindowRole};
use crate::poller::{Poller, Supervisor};
use crate::registry::Registry;
use crate::settings::Settings;
use crate::view::{
    ClimateView, ClockView, ControlView, LauncherView, LexiconView, MonitorView, NotesView,
    PriceView, UiAction, WidgetView,
};
use std::time::Duration;

pub const ARDUINO: &str = "Arduino";
pub const MONITOR: &str = "Monitor";
pub const NOTES: &str = "Notes";
pub const LAUNCHER: &str = "Launcher";
pub const LEXICON: &str = "Lexicon";
pub const CLOCK: &str = "Clock";
pub const SETTINGS: &str = "Settings";

/// How long shutdown waits for pollers blocked in I/O.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Initial placement of every window, in creation order.
///
/// Column 0 stacks the serial widget, the price widgets and the monitor
/// from the bottom up; column 1 holds notes, launcher, lexicon and clock.
/// The settings bar sits above the monitor.
pub fn plan(settings: &Settings) -> Vec<(String, Placement)> {
    let layout = &settings.layout;
    let mut out = vec![(ARDUINO.to_string(), layout.place(Cell::new(0, 0)))];
    for (i, price) in settings.prices.iter().enumerate() {
        out.push((price.name.clone(), layout.place(Cell::new(0, i + 1))));
    }
    let monitor = Cell::new(0, settings.prices.len() + 1);
    out.push((MONITOR.to_string(), layout.place(monitor)));
    for (row, name) in [NOTES, LAUNCHER, LEXICON, CLOCK].into_iter().enumerate() {
        out.push((name.to_string(), layout.place(Cell::new(1, row))));
    }
    out.push((SETTINGS.to_string(), layout.place_control_above(monitor)));
    out
}

/// Owns the windows, the dispatch queue and the pollers feeding them.
pub struct AppRoot {
    settings: Settings,
    registry: Registry,
    queue: DispatchQueue,
    supervisor: Supervisor,
    running: bool,
}

impl AppRoot {
    /// Create every window at its initial position. No poller runs yet.
    pub fn assemble(settings: &Settings) -> anyhow::Result<Self> {
        settings.validate()?;
        let opacity = Opacity::new(settings.opacity)?;
        let mut registry = Registry::new(opacity);
        for (name, placement) in plan(settings) {
            let (role, view) = Self::view_for(settings, &name, opacity);
            registry.register(OverlayWindow::new(
                name,
                role,
                placement.position,
                placement.size,
                opacity,
                view,
            ))?;
        }
        tracing::info!(windows = registry.len(), "windows created");
        Ok(Self {
            settings: settings.clone(),
            registry,
            queue: DispatchQueue::new(settings.dispatch_cap_per_window),
            supervisor: Supervisor::new(),
            running: true,
        })
    }

    /// [`AppRoot::assemble`] followed by [`AppRoot::start_pollers`].
    pub fn build(settings: &Settings) -> anyhow::Result<Self> {
        let mut root = Self::assemble(settings)?;
        root.start_pollers();
        Ok(root)
    }

    fn view_for(settings: &Settings, name: &str, opacity: Opacity) -> (WindowRole, WidgetView) {
        let view = match name {
            ARDUINO => WidgetView::Climate(ClimateView::new()),
            MONITOR => WidgetView::Monitor(MonitorView::new()),
            NOTES => WidgetView::Notes(Self::notes_view(settings)),
            LAUNCHER => WidgetView::Launcher(LauncherView::new(settings.launcher_links.clone())),
            LEXICON => WidgetView::Lexicon(LexiconView::new()),
            CLOCK => WidgetView::Clock(ClockView),
            SETTINGS => {
                return (
                    WindowRole::Control,
                    WidgetView::Control(ControlView::new(opacity)),
                )
            }
            price => {
                let symbol = settings
                    .prices
                    .iter()
                    .find(|p| p.name == price)
                    .map(|p| p.symbol.clone())
                    .unwrap_or_default();
                WidgetView::Price(PriceView::new(symbol))
            }
        };
        (WindowRole::Widget, view)
    }

    fn notes_view(settings: &Settings) -> NotesView {
        let store = NotesStore::new(&settings.notes_path);
        let text = store.load().unwrap_or_else(|err| {
            tracing::warn!(?err, "failed to load notes");
            String::new()
        });
        let writer = match store.spawn_writer() {
            Ok(writer) => Some(writer),
            Err(err) => {
                tracing::error!(?err, "notes will not be saved");
                None
            }
        };
        NotesView::new(text, writer)
    }

    /// Start one poller per data-driven window.
    pub fn start_pollers(&mut self) {
        self.start_serial();
        self.start_prices();
        self.start_lexicon();
        self.start_metrics();
        tracing::info!(pollers = self.supervisor.len(), "pollers started");
    }

    /// Run `poller` for the window `target`. Returns false when the window
    /// does not exist or the thread could not be spawned.
    pub fn attach<P: Poller>(&mut self, target: &str, poller: P) -> bool {
        if !self.registry.contains(target) {
            tracing::warn!(window = %target, "no such window; poller not started");
            return false;
        }
        match self
            .supervisor
            .start(target, poller, self.queue.dispatcher())
        {
            Ok(_) => true,
            Err(err) => {
                tracing::error!(window = %target, ?err, "failed to spawn poller");
                false
            }
        }
    }

    #[cfg(feature = "serial")]
    fn start_serial(&mut self) {
        use crate::poller::serial::{PortConnector, SerialPoller};
        let serial = &self.settings.serial;
        let poller = SerialPoller::new(
            serial.clone(),
            PortConnector::new(serial.port.clone(), serial.baud),
        );
        let commander = poller.commander();
        if !self.attach(ARDUINO, poller) {
            return;
        }
        let Some(handle) = self.supervisor.get(ARDUINO) else {
            return;
        };
        let commander = commander.waking(handle.signal().clone());
        if let Some(view) = self
            .registry
            .get_mut(ARDUINO)
            .and_then(|w| w.view_mut().as_climate_mut())
        {
            view.set_commander(commander);
        }
    }

    #[cfg(not(feature = "serial"))]
    fn start_serial(&mut self) {
        use crate::payload::SourceKind;
        use crate::poller::UnavailablePoller;
        self.attach(ARDUINO, UnavailablePoller::new(SourceKind::Serial));
    }

    #[cfg(feature = "http")]
    fn start_prices(&mut self) {
        use crate::poller::http::PriceSource;
        let interval = crate::poller::secs(self.settings.price_interval_secs);
        for price in self.settings.prices.clone() {
            match PriceSource::new(&self.settings.price_api_base, &price, interval) {
                Ok(source) => {
                    self.attach(&price.name, source);
                }
                Err(err) => tracing::error!(window = %price.name, %err, "price source unusable"),
            }
        }
    }

    #[cfg(not(feature = "http"))]
    fn start_prices(&mut self) {
        use crate::payload::SourceKind;
        use crate::poller::UnavailablePoller;
        for price in self.settings.prices.clone() {
            self.attach(&price.name, UnavailablePoller::new(SourceKind::Http));
        }
    }

    #[cfg(feature = "http")]
    fn start_lexicon(&mut self) {
        use crate::poller::http::LexiconSource;
        match LexiconSource::new(&self.settings.lexicon) {
            Ok(source) => {
                self.attach(LEXICON, source);
            }
            Err(err) => tracing::error!(%err, "lexicon source unusable"),
        }
    }

    #[cfg(not(feature = "http"))]
    fn start_lexicon(&mut self) {
        use crate::payload::SourceKind;
        use crate::poller::UnavailablePoller;
        self.attach(LEXICON, UnavailablePoller::new(SourceKind::Http));
    }

    #[cfg(feature = "metrics")]
    fn start_metrics(&mut self) {
        use crate::poller::metrics::{GpuProbe, LocalMetricSource};
        let source = LocalMetricSource::new(
            GpuProbe::new(self.settings.gpu_command.clone()),
            Duration::from_millis(self.settings.metrics_interval_ms),
        );
        self.attach(MONITOR, source);
    }

    #[cfg(not(feature = "metrics"))]
    fn start_metrics(&mut self) {
        use crate::payload::SourceKind;
        use crate::poller::UnavailablePoller;
        self.attach(MONITOR, UnavailablePoller::new(SourceKind::LocalMetric));
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn queue(&self) -> &DispatchQueue {
        &self.queue
    }

    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    /// False once `Close All` was requested.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Render every pending poll result. Called once per UI tick.
    pub fn pump(&mut self) -> DrainStats {
        self.queue.drain_into(&mut self.registry)
    }

    pub fn apply(&mut self, action: UiAction) {
        match action {
            UiAction::SetGlobalOpacity(value) => {
                if let Err(err) = self.registry.set_global_opacity(value) {
                    tracing::warn!(%err, "opacity change rejected");
                }
            }
            UiAction::ToggleAll => {
                self.registry.toggle_all_visibility();
            }
            UiAction::ToggleOne(name) => {
                if let Err(err) = self.registry.toggle_one(&name) {
                    tracing::warn!(%err, "visibility toggle ignored");
                }
            }
            UiAction::Refresh(name) => {
                if !self.supervisor.nudge(&name) {
                    tracing::debug!(window = %name, "no poller to refresh");
                }
            }
            UiAction::Close(name) => {
                self.close_window(&name);
            }
            UiAction::CloseAll => self.close_all(),
        }
    }

    /// Stop the window's poller and detach it from the registry.
    pub fn close_window(&mut self, name: &str) -> bool {
        self.supervisor.stop(name);
        let removed = self.registry.remove(name).is_some();
        if removed {
            tracing::info!(window = %name, "window closed");
        }
        removed
    }

    /// Stop every poller and end the UI loop.
    pub fn close_all(&mut self) {
        tracing::info!("closing all windows");
        self.shutdown();
    }

    pub fn shutdown(&mut self) {
        if !self.supervisor.is_empty() {
            self.supervisor.shutdown(SHUTDOWN_GRACE);
        }
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_places_monitor_above_prices() {
        let settings = Settings::default();
        let plan = plan(&settings);
        let names: Vec<_> = plan.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                ARDUINO, "BTC", "USDT", MONITOR, NOTES, LAUNCHER, LEXICON, CLOCK, SETTINGS
            ]
        );
        let at = |name: &str| plan.iter().find(|(n, _)| n == name).map(|(_, p)| *p).unwrap();
        assert_eq!(at(MONITOR).position, settings.layout.cell_position(Cell::new(0, 3)));
        assert_eq!(at(SETTINGS).position.x, at(MONITOR).position.x);
        assert_eq!(
            at(SETTINGS).position.y,
            at(MONITOR).position.y - settings.layout.gap - settings.layout.control_height
        );
    }

    #[test]
    fn extra_price_pushes_monitor_up() {
        let mut settings = Settings::default();
        let mut extra = settings.prices[0].clone();
        extra.name = "ETH".into();
        extra.coin_id = "ethereum".into();
        settings.prices.push(extra);
        let plan = plan(&settings);
        let monitor = plan.iter().find(|(n, _)| n == MONITOR).unwrap().1;
        assert_eq!(monitor.position, settings.layout.cell_position(Cell::new(0, 4)));
    }
}
