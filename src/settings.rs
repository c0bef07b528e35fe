use crate::overlay::Opacity;
use crate::poller::{MAX_INTERVAL, MIN_INTERVAL};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Serial device the climate widget talks to.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SerialSettings {
    pub port: String,
    pub baud: u32,
    /// Delay before retrying after a failed connect.
    pub reconnect_secs: f32,
    /// Interval between `H:<hour>:<minute>` clock syncs.
    pub sync_secs: f32,
    /// Interval between data requests.
    pub poll_secs: f32,
    /// Wait after opening the port while the board resets.
    pub settle_secs: f32,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: "COM3".into(),
            baud: 9600,
            reconnect_secs: 5.0,
            sync_secs: 15.0,
            poll_secs: 1.0,
            settle_secs: 2.0,
        }
    }
}

/// One price widget.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PriceSettings {
    /// Window name, also shown in the management menu.
    pub name: String,
    pub coin_id: String,
    pub vs_currency: String,
    #[serde(default = "default_symbol")]
    pub symbol: String,
}

fn default_symbol() -> String {
    "$".into()
}

fn default_prices() -> Vec<PriceSettings> {
    vec![
        PriceSettings {
            name: "BTC".into(),
            coin_id: "bitcoin".into(),
            vs_currency: "usd".into(),
            symbol: "$".into(),
        },
        PriceSettings {
            name: "USDT".into(),
            coin_id: "tether".into(),
            vs_currency: "mxn".into(),
            symbol: "$".into(),
        },
    ]
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LexiconSettings {
    /// Returns a JSON array holding one random word.
    pub word_url: String,
    /// The word is appended as a path segment.
    pub dictionary_url: String,
    pub refresh_secs: f32,
}

impl Default for LexiconSettings {
    fn default() -> Self {
        Self {
            word_url: "https://random-word-api.herokuapp.com/word".into(),
            dictionary_url: "https://api.dictionaryapi.dev/api/v2/entries/en".into(),
            refresh_secs: 300.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LauncherLink {
    pub glyph: String,
    /// `#rrggbb` hover colour.
    pub color: String,
    pub url: String,
}

fn default_launcher_links() -> Vec<LauncherLink> {
    [
        ("►", "#ff1744", "https://www.youtube.com"),
        ("✦", "#00e5ff", "https://gemini.google.com"),
        ("gh", "#ffffff", "https://github.com"),
        ("AI", "#00e676", "https://chatgpt.com"),
        ("G", "#4285F4", "https://www.google.com"),
        ("r/", "#ff4500", "https://www.reddit.com"),
    ]
    .into_iter()
    .map(|(glyph, color, url)| LauncherLink {
        glyph: glyph.into(),
        color: color.into(),
        url: url.into(),
    })
    .collect()
}

/// Static placement parameters, used once at startup.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct LayoutSettings {
    pub width: f32,
    pub height: f32,
    pub margin_x: f32,
    pub margin_y: f32,
    pub gap: f32,
    /// Height of the settings bar.
    pub control_height: f32,
    pub screen_height: f32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            width: 160.0,
            height: 90.0,
            margin_x: 80.0,
            margin_y: 80.0,
            gap: 10.0,
            control_height: 32.0,
            screen_height: 1080.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Also write log output to this file.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// Opacity applied to every window at startup.
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub serial: SerialSettings,
    #[serde(default = "default_price_api_base")]
    pub price_api_base: String,
    #[serde(default = "default_prices")]
    pub prices: Vec<PriceSettings>,
    #[serde(default = "default_price_interval")]
    pub price_interval_secs: f32,
    #[serde(default)]
    pub lexicon: LexiconSettings,
    /// Command line for the GPU query. It must print `"<util>, <temp>"`.
    #[serde(default = "default_gpu_command")]
    pub gpu_command: Vec<String>,
    #[serde(default = "default_metrics_interval")]
    pub metrics_interval_ms: u64,
    #[serde(default = "default_notes_path")]
    pub notes_path: PathBuf,
    #[serde(default = "default_launcher_links")]
    pub launcher_links: Vec<LauncherLink>,
    #[serde(default)]
    pub layout: LayoutSettings,
    /// Pending updates kept per window before the oldest are dropped.
    #[serde(default = "default_dispatch_cap")]
    pub dispatch_cap_per_window: usize,
}

fn default_opacity() -> f32 {
    Opacity::DEFAULT.get()
}

fn default_price_api_base() -> String {
    "https://api.coingecko.com/api/v3".into()
}

fn default_price_interval() -> f32 {
    60.0
}

fn default_gpu_command() -> Vec<String> {
    vec![
        "nvidia-smi".into(),
        "--query-gpu=utilization.gpu,temperature.gpu".into(),
        "--format=csv,noheader,nounits".into(),
    ]
}

fn default_metrics_interval() -> u64 {
    1000
}

fn default_notes_path() -> PathBuf {
    PathBuf::from("notes_widget.txt")
}

fn default_dispatch_cap() -> usize {
    64
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            log_file: None,
            opacity: default_opacity(),
            serial: SerialSettings::default(),
            price_api_base: default_price_api_base(),
            prices: default_prices(),
            price_interval_secs: default_price_interval(),
            lexicon: LexiconSettings::default(),
            gpu_command: default_gpu_command(),
            metrics_interval_ms: default_metrics_interval(),
            notes_path: default_notes_path(),
            launcher_links: default_launcher_links(),
            layout: LayoutSettings::default(),
            dispatch_cap_per_window: default_dispatch_cap(),
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing or empty file yields defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(err.into()),
        };
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject settings that would break window invariants before any window
    /// exists.
    pub fn validate(&self) -> anyhow::Result<()> {
        Opacity::new(self.opacity)?;
        let mut seen = HashSet::new();
        for name in self.widget_names() {
            if !seen.insert(name.clone()) {
                anyhow::bail!("duplicate widget name `{name}`");
            }
        }
        if self.gpu_command.is_empty() {
            anyhow::bail!("gpu_command must not be empty");
        }
        if self.dispatch_cap_per_window == 0 {
            anyhow::bail!("dispatch_cap_per_window must be at least 1");
        }
        let serial = &self.serial;
        for (name, value) in [
            ("serial.reconnect_secs", serial.reconnect_secs as f64),
            ("serial.sync_secs", serial.sync_secs as f64),
            ("serial.poll_secs", serial.poll_secs as f64),
            ("price_interval_secs", self.price_interval_secs as f64),
            ("lexicon.refresh_secs", self.lexicon.refresh_secs as f64),
            ("metrics_interval_ms", self.metrics_interval_ms as f64 / 1000.0),
        ] {
            check_interval(name, value, MIN_INTERVAL)?;
        }
        // The board reset wait is a one-off delay, not a cadence.
        check_interval("serial.settle_secs", serial.settle_secs as f64, Duration::ZERO)?;
        Ok(())
    }

    /// Names of every window, in creation order.
    pub fn widget_names(&self) -> Vec<String> {
        let mut names = vec![crate::app::ARDUINO.to_string()];
        names.extend(self.prices.iter().map(|p| p.name.clone()));
        names.extend(
            [
                crate::app::MONITOR,
                crate::app::NOTES,
                crate::app::LAUNCHER,
                crate::app::LEXICON,
                crate::app::CLOCK,
                crate::app::SETTINGS,
            ]
            .into_iter()
            .map(String::from),
        );
        names
    }
}

fn check_interval(name: &str, secs: f64, min: Duration) -> anyhow::Result<()> {
    let (lo, hi) = (min.as_secs_f64(), MAX_INTERVAL.as_secs_f64());
    if !secs.is_finite() || secs < lo || secs > hi {
        anyhow::bail!("{name} must be between {lo} and {hi} seconds, got {secs}");
    }
    Ok(())
}
