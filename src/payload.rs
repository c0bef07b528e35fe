use std::fmt;

/// Kind of background source feeding a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Serial,
    Http,
    LocalMetric,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Serial => write!(f, "serial"),
            SourceKind::Http => write!(f, "http"),
            SourceKind::LocalMetric => write!(f, "local-metric"),
        }
    }
}

/// Connection state of the serial device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Connected,
    Disconnected,
}

/// One reading from the climate controller on the serial port.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateReading {
    pub temperature: f32,
    pub humidity: f32,
    pub power_on: bool,
    pub manual: bool,
}

/// Spot price, 24h change and 24h history for one asset pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    pub price: f64,
    pub change_24h: f64,
    pub history: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    pub word: String,
    pub definition: String,
}

/// CPU load plus the external GPU query. GPU values are zero when the query
/// failed or is not installed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsSample {
    pub cpu_percent: f32,
    pub gpu_percent: f32,
    pub gpu_temp_c: f32,
}

/// Data produced by a poller and consumed by exactly one window.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Link(LinkStatus),
    Climate(ClimateReading),
    Price(PriceQuote),
    Word(WordEntry),
    Metrics(MetricsSample),
    /// The capability behind this source was not compiled in.
    Unavailable(SourceKind),
}

impl Payload {
    pub fn shape(&self) -> &'static str {
        match self {
            Payload::Link(_) => "link",
            Payload::Climate(_) => "climate",
            Payload::Price(_) => "price",
            Payload::Word(_) => "word",
            Payload::Metrics(_) => "metrics",
            Payload::Unavailable(_) => "unavailable",
        }
    }
}
