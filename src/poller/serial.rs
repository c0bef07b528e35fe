//! Climate controller on a serial line.
//!
//! Line protocol, one ASCII command per line: `ON`, `OFF`, `AUTO`,
//! `H:<hour>:<minute>` (clock sync) and `D` (data request). Each `D` is
//! answered with `temperature,humidity,isOn,HH:MM,isManual`.

use super::{secs, Cadence, Cycle, Poller, StopSignal, Wake, MAX_INTERVAL};
use crate::error::PollError;
use crate::payload::{ClimateReading, LinkStatus, Payload, SourceKind};
use crate::settings::SerialSettings;
use chrono::Timelike;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

/// Read timeout on the port.
pub const READ_TIMEOUT: Duration = Duration::from_millis(500);

/// One-shot commands raised by the climate widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialCommand {
    On,
    Off,
    Auto,
}

impl SerialCommand {
    pub fn as_line(self) -> &'static str {
        match self {
            SerialCommand::On => "ON",
            SerialCommand::Off => "OFF",
            SerialCommand::Auto => "AUTO",
        }
    }
}

/// UI-side sender for [`SerialCommand`]s. Commands are written by the
/// poller on its next cycle and silently dropped while disconnected.
#[derive(Debug, Clone)]
pub struct SerialCommander {
    tx: Sender<SerialCommand>,
    wake: Option<StopSignal>,
}

impl SerialCommander {
    /// Wake the poller on every send so the command goes out immediately.
    pub fn waking(mut self, signal: StopSignal) -> Self {
        self.wake = Some(signal);
        self
    }

    pub fn send(&self, cmd: SerialCommand) {
        if self.tx.send(cmd).is_err() {
            tracing::debug!(command = cmd.as_line(), "serial poller gone; command dropped");
            return;
        }
        if let Some(signal) = &self.wake {
            signal.nudge();
        }
    }
}

/// An open, exclusive connection to the device.
pub trait SerialLink: Send {
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Next complete line with surrounding whitespace trimmed, or `None`
    /// when nothing arrived within the read timeout.
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// Opens [`SerialLink`]s. Swapped for a fake in tests.
pub trait Connector: Send + 'static {
    fn connect(&mut self) -> Result<Box<dyn SerialLink>, PollError>;
}

#[cfg(feature = "serial")]
pub use port::PortConnector;

#[cfg(feature = "serial")]
mod port {
    use super::{Connector, SerialLink, READ_TIMEOUT};
    use crate::error::PollError;
    use std::io::{self, Read, Write};
    use std::time::Instant;

    /// Real serial port through the `serialport` crate.
    pub struct PortConnector {
        port: String,
        baud: u32,
    }

    impl PortConnector {
        pub fn new(port: impl Into<String>, baud: u32) -> Self {
            Self {
                port: port.into(),
                baud,
            }
        }
    }

    impl Connector for PortConnector {
        fn connect(&mut self) -> Result<Box<dyn SerialLink>, PollError> {
            let port = serialport::new(&self.port, self.baud)
                .timeout(READ_TIMEOUT)
                .open()
                .map_err(|e| PollError::Connect(format!("{}: {e}", self.port)))?;
            Ok(Box::new(PortLink {
                port,
                pending: Vec::new(),
            }))
        }
    }

    struct PortLink {
        port: Box<dyn serialport::SerialPort>,
        pending: Vec<u8>,
    }

    impl SerialLink for PortLink {
        fn write_line(&mut self, line: &str) -> io::Result<()> {
            self.port.write_all(line.as_bytes())?;
            self.port.write_all(b"\n")?;
            self.port.flush()
        }

        fn read_line(&mut self) -> io::Result<Option<String>> {
            let deadline = Instant::now() + READ_TIMEOUT;
            let mut buf = [0u8; 64];
            loop {
                if let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
                    let line: Vec<u8> = self.pending.drain(..=pos).collect();
                    return Ok(Some(String::from_utf8_lossy(&line).trim().to_string()));
                }
                if Instant::now() >= deadline {
                    return Ok(None);
                }
                match self.port.read(&mut buf) {
                    Ok(0) => {
                        return Err(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            "serial port closed",
                        ))
                    }
                    Ok(n) => self.pending.extend_from_slice(&buf[..n]),
                    Err(e) if e.kind() == io::ErrorKind::TimedOut => return Ok(None),
                    Err(e) => return Err(e),
                }
            }
        }
    }
}

/// Parse one data line. Fewer than four fields is reported as
/// [`PollError::ShortLine`] and the reading is skipped. The manual flag is
/// only read from a line of exactly five fields.
pub fn parse_line(line: &str) -> Result<ClimateReading, PollError> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() < 4 {
        return Err(PollError::ShortLine {
            fields: parts.len(),
        });
    }
    let temperature = parts[0]
        .parse::<f32>()
        .map_err(|e| PollError::Parse(format!("temperature `{}`: {e}", parts[0])))?;
    let humidity = parts[1]
        .parse::<f32>()
        .map_err(|e| PollError::Parse(format!("humidity `{}`: {e}", parts[1])))?;
    Ok(ClimateReading {
        temperature,
        humidity,
        power_on: parts[2] == "1",
        manual: parts.len() == 5 && parts[4] == "1",
    })
}

pub struct SerialPoller {
    settings: SerialSettings,
    connector: Box<dyn Connector>,
    link: Option<Box<dyn SerialLink>>,
    next_connect_at: Instant,
    last_sync: Option<Instant>,
    reported: Option<LinkStatus>,
    tx: Sender<SerialCommand>,
    rx: Receiver<SerialCommand>,
}

impl SerialPoller {
    pub fn new(settings: SerialSettings, connector: impl Connector) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            settings,
            connector: Box::new(connector),
            link: None,
            next_connect_at: Instant::now(),
            last_sync: None,
            reported: None,
            tx,
            rx,
        }
    }

    pub fn commander(&self) -> SerialCommander {
        SerialCommander {
            tx: self.tx.clone(),
            wake: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    fn report(&mut self, status: LinkStatus, outcomes: &mut Vec<Result<Payload, PollError>>) {
        if self.reported != Some(status) {
            self.reported = Some(status);
            tracing::info!(port = %self.settings.port, ?status, "serial link changed");
            outcomes.push(Ok(Payload::Link(status)));
        }
    }

    fn discard_commands(&self) {
        for cmd in self.rx.try_iter() {
            tracing::debug!(command = cmd.as_line(), "serial link down; command dropped");
        }
    }

    /// Attempt a connection. On failure the next attempt is held back for
    /// the reconnect delay, whatever wakes the poller in between.
    fn connect(
        &mut self,
        signal: &StopSignal,
        outcomes: &mut Vec<Result<Payload, PollError>>,
    ) -> bool {
        match self.connector.connect() {
            Ok(link) => {
                if !settle(signal, secs(self.settings.settle_secs).min(MAX_INTERVAL)) {
                    return false;
                }
                self.link = Some(link);
                self.last_sync = None;
                self.report(LinkStatus::Connected, outcomes);
                true
            }
            Err(err) => {
                let now = Instant::now();
                let delay = secs(self.settings.reconnect_secs).min(MAX_INTERVAL);
                self.next_connect_at = now.checked_add(delay).unwrap_or(now);
                outcomes.push(Err(err));
                self.report(LinkStatus::Disconnected, outcomes);
                false
            }
        }
    }

    fn exchange(&mut self) -> Result<Option<Result<Payload, PollError>>, io::Error> {
        let Some(link) = self.link.as_mut() else {
            return Ok(None);
        };
        for cmd in self.rx.try_iter() {
            tracing::debug!(command = cmd.as_line(), "serial command sent");
            link.write_line(cmd.as_line())?;
        }
        let sync = secs(self.settings.sync_secs);
        if self.last_sync.map_or(true, |at| at.elapsed() >= sync) {
            let now = chrono::Local::now();
            link.write_line(&format!("H:{}:{}", now.hour(), now.minute()))?;
            self.last_sync = Some(Instant::now());
        }
        link.write_line("D")?;
        let line = match link.read_line()? {
            Some(line) if !line.is_empty() => line,
            _ => return Ok(None),
        };
        Ok(Some(parse_line(&line).map(Payload::Climate)))
    }
}

/// Sleep through the device's reset delay. Nudges do not shorten it.
fn settle(signal: &StopSignal, delay: Duration) -> bool {
    let deadline = Instant::now() + delay;
    loop {
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return true;
        }
        if signal.wait(left) == Wake::Stopped {
            return false;
        }
    }
}

impl Poller for SerialPoller {
    fn kind(&self) -> SourceKind {
        SourceKind::Serial
    }

    fn cycle(&mut self, signal: &StopSignal) -> Cycle {
        let poll = secs(self.settings.poll_secs);
        let mut outcomes = Vec::new();
        if self.link.is_none() {
            let now = Instant::now();
            if now < self.next_connect_at {
                self.discard_commands();
                return Cycle::silent(self.next_connect_at - now);
            }
            if !self.connect(signal, &mut outcomes) {
                self.discard_commands();
                let wait = self.next_connect_at.saturating_duration_since(Instant::now());
                return Cycle::new(outcomes, Cadence::After(wait));
            }
        }
        match self.exchange() {
            Ok(Some(outcome)) => outcomes.push(outcome),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(port = %self.settings.port, error = %err, "serial exchange failed");
                self.link = None;
                outcomes.push(Err(err.into()));
                self.report(LinkStatus::Disconnected, &mut outcomes);
            }
        }
        Cycle::new(outcomes, Cadence::After(poll))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_line() {
        let r = parse_line("22.5,40,1,08:30,1").unwrap();
        assert_eq!(r.temperature, 22.5);
        assert_eq!(r.humidity, 40.0);
        assert!(r.power_on);
        assert!(r.manual);
    }

    #[test]
    fn four_fields_is_enough() {
        let r = parse_line("19.0,55,0,23:59").unwrap();
        assert!(!r.power_on);
        assert!(!r.manual);
    }

    #[test]
    fn manual_flag_needs_exactly_five_fields() {
        assert!(!parse_line("22.5,40,1,08:30,1,0").unwrap().manual);
        assert!(parse_line("22.5,40,1,08:30,1").unwrap().manual);
    }

    #[test]
    fn short_and_garbled_lines_are_errors() {
        assert_eq!(parse_line("22.5,40"), Err(PollError::ShortLine { fields: 2 }));
        assert!(matches!(parse_line("x,40,1,00:00"), Err(PollError::Parse(_))));
    }

    #[test]
    fn command_lines() {
        assert_eq!(SerialCommand::On.as_line(), "ON");
        assert_eq!(SerialCommand::Off.as_line(), "OFF");
        assert_eq!(SerialCommand::Auto.as_line(), "AUTO");
    }
}
