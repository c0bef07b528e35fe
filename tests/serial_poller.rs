use overlay_widgets::dispatch::DispatchQueue;
use overlay_widgets::payload::{LinkStatus, Payload};
use overlay_widgets::poller::serial::{Connector, SerialCommand, SerialLink, SerialPoller};
use overlay_widgets::poller::{self, Cadence, Poller, StopSignal};
use overlay_widgets::settings::SerialSettings;
use overlay_widgets::PollError;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

type Replies = Arc<Mutex<VecDeque<io::Result<Option<String>>>>>;

#[derive(Clone, Default)]
struct Device {
    attempts: Arc<Mutex<Vec<Instant>>>,
    written: Arc<Mutex<Vec<String>>>,
    replies: Replies,
    online: Arc<Mutex<bool>>,
}

impl Device {
    fn online() -> Self {
        let dev = Self::default();
        *dev.online.lock().unwrap() = true;
        dev
    }

    fn reply(&self, r: io::Result<Option<String>>) {
        self.replies.lock().unwrap().push_back(r);
    }

    fn written(&self) -> Vec<String> {
        self.written.lock().unwrap().clone()
    }

    fn attempts(&self) -> Vec<Instant> {
        self.attempts.lock().unwrap().clone()
    }
}

struct FakeLink(Device);

impl SerialLink for FakeLink {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.0.written.lock().unwrap().push(line.to_string());
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        self.0.replies.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }
}

impl Connector for Device {
    fn connect(&mut self) -> Result<Box<dyn SerialLink>, PollError> {
        self.attempts.lock().unwrap().push(Instant::now());
        if *self.online.lock().unwrap() {
            Ok(Box::new(FakeLink(self.clone())))
        } else {
            Err(PollError::Connect("COM3: not found".into()))
        }
    }
}

fn settings() -> SerialSettings {
    SerialSettings {
        settle_secs: 0.0,
        ..SerialSettings::default()
    }
}

#[test]
fn failed_connect_holds_off_for_five_seconds() {
    let dev = Device::default();
    let mut poller = SerialPoller::new(SerialSettings::default(), dev.clone());
    let signal = StopSignal::new();

    let first = poller.cycle(&signal);
    assert!(first
        .outcomes
        .iter()
        .any(|o| matches!(o, Err(PollError::Connect(_)))));
    assert!(first
        .outcomes
        .contains(&Ok(Payload::Link(LinkStatus::Disconnected))));
    match first.next {
        Cadence::After(d) => assert!(d >= Duration::from_millis(4500) && d <= Duration::from_secs(5)),
        Cadence::Idle => panic!("serial poller never idles"),
    }

    // An early wake-up must not trigger another attempt.
    let second = poller.cycle(&signal);
    assert!(second.outcomes.is_empty());
    assert_eq!(dev.attempts().len(), 1);
    match second.next {
        Cadence::After(d) => assert!(d > Duration::from_millis(4000)),
        Cadence::Idle => panic!("serial poller never idles"),
    }
}

#[test]
fn reconnect_spacing_survives_nudges() {
    let dev = Device::default();
    let poller = SerialPoller::new(
        SerialSettings {
            reconnect_secs: 0.2,
            ..settings()
        },
        dev.clone(),
    );
    let queue = DispatchQueue::new(64);
    let handle = poller::spawn("Arduino", poller, queue.dispatcher()).unwrap();

    let until = Instant::now() + Duration::from_millis(900);
    while Instant::now() < until {
        handle.nudge();
        thread::sleep(Duration::from_millis(20));
    }
    assert!(handle.stop_and_join(Duration::from_secs(2)));

    let attempts = dev.attempts();
    assert!(attempts.len() >= 2, "only {} attempts", attempts.len());
    for pair in attempts.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= Duration::from_millis(180), "attempts {gap:?} apart");
    }
}

#[test]
fn connected_cycle_syncs_clock_then_requests_data() {
    let dev = Device::online();
    dev.reply(Ok(Some("22.5,40,1,08:30,0".into())));
    dev.reply(Ok(Some("22.7,41,1,08:31,1".into())));
    let mut poller = SerialPoller::new(settings(), dev.clone());
    let signal = StopSignal::new();

    let first = poller.cycle(&signal);
    assert_eq!(first.outcomes[0], Ok(Payload::Link(LinkStatus::Connected)));
    match &first.outcomes[1] {
        Ok(Payload::Climate(r)) => {
            assert_eq!(r.temperature, 22.5);
            assert!(r.power_on && !r.manual);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(first.next, Cadence::After(Duration::from_secs(1)));

    let second = poller.cycle(&signal);
    assert!(matches!(&second.outcomes[..], [Ok(Payload::Climate(r))] if r.manual));

    let written = dev.written();
    assert_eq!(written.len(), 3);
    assert!(written[0].starts_with("H:"));
    assert_eq!(written[0].split(':').count(), 3);
    assert_eq!(&written[1..], ["D", "D"]);
}

#[test]
fn short_line_is_skipped_without_dropping_the_link() {
    let dev = Device::online();
    dev.reply(Ok(Some("22.5,40".into())));
    dev.reply(Ok(None));
    let mut poller = SerialPoller::new(settings(), dev.clone());
    let signal = StopSignal::new();

    let cycle = poller.cycle(&signal);
    assert_eq!(
        cycle.outcomes.last(),
        Some(&Err(PollError::ShortLine { fields: 2 }))
    );
    assert!(poller.is_connected());

    // A read timeout produces nothing at all.
    assert!(poller.cycle(&signal).outcomes.is_empty());
    assert_eq!(dev.attempts().len(), 1);
}

#[test]
fn io_error_drops_link_and_reconnects() {
    let dev = Device::online();
    dev.reply(Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged")));
    dev.reply(Ok(Some("20.0,50,0,10:00,0".into())));
    let mut poller = SerialPoller::new(settings(), dev.clone());
    let signal = StopSignal::new();

    let broken = poller.cycle(&signal);
    assert!(!poller.is_connected());
    assert!(broken.outcomes.iter().any(|o| matches!(o, Err(PollError::Io(_)))));
    assert_eq!(
        broken.outcomes.last(),
        Some(&Ok(Payload::Link(LinkStatus::Disconnected)))
    );

    let back = poller.cycle(&signal);
    assert!(poller.is_connected());
    assert_eq!(dev.attempts().len(), 2);
    assert_eq!(back.outcomes[0], Ok(Payload::Link(LinkStatus::Connected)));
    assert!(matches!(back.outcomes[1], Ok(Payload::Climate(_))));
}

#[test]
fn commands_go_out_when_connected_and_are_dropped_otherwise() {
    let dev = Device::default();
    let mut poller = SerialPoller::new(
        SerialSettings {
            reconnect_secs: 0.0,
            ..settings()
        },
        dev.clone(),
    );
    let commander = poller.commander();
    let signal = StopSignal::new();

    commander.send(SerialCommand::On);
    poller.cycle(&signal);
    assert!(dev.written().is_empty());

    *dev.online.lock().unwrap() = true;
    poller.cycle(&signal);
    assert!(!dev.written().contains(&"ON".to_string()));

    commander.send(SerialCommand::Auto);
    poller.cycle(&signal);
    let written = dev.written();
    let auto = written.iter().position(|l| l == "AUTO").unwrap();
    assert_eq!(written[auto + 1], "D");
}

#[test]
fn commander_wakes_the_poller() {
    let dev = Device::online();
    let poller = SerialPoller::new(
        SerialSettings {
            poll_secs: 30.0,
            ..settings()
        },
        dev.clone(),
    );
    let commander = poller.commander();
    let queue = DispatchQueue::new(64);
    let handle = poller::spawn("Arduino", poller, queue.dispatcher()).unwrap();
    let commander = commander.waking(handle.signal().clone());

    let deadline = Instant::now() + Duration::from_secs(5);
    while !dev.written().contains(&"D".to_string()) && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    commander.send(SerialCommand::Off);
    let deadline = Instant::now() + Duration::from_secs(5);
    while !dev.written().contains(&"OFF".to_string()) && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    assert!(dev.written().contains(&"OFF".to_string()));
    assert!(handle.stop_and_join(Duration::from_secs(2)));
}
