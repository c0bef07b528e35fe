use eframe::egui::{Pos2, Vec2};
use overlay_widgets::dispatch::DispatchQueue;
use overlay_widgets::overlay::{Opacity, OverlayWindow, WindowRole};
use overlay_widgets::payload::{MetricsSample, Payload, PriceQuote};
use overlay_widgets::registry::Registry;
use overlay_widgets::view::{MonitorView, PriceView, WidgetView};
use overlay_widgets::PollError;
use std::thread;

fn metrics(cpu: f32) -> Payload {
    Payload::Metrics(MetricsSample {
        cpu_percent: cpu,
        gpu_percent: 0.0,
        gpu_temp_c: 0.0,
    })
}

fn registry() -> Registry {
    let mut reg = Registry::new(Opacity::DEFAULT);
    reg.register(OverlayWindow::new(
        "Monitor",
        WindowRole::Widget,
        Pos2::ZERO,
        Vec2::new(160.0, 90.0),
        Opacity::DEFAULT,
        WidgetView::Monitor(MonitorView::new()),
    ))
    .unwrap();
    reg.register(OverlayWindow::new(
        "BTC",
        WindowRole::Widget,
        Pos2::ZERO,
        Vec2::new(160.0, 90.0),
        Opacity::DEFAULT,
        WidgetView::Price(PriceView::new("$")),
    ))
    .unwrap();
    reg
}

#[test]
fn per_producer_order_is_preserved() {
    let queue = DispatchQueue::new(10_000);
    let producers: Vec<_> = (0..4)
        .map(|p| {
            let tx = queue.dispatcher();
            thread::spawn(move || {
                for i in 0..500 {
                    tx.post(&format!("w{p}"), Ok(metrics(i as f32)));
                }
            })
        })
        .collect();
    for handle in producers {
        handle.join().unwrap();
    }
    let drained = queue.drain();
    assert_eq!(drained.len(), 2000);
    for p in 0..4 {
        let target = format!("w{p}");
        let seq: Vec<f32> = drained
            .iter()
            .filter(|u| u.target == target)
            .map(|u| match &u.outcome {
                Ok(Payload::Metrics(s)) => s.cpu_percent,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        let expected: Vec<f32> = (0..500).map(|i| i as f32).collect();
        assert_eq!(seq, expected);
    }
}

#[test]
fn drain_renders_and_counts_failures() {
    let queue = DispatchQueue::new(16);
    let mut reg = registry();
    let tx = queue.dispatcher();

    tx.post("Monitor", Ok(metrics(12.34)));
    tx.post("Monitor", Err(PollError::Io("pipe closed".into())));
    tx.post(
        "Monitor",
        Ok(Payload::Price(PriceQuote {
            price: 1.0,
            change_24h: 0.0,
            history: vec![],
        })),
    );
    tx.post("Gone", Ok(metrics(50.0)));

    let stats = queue.drain_into(&mut reg);
    assert_eq!(stats.applied, 1);
    assert_eq!(stats.poll_errors, 1);
    assert_eq!(stats.render_errors, 1);
    assert_eq!(stats.orphaned, 1);
    assert!(queue.is_empty());

    let monitor = reg.get("Monitor").unwrap().view().as_monitor().unwrap();
    assert_eq!(monitor.cpu_text(), "12.3%");
}

#[test]
fn invalid_payload_keeps_last_good_state() {
    let queue = DispatchQueue::new(16);
    let mut reg = registry();
    let tx = queue.dispatcher();
    tx.post(
        "BTC",
        Ok(Payload::Price(PriceQuote {
            price: 42000.0,
            change_24h: 1.3,
            history: vec![1.0, 2.0],
        })),
    );
    tx.post(
        "BTC",
        Ok(Payload::Price(PriceQuote {
            price: f64::NAN,
            change_24h: 3.0,
            history: vec![],
        })),
    );
    let stats = queue.drain_into(&mut reg);
    assert_eq!((stats.applied, stats.render_errors), (1, 1));
    let price = reg.get("BTC").unwrap().view().as_price().unwrap();
    assert_eq!(price.price_text(), "$42,000");
    assert_eq!(price.change_text(), "▲1.3%");
    assert_eq!(price.history(), &[1.0, 2.0]);
}

#[test]
fn backlog_is_capped_per_window() {
    let queue = DispatchQueue::new(3);
    let tx = queue.dispatcher();
    for i in 0..10 {
        tx.post("Monitor", Ok(metrics(i as f32)));
    }
    tx.post("BTC", Err(PollError::Http("timeout".into())));
    assert_eq!(queue.len(), 4);
    assert_eq!(queue.dropped(), 7);

    let mut reg = registry();
    queue.drain_into(&mut reg);
    let monitor = reg.get("Monitor").unwrap().view().as_monitor().unwrap();
    assert_eq!(monitor.cpu_text(), "9.0%");
}
