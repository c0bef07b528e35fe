use criterion::{criterion_group, criterion_main, Criterion};
use eframe::egui::{Pos2, Vec2};
use overlay_widgets::dispatch::DispatchQueue;
use overlay_widgets::overlay::{Opacity, OverlayWindow, WindowRole};
use overlay_widgets::payload::{MetricsSample, Payload};
use overlay_widgets::registry::Registry;
use overlay_widgets::view::{MonitorView, WidgetView};

fn bench_drain(c: &mut Criterion) {
    let names: Vec<String> = (0..8).map(|i| format!("Monitor{i}")).collect();
    let mut registry = Registry::new(Opacity::DEFAULT);
    for name in &names {
        registry
            .register(OverlayWindow::new(
                name.clone(),
                WindowRole::Widget,
                Pos2::ZERO,
                Vec2::new(160.0, 90.0),
                Opacity::DEFAULT,
                WidgetView::Monitor(MonitorView::new()),
            ))
            .unwrap();
    }
    let queue = DispatchQueue::new(64);
    let tx = queue.dispatcher();
    c.bench_function("post_and_drain_512", |b| {
        b.iter(|| {
            for i in 0..512 {
                tx.post(
                    &names[i % names.len()],
                    Ok(Payload::Metrics(MetricsSample {
                        cpu_percent: i as f32 % 100.0,
                        gpu_percent: 0.0,
                        gpu_temp_c: 0.0,
                    })),
                );
            }
            queue.drain_into(&mut registry)
        })
    });
}

criterion_group!(benches, bench_drain);
criterion_main!(benches);
