use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

#[cfg(feature = "metrics")]
pub use local::LocalMetricSource;

/// Hard limit on one GPU query.
pub const GPU_TIMEOUT: Duration = Duration::from_secs(1);

/// Parse `"<utilization>, <temperature>"`. A missing temperature reads as 0.
pub fn parse_gpu_line(output: &str) -> Option<(f32, f32)> {
    let line = output.lines().next()?.trim();
    let mut parts = line.split(',').map(str::trim);
    let util = parts.next()?.parse::<f32>().ok()?;
    let temp = match parts.next() {
        Some(t) => t.parse::<f32>().ok()?,
        None => 0.0,
    };
    Some((util, temp))
}

/// Runs the external GPU query command.
#[derive(Debug, Clone)]
pub struct GpuProbe {
    argv: Vec<String>,
    timeout: Duration,
}

impl GpuProbe {
    pub fn new(argv: Vec<String>) -> Self {
        Self {
            argv,
            timeout: GPU_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Utilization and temperature, or `(0, 0)` on any failure.
    pub fn query(&self) -> (f32, f32) {
        match self.run() {
            Some(out) => parse_gpu_line(&out).unwrap_or_else(|| {
                tracing::trace!(output = %out, "unparseable gpu query output");
                (0.0, 0.0)
            }),
            None => (0.0, 0.0),
        }
    }

    fn run(&self) -> Option<String> {
        let (program, args) = self.argv.split_first()?;
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            cmd.creation_flags(0x08000000); // CREATE_NO_WINDOW
        }
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                tracing::trace!(program = %program, error = %err, "gpu query not started");
                return None;
            }
        };
        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) if status.success() => break,
                Ok(Some(_)) => return None,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    tracing::debug!(program = %program, "gpu query timed out");
                    return None;
                }
                Ok(None) => std::thread::sleep(Duration::from_millis(10)),
                Err(_) => return None,
            }
        }
        let mut out = String::new();
        child.stdout.take()?.read_to_string(&mut out).ok()?;
        Some(out)
    }
}

#[cfg(feature = "metrics")]
mod local {
    use super::GpuProbe;
    use crate::payload::{MetricsSample, Payload, SourceKind};
    use crate::poller::{Cycle, Poller, StopSignal};
    use std::time::{Duration, Instant};
    use sysinfo::System;

    /// CPU load through `sysinfo` plus the GPU probe, on a fixed cadence.
    pub struct LocalMetricSource {
        system: System,
        gpu: GpuProbe,
        interval: Duration,
    }

    impl LocalMetricSource {
        pub fn new(gpu: GpuProbe, interval: Duration) -> Self {
            let mut system = System::new();
            // The first reading only establishes the baseline.
            system.refresh_cpu_usage();
            Self {
                system,
                gpu,
                interval,
            }
        }

        pub fn sample(&mut self) -> MetricsSample {
            self.system.refresh_cpu_usage();
            let cpu_percent = self.system.global_cpu_usage();
            let (gpu_percent, gpu_temp_c) = self.gpu.query();
            MetricsSample {
                cpu_percent,
                gpu_percent,
                gpu_temp_c,
            }
        }
    }

    impl Poller for LocalMetricSource {
        fn kind(&self) -> SourceKind {
            SourceKind::LocalMetric
        }

        fn cycle(&mut self, _signal: &StopSignal) -> Cycle {
            let started = Instant::now();
            let sample = self.sample();
            Cycle::single(
                Ok(Payload::Metrics(sample)),
                self.interval.saturating_sub(started.elapsed()),
            )
        }
    }
}
