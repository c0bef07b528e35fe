use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::EnvFilter;

/// Filter for the given settings flag. With debug logging off the level is
/// pinned to `info` even when `RUST_LOG` is set; with it on, `RUST_LOG`
/// overrides the `debug` default.
pub fn filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    }
}

/// Initialise logging to stderr and, optionally, to `log_file`.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process. Calling this again is a no-op.
pub fn init(debug: bool, log_file: Option<&Path>) -> Option<WorkerGuard> {
    let (writer, guard) = match log_file.and_then(file_writer) {
        Some((file, guard)) => (BoxMakeWriter::new(std::io::stderr.and(file)), Some(guard)),
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(debug))
        .with_thread_names(true)
        .with_writer(writer)
        .try_init();
    guard
}

fn file_writer(
    path: &Path,
) -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let file_name = path.file_name()?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    if let Err(err) = std::fs::create_dir_all(dir) {
        eprintln!("log directory {} unusable: {err}", dir.display());
        return None;
    }
    let appender = tracing_appender::rolling::never(dir, file_name);
    Some(tracing_appender::non_blocking(appender))
}
