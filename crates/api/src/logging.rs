//! Tracing setup and the activity log sink.
//!
//! Every event goes to stdout and is also appended to the activity log
//! file. The file is opened in append mode for each event so concurrent
//! writers and external log rotation never truncate it. A failed write is
//! reported on stdout and otherwise ignored; logging never interrupts
//! request handling.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "cron_trigger_api=info,cron_trigger_core=info,tower_http=info";

/// `[YYYY-MM-DD HH:MM:SS]` in local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTimestamp;

impl FormatTime for LocalTimestamp {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "[{}]", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

/// [`MakeWriter`] appending formatted events to the activity log file.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    path: PathBuf,
}

impl ActivityLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl<'a> MakeWriter<'a> for ActivityLog {
    type Writer = ActivityLogWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        ActivityLogWriter {
            path: &self.path,
            buffer: Vec::new(),
        }
    }
}

/// Buffers one event and appends it to the file on flush or drop.
pub struct ActivityLogWriter<'a> {
    path: &'a Path,
    buffer: Vec<u8>,
}

impl Write for ActivityLogWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path)
            .and_then(|mut file| file.write_all(&self.buffer));

        if let Err(e) = result {
            println!(
                "Failed to write to log file {}: {e}",
                self.path.display()
            );
        }
        self.buffer.clear();
        Ok(())
    }
}

impl Drop for ActivityLogWriter<'_> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// Install the global subscriber: stdout plus the activity log file.
pub fn init(activity_log: &Path) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_timer(LocalTimestamp))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_timer(LocalTimestamp)
                .with_writer(ActivityLog::new(activity_log)),
        )
        .init();
}
