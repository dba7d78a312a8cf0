use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// In-memory copy of everything logged during the run.
///
/// Each result document carries a snapshot of this buffer in its `logs` field.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        let Ok(bytes) = self.inner.lock() else {
            return Vec::new();
        };
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log buffer poisoned"))?;
        inner.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// `2026-01-31 12:00:00,123` style timestamps.
struct LogTimer;

impl FormatTime for LogTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f"))
    }
}

fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("humann2_runner=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("humann2_runner=info"))
    }
}

pub fn init_cli_logger(verbose: bool, format: LogFormat) -> LogBuffer {
    let buffer = LogBuffer::new();

    let console = match format {
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .with_timer(LogTimer)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .json()
            .boxed(),
    };

    // 另存一份純文字日誌，寫入結果檔
    let capture = tracing_subscriber::fmt::layer()
        .with_writer(buffer.clone())
        .with_timer(LogTimer)
        .with_ansi(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(console)
        .with(capture)
        .init();

    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_log_buffer_splits_lines() {
        let mut buffer = LogBuffer::new();
        assert!(buffer.lines().is_empty());

        buffer.write_all(b"first line\nsecond").unwrap();
        buffer.write_all(b" line\n").unwrap();

        assert_eq!(buffer.lines(), vec!["first line", "second line"]);
    }

    #[test]
    fn test_log_buffer_clones_share_storage() {
        let buffer = LogBuffer::new();
        let mut writer = buffer.make_writer();
        writer.write_all(b"shared\n").unwrap();

        assert_eq!(buffer.lines(), vec!["shared"]);
    }

    #[test]
    fn test_capture_layer_records_events() {
        let buffer = LogBuffer::new();
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .with_writer(buffer.clone())
                .with_ansi(false)
                .with_target(false),
        );

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("Processing input argument: sra://SRR1");
        });

        let lines = buffer.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("INFO"));
        assert!(lines[0].ends_with("Processing input argument: sra://SRR1"));
    }
}
