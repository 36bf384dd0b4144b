//! Diagnostics for the `viability` binary.
//!
//! Logs never share stdout with command output. Stderr gets a compact line
//! (level, target, fields); the optional log file additionally carries a
//! local timestamp so batch runs can be correlated afterwards.

use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use chrono::Local;
use thiserror::Error;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::{FmtContext, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, reload};

const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("logging not yet initialized")]
    NotInitialized,

    #[error("invalid log filter '{directive}': {source}")]
    InvalidFilter {
        directive: String,
        #[source]
        source: ParseError,
    },

    #[error("log filter reload failed: {0}")]
    Reload(String),

    #[error("cannot open log file '{}': {source}", path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// --- Event format ---

/// One line per event. `timestamps` adds a local RFC 3339 prefix.
struct LineFormat {
    timestamps: bool,
}

fn level_style(level: Level) -> &'static str {
    match level {
        Level::ERROR => "\x1b[1;31m",
        Level::WARN => "\x1b[1;33m",
        Level::INFO => "\x1b[1;32m",
        Level::DEBUG => "\x1b[1;34m",
        Level::TRACE => "\x1b[1;35m",
    }
}

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let ansi = writer.has_ansi_escapes();

        if self.timestamps {
            write!(writer, "{} ", Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z"))?;
        }

        if ansi {
            write!(
                writer,
                "{}{:>5}\x1b[0m \x1b[2m{}\x1b[0m ",
                level_style(*meta.level()),
                meta.level(),
                meta.target()
            )?;
        } else {
            write!(writer, "{:>5} {} ", meta.level(), meta.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

// --- Late-bound log file ---

type SharedFile = Arc<Mutex<Option<File>>>;

/// Writes to the log file once one is opened; discards output until then.
#[derive(Clone, Default)]
struct LogFile(SharedFile);

struct LogFileWriter<'a>(MutexGuard<'a, Option<File>>);

impl Write for LogFileWriter<'_> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        match self.0.as_mut() {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.0.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogFileWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LogFileWriter(self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl LogFile {
    fn replace(
        &self,
        file: File,
    ) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(file);
    }
}

// --- Installed state ---

type ReloadFn = Box<dyn Fn(EnvFilter) -> Result<(), LoggingError> + Send + Sync>;

struct Installed {
    reload: ReloadFn,
    file: LogFile,
}

static INSTALLED: OnceLock<Installed> = OnceLock::new();

fn parse_filter(directive: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directive).map_err(|source| LoggingError::InvalidFilter {
        directive: directive.to_string(),
        source,
    })
}

fn installed() -> Result<&'static Installed, LoggingError> {
    INSTALLED.get().ok_or(LoggingError::NotInitialized)
}

// --- Public API ---

/// Replaces the active filter. Accepts a bare level (`debug`) or any
/// `EnvFilter` directive (`viability_core=trace,sqlx=warn`).
pub fn set_log_level(directive: &str) -> Result<(), LoggingError> {
    let filter = parse_filter(directive)?;
    (installed()?.reload)(filter)
}

/// Appends log lines to `path` from now on, replacing any earlier file.
pub fn enable_file_logging(path: &Path) -> Result<(), LoggingError> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::OpenFile {
            path: path.to_path_buf(),
            source,
        })?;
    installed()?.file.replace(file);
    Ok(())
}

/// Installs the global subscriber. Later calls are no-ops.
///
/// The filter starts from `RUST_LOG`, else `info`.
pub fn init_logging() {
    let initial = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let (filter, handle) = reload::Layer::new(initial);
    let file = LogFile::default();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(LineFormat { timestamps: false })
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr);

    let file_layer = tracing_subscriber::fmt::layer()
        .event_format(LineFormat { timestamps: true })
        .with_ansi(false)
        .with_writer(file.clone());

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    if installed.is_ok() {
        let _ = INSTALLED.set(Installed {
            reload: Box::new(move |filter| {
                handle
                    .reload(filter)
                    .map_err(|e| LoggingError::Reload(e.to_string()))
            }),
            file,
        });
    }
}
