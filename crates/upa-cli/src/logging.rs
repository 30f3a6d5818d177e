use std::env;
use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt as tracing_fmt, EnvFilter};

use crate::commands::Cli;
use crate::progress::ProgressSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

/// Console behaviour, fixed once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleSettings {
    pub verbosity: Verbosity,
    pub suppress_warnings: bool,
    pub progress: bool,
}

impl ConsoleSettings {
    pub fn from_cli(cli: &Cli) -> Self {
        let verbosity = if cli.quiet {
            Verbosity::Quiet
        } else if cli.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        Self {
            verbosity,
            suppress_warnings: cli.suppress_warnings,
            progress: cli.command.as_ref().map_or(false, |c| c.wants_progress()),
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    /// Whether a console line at `level` is printed.
    pub fn allows(&self, level: &Level) -> bool {
        if self.suppress_warnings && *level == Level::WARN {
            return false;
        }
        match self.verbosity {
            Verbosity::Quiet => false,
            Verbosity::Normal => *level <= Level::INFO,
            Verbosity::Verbose => *level <= Level::DEBUG,
        }
    }
}

fn level_prefix(verbosity: Verbosity, level: &Level) -> &'static str {
    match (verbosity, *level) {
        (Verbosity::Verbose, Level::TRACE) => "[TRACE] ",
        (Verbosity::Verbose, Level::DEBUG) => "[DEBUG] ",
        (Verbosity::Verbose, Level::INFO) => "[INFO] ",
        (Verbosity::Verbose, Level::WARN) => "[WARN] ",
        (Verbosity::Verbose, Level::ERROR) => "[ERROR] ",
        (_, Level::WARN) => "Warning: ",
        _ => "",
    }
}

/// One line per event: level prefix and the message fields, nothing else.
struct ConsoleFormat {
    verbosity: Verbosity,
}

impl<S, N> FormatEvent<S, N> for ConsoleFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "{}", level_prefix(self.verbosity, event.metadata().level()))?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Stdout writer that takes the progress bar off the screen while a log
/// line is written, so log text never lands on a half drawn bar.
#[derive(Clone)]
struct ConsoleWriter {
    slot: ProgressSlot,
}

struct ConsoleLine {
    slot: ProgressSlot,
    buf: Vec<u8>,
}

impl<'a> MakeWriter<'a> for ConsoleWriter {
    type Writer = ConsoleLine;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleLine {
            slot: self.slot.clone(),
            buf: Vec::new(),
        }
    }
}

impl Write for ConsoleLine {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleLine {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let bar = self.slot.lock().ok().and_then(|guard| guard.clone());
        let write = || {
            let mut out = io::stdout().lock();
            let _ = out.write_all(&self.buf);
            let _ = out.flush();
        };
        match bar {
            Some(pb) => pb.suspend(write),
            None => write(),
        }
    }
}

/// Console layer per `settings`, plus a plain file layer when `log_file` is
/// set. The returned guard must be kept alive for the file layer to flush.
pub fn init_logger(
    settings: &ConsoleSettings,
    log_file: Option<&str>,
    slot: ProgressSlot,
) -> Option<WorkerGuard> {
    let console_settings = *settings;
    let console_layer = tracing_fmt::layer()
        .event_format(ConsoleFormat {
            verbosity: settings.verbosity,
        })
        .with_writer(ConsoleWriter { slot })
        .with_filter(filter_fn(move |meta| console_settings.allows(meta.level())));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let path = Path::new(path);
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            let file_name = path.file_name().unwrap_or(path.as_os_str());
            let file_appender =
                tracing_appender::rolling::never(dir.unwrap_or(Path::new(".")), file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| "debug".to_string());
            let layer = tracing_fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(EnvFilter::new(filter));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}
