use std::io::Write;

use nu_ansi_term::Color::{Blue, Magenta, Red, Yellow};
use tracing::{field::Field, Event, Level, Metadata, Subscriber};
use tracing_subscriber::{
    fmt::{
        self,
        format::{FmtSpan, Writer},
        FmtContext, FormatEvent, FormatFields, MakeWriter,
    },
    registry::LookupSpan,
    EnvFilter,
};

use crate::{cli::Args, progress, utils::Colored};

/// Overrides the verbosity flags with a full filter directive, e.g. `filesdb_dl=trace`.
const LOG_ENV: &str = "FILESDB_LOG";

#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        }
    }
}

/// Plain messages for INFO, a colored level tag for everything else.
pub struct CliFormatter;

fn level_tag(level: &Level) -> Option<Colored<&'static str>> {
    match *level {
        Level::TRACE => Some(Colored(Magenta, "[TRACE]")),
        Level::DEBUG => Some(Colored(Blue, "[DEBUG]")),
        Level::INFO => None,
        Level::WARN => Some(Colored(Yellow, "[WARN]")),
        Level::ERROR => Some(Colored(Red, "[ERROR]")),
    }
}

impl<S, N> FormatEvent<S, N> for CliFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        if let Some(tag) = level_tag(event.metadata().level()) {
            write!(writer, "{tag} ")?;
        }
        writeln!(writer, "{}", visitor.message.unwrap_or_default())
    }
}

/// Buffers one formatted event and prints it on drop with progress bars suspended.
struct SuspendingWriter {
    buffer: Vec<u8>,
    to_stderr: bool,
}

impl Write for SuspendingWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Drop for SuspendingWriter {
    fn drop(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        let output = String::from_utf8_lossy(&self.buffer);
        let output = output.trim_end_matches('\n');
        progress::suspend(|| {
            if self.to_stderr {
                eprintln!("{output}");
            } else {
                println!("{output}");
            }
        });
    }
}

struct MakeSuspendingWriter;

impl<'a> MakeWriter<'a> for MakeSuspendingWriter {
    type Writer = SuspendingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SuspendingWriter {
            buffer: Vec::new(),
            to_stderr: false,
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        SuspendingWriter {
            buffer: Vec::new(),
            to_stderr: meta.level() != &Level::INFO,
        }
    }
}

fn filter_level(args: &Args) -> Level {
    if args.quiet {
        Level::ERROR
    } else if args.verbose >= 2 {
        Level::TRACE
    } else if args.verbose == 1 {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

pub fn setup_logging(args: &Args) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("filesdb={}", filter_level(args))));

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(MakeSuspendingWriter)
        .compact()
        .without_time();

    let subscriber: Box<dyn Subscriber + Send + Sync> = if args.json {
        Box::new(builder.json().flatten_event(true).finish())
    } else {
        Box::new(builder.event_format(CliFormatter).finish())
    };

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}
