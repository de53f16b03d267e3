use chrono::Local;
use colored::*;
use std::fmt::Write as _;
use tracing_subscriber::EnvFilter;

/// Installs the global colored line logger.
///
/// `RUST_LOG` wins over `default_level` when set, e.g. `RUST_LOG=bi_agent_sdk_rs=debug`.
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Force colored output even if not a TTY
    colored::control::set_override(true);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(true)
        .with_writer(std::io::stdout)
        .event_format(LineFormatter)
        .try_init();
}

fn level_label(level: tracing::Level) -> ColoredString {
    match level {
        tracing::Level::ERROR => "ERROR".red().bold(),
        tracing::Level::WARN => "WARN".yellow().bold(),
        tracing::Level::INFO => "INFO".green().bold(),
        tracing::Level::DEBUG => "DEBUG".blue().bold(),
        tracing::Level::TRACE => "TRACE".magenta().bold(),
    }
}

/// `<time> <LEVEL> <message> key=value ...`
struct LineFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for LineFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f").to_string();
        let level = level_label(*event.metadata().level());

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        write!(writer, "{} {} {}", now.dimmed(), level, visitor.message)?;
        if !visitor.fields.is_empty() {
            write!(writer, "{}", visitor.fields.dimmed())?;
        }
        writeln!(writer)
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: String,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }
}
