use std::{fmt, sync::OnceLock};

use colored::Colorize;
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self as tracing_fmt, FmtContext, FormatEvent, FormatFields},
    registry::LookupSpan,
};

/// Splits an event into its message and the remaining `name=value` fields.
#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    fields: Vec<(&'static str, String)>,
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.push((field.name(), format!("\"{}\"", value)));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.fields.push((field.name(), format!("{:?}", value)));
        }
    }
}

fn render_fields(fields: &[(&'static str, String)]) -> String {
    fields
        .iter()
        .map(|(name, value)| format!("{}={}", name.white(), value.cyan()))
        .collect::<Vec<_>>()
        .join(" ")
}

struct SidecarLogFormatter;

impl<S, N> FormatEvent<S, N> for SidecarLogFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: tracing_fmt::format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();

        write!(writer, "{} ", chrono::Utc::now().to_rfc3339().dimmed())?;

        let level = match *meta.level() {
            Level::TRACE => "TRACE".purple(),
            Level::DEBUG => "DEBUG".green(),
            Level::INFO => "INFO".blue(),
            Level::WARN => "WARN".yellow(),
            Level::ERROR => "ERROR".red(),
        };
        write!(writer, "[{}] {} ", level, meta.target().cyan().bold())?;

        let mut collector = FieldCollector::default();
        event.record(&mut collector);

        if let Some(message) = &collector.message {
            write!(writer, "{}", message.white())?;
        }
        if !collector.fields.is_empty() {
            write!(writer, " {}", render_fields(&collector.fields))?;
        }

        writeln!(writer)
    }
}

static TRACING: OnceLock<()> = OnceLock::new();

/// Installs the global subscriber. Filter comes from `RUST_LOG`, default `info`.
/// Later calls, or an already-installed subscriber, leave things as they are.
pub fn init_tracing() {
    TRACING.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_fmt::Subscriber::builder()
            .with_env_filter(filter)
            .event_format(SidecarLogFormatter)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use std::{
        io::Write,
        sync::{Arc, Mutex},
    };

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Buffer {
        type Writer = Buffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn formatter_renders_level_message_and_fields() {
        colored::control::set_override(false);
        let buffer = Buffer::default();
        let subscriber = tracing_fmt::Subscriber::builder()
            .with_env_filter(EnvFilter::new("debug"))
            .with_writer(buffer.clone())
            .event_format(SidecarLogFormatter)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(store = "orders", attempts = 2, "State not found");
        });

        let output = String::from_utf8_lossy(&buffer.0.lock().unwrap()).to_string();
        assert!(output.contains("[WARN]"), "{}", output);
        assert!(output.contains("State not found"), "{}", output);
        assert!(output.contains("store=\"orders\""), "{}", output);
        assert!(output.contains("attempts=2"), "{}", output);
        assert!(output.ends_with('\n'));
    }
}
