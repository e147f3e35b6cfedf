use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid logging.level '{0}'. Valid values: trace, debug, info, warn, error")]
    InvalidLevel(String),
    #[error("logging is already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Collects an event's fields into a JSON object.
#[derive(Default)]
struct FieldCollector {
    fields: Map<String, Value>,
}

impl Visit for FieldCollector {
    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.fields
            .insert(field.name().to_string(), format!("{:?}", value).into());
    }
}

/// Writes one JSON object per event:
/// `{"timestamp", "level", "message", "target", "service": {..}, "fields": {..}}`.
struct JsonLineFormatter {
    service_name: String,
    service_version: String,
}

impl<S, N> FormatEvent<S, N> for JsonLineFormatter
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let mut collector = FieldCollector::default();
        event.record(&mut collector);

        let mut fields = collector.fields;
        let message = match fields.remove("message") {
            Some(Value::String(message)) => message,
            Some(other) => other.to_string(),
            None => metadata.name().to_string(),
        };
        if let Some(line) = metadata.line() {
            fields.insert("code.lineno".to_string(), line.into());
        }

        let mut record = Map::new();
        record.insert(
            "timestamp".to_string(),
            Utc::now()
                .to_rfc3339_opts(SecondsFormat::Millis, true)
                .into(),
        );
        record.insert("level".to_string(), metadata.level().as_str().into());
        record.insert("message".to_string(), message.into());
        record.insert("target".to_string(), metadata.target().into());
        record.insert(
            "service".to_string(),
            serde_json::json!({
                "name": self.service_name,
                "version": self.service_version,
            }),
        );
        record.insert("fields".to_string(), Value::Object(fields));

        let line = serde_json::to_string(&Value::Object(record)).map_err(|_| std::fmt::Error)?;
        writeln!(writer, "{}", line)
    }
}

fn parse_level(level: &str) -> Result<LevelFilter, LoggingError> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" => Ok(LevelFilter::WARN),
        "error" => Ok(LevelFilter::ERROR),
        _ => Err(LoggingError::InvalidLevel(level.to_string())),
    }
}

/// Installs the global tracing subscriber described by `logging_config`.
///
/// `RUST_LOG` directives refine the configured level. Records emitted
/// through the `log` crate (reqwest, hyper) are forwarded to tracing.
pub fn init_logging(logging_config: &LoggingConfig) -> Result<(), LoggingError> {
    let level = parse_level(&logging_config.level)?;
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let format_layer = match logging_config.format.trim().to_lowercase().as_str() {
        "json" => fmt::layer()
            .event_format(JsonLineFormatter {
                service_name: logging_config.service_name.clone(),
                service_version: logging_config.service_version.clone(),
            })
            .boxed(),
        // "console" and anything unknown get the human-readable output.
        _ => fmt::layer().pretty().boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(format_layer);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;
    tracing_log::LogTracer::init().map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
}
