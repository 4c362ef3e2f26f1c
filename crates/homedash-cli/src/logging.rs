use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

use time::OffsetDateTime;
use time::macros::format_description;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

/// An operational event kept for the dashboard's diagnostics panel.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub timestamp: String,
    pub level: Level,
    /// Last segment of the emitting module path, e.g. `integration` or `log_tail`.
    pub component: String,
    /// The event's `service` field, lifted out so lines can lead with it.
    pub service: Option<String>,
    pub fields: Vec<(String, String)>,
}

impl Diagnostic {
    pub fn new(
        timestamp: String,
        level: Level,
        target: &str,
        mut fields: Vec<(String, String)>,
    ) -> Self {
        let service = fields
            .iter()
            .position(|(name, _)| name == "service")
            .map(|index| fields.remove(index).1);
        Self {
            timestamp,
            level,
            component: target.rsplit("::").next().unwrap_or(target).to_string(),
            service,
            fields,
        }
    }

    /// `12:34:56 WARN  [integration] Spotify: message | key=value ...`
    pub fn format_compact(&self) -> String {
        let message = self
            .fields
            .iter()
            .find(|(name, _)| name == "message")
            .map(|(_, value)| value.as_str())
            .unwrap_or("");
        let mut line = format!("{} {:<5} [{}] ", self.timestamp, self.level, self.component);
        if let Some(service) = &self.service {
            line.push_str(service);
            line.push_str(": ");
        }
        line.push_str(message);

        let mut extras: Vec<String> = self
            .fields
            .iter()
            .filter(|(name, value)| name != "message" && !value.is_empty())
            .map(|(name, value)| format!("{name}={}", single_line(value)))
            .collect();
        if !extras.is_empty() {
            extras.sort();
            line.push_str(" | ");
            line.push_str(&extras.join(" "));
        }
        line
    }
}

/// Bounded list of recent operational events, shared with the dashboard.
#[derive(Clone)]
pub struct DiagnosticsBuffer {
    entries: Arc<Mutex<VecDeque<Diagnostic>>>,
    capacity: usize,
}

impl DiagnosticsBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// The newest `limit` events, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<Diagnostic> {
        let Ok(entries) = self.entries.lock() else {
            return Vec::new();
        };
        let skip = entries.len().saturating_sub(limit);
        entries.iter().skip(skip).cloned().collect()
    }

    fn record(&self, entry: Diagnostic) {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        if self.capacity > 0 {
            entries.push_back(entry);
        }
    }
}

/// Tracing layer feeding [`DiagnosticsBuffer`].
pub struct DiagnosticsLayer {
    buffer: DiagnosticsBuffer,
}

impl<S> Layer<S> for DiagnosticsLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = FieldCollector::default();
        event.record(&mut fields);
        let metadata = event.metadata();
        self.buffer.record(Diagnostic::new(
            format_timestamp(OffsetDateTime::now_utc()),
            *metadata.level(),
            metadata.target(),
            fields.0,
        ));
    }
}

/// Installs the global subscriber.
///
/// Events always land in `buffer`; `stderr` adds a formatted writer filtered by `RUST_LOG`
/// (warnings and up when unset). The dashboard turns it off while it owns the terminal.
pub fn init(buffer: DiagnosticsBuffer, stderr: bool) {
    let fmt_layer = stderr.then(|| {
        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy();
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(filter)
    });
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(DiagnosticsLayer { buffer }.with_filter(LevelFilter::INFO))
        .init();
}

/// Strings verbatim, everything else through `Debug`.
#[derive(Default)]
struct FieldCollector(Vec<(String, String)>);

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }
}

fn single_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn format_timestamp(timestamp: OffsetDateTime) -> String {
    timestamp
        .format(format_description!("[hour repr:24]:[minute]:[second]"))
        .unwrap_or_else(|_| timestamp.unix_timestamp().to_string())
}
