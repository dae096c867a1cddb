//! The tracing layer feeding the capture buffer.

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::capture::ConsoleCapture;
use crate::entry::LogLevel;

/// A [`Layer`] appending every observed event to a [`ConsoleCapture`].
///
/// Purely observational: sibling layers in the same subscriber stack
/// receive the event unchanged.
pub struct ConsoleCaptureLayer {
    capture: Arc<ConsoleCapture>,
}

impl ConsoleCaptureLayer {
    /// Create a layer feeding the given capture buffer.
    pub fn new(capture: Arc<ConsoleCapture>) -> Self {
        Self { capture }
    }
}

impl<S: Subscriber> Layer<S> for ConsoleCaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let metadata = event.metadata();
        self.capture.record(
            LogLevel::from(*metadata.level()),
            metadata.target(),
            visitor.render_message(),
            visitor.fields,
        );
    }
}

/// Collects an event's fields, keeping the message separate.
#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: serde_json::Map<String, serde_json::Value>,
}

impl FieldVisitor {
    /// The event message followed by its other fields as `key=value`
    /// pairs, joined with spaces.
    fn render_message(&self) -> String {
        let mut rendered = self.message.clone().unwrap_or_default();
        for (key, value) in &self.fields {
            if !rendered.is_empty() {
                rendered.push(' ');
            }
            match value.as_str() {
                Some(text) => {
                    let _ = write!(rendered, "{key}={text}");
                }
                None => {
                    let _ = write!(rendered, "{key}={value}");
                }
            }
        }
        rendered
    }

    fn insert(&mut self, field: &Field, value: serde_json::Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.insert(field, serde_json::Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, serde_json::Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, serde_json::Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        // Non-finite floats have no JSON form; degrade to a string.
        match serde_json::Number::from_f64(value) {
            Some(number) => self.insert(field, serde_json::Value::Number(number)),
            None => self.insert(field, serde_json::Value::String(value.to_string())),
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, serde_json::Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            self.insert(field, serde_json::Value::String(format!("{value:?}")));
        }
    }
}
