use crate::handler::Handler;
use crate::level::Level;
use crate::record::{Record, Source};
use crate::value::Attr;
use arc_swap::ArcSwap;
use chrono::Local;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::span;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Handler and threshold, swapped together.
struct Snapshot {
    handler: Arc<dyn Handler>,
    level: Level,
}

/// Fields recorded on a span, kept in the span's extensions.
struct SpanFields(Vec<Attr>);

/// `tracing_subscriber` layer that renders events through a [`Handler`].
///
/// Every event becomes a [`Record`]: its fields turn into attributes, the
/// `message` field into the record message, and each enclosing span with
/// recorded fields into one group named after the span, outermost first.
///
/// The handler and minimum level can be replaced at runtime; concurrent
/// events see either the old or the new pair, never a mix.
pub struct FormatLayer {
    state: ArcSwap<Snapshot>,
    /// Events rendered and written successfully.
    pub handled_events: Arc<AtomicU64>,
    /// Events whose write to the sink failed.
    pub failed_writes: Arc<AtomicU64>,
}

impl FormatLayer {
    /// Layer forwarding every event the handler has enabled.
    pub fn new<H: Handler + 'static>(handler: H) -> Self {
        FormatLayer {
            state: ArcSwap::from_pointee(Snapshot {
                handler: Arc::new(handler),
                level: Level::TRACE,
            }),
            handled_events: Arc::new(AtomicU64::new(0)),
            failed_writes: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Same layer with an additional minimum level.
    pub fn with_level(self, level: Level) -> Self {
        self.set_level(level);
        self
    }

    pub fn level(&self) -> Level {
        self.state.load().level
    }

    pub fn set_level(&self, level: Level) {
        self.state.rcu(|cur| Snapshot {
            handler: Arc::clone(&cur.handler),
            level,
        });
    }

    /// Route subsequent events to `handler`.
    pub fn set_handler<H: Handler + 'static>(&self, handler: H) {
        let handler: Arc<dyn Handler> = Arc::new(handler);
        self.state.rcu(|cur| Snapshot {
            handler: Arc::clone(&handler),
            level: cur.level,
        });
        tracing::debug!("log handler replaced");
    }
}

impl<S> Layer<S> for FormatLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut fields = Vec::new();
        let mut message = None;
        attrs.record(&mut FieldVisitor {
            attrs: &mut fields,
            message: &mut message,
        });
        if let Some(message) = message {
            fields.insert(0, Attr::string("message", message));
        }
        span.extensions_mut().insert(SpanFields(fields));
    }

    fn on_record(&self, id: &span::Id, values: &span::Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut extensions = span.extensions_mut();
        if let Some(SpanFields(fields)) = extensions.get_mut::<SpanFields>() {
            let mut message = None;
            values.record(&mut FieldVisitor {
                attrs: &mut *fields,
                message: &mut message,
            });
            if let Some(message) = message {
                fields.push(Attr::string("message", message));
            }
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let meta = event.metadata();
        let level = Level::from(*meta.level());
        let state = self.state.load();
        if level < state.level || !state.handler.enabled(level) {
            return;
        }

        let mut attrs = Vec::new();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                let extensions = span.extensions();
                if let Some(SpanFields(fields)) = extensions.get::<SpanFields>() {
                    if !fields.is_empty() {
                        attrs.push(Attr::group(span.name(), fields.clone()));
                    }
                }
            }
        }

        let mut message = None;
        event.record(&mut FieldVisitor {
            attrs: &mut attrs,
            message: &mut message,
        });

        let record = Record {
            level,
            time: Some(Local::now().fixed_offset()),
            message: message.unwrap_or_default(),
            source: match (meta.file(), meta.line()) {
                (Some(file), Some(line)) => Some(Source::new(file, line)),
                _ => None,
            },
            attrs,
        };

        match state.handler.handle(&record) {
            Ok(()) => {
                self.handled_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.failed_writes.fetch_add(1, Ordering::Relaxed);
                eprintln!("log handler failed: {}", e);
            }
        }
    }
}

/// Collects event or span fields as typed attributes.
pub struct FieldVisitor<'a> {
    pub attrs: &'a mut Vec<Attr>,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.attrs.push(Attr::string(field.name(), value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.attrs.push(Attr::int(field.name(), value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.attrs.push(Attr::uint(field.name(), value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.attrs.push(Attr::float(field.name(), value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.attrs.push(Attr::bool(field.name(), value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.attrs.push(Attr::string(field.name(), value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.attrs.push(Attr::string(field.name(), format!("{:?}", value)));
        }
    }
}
