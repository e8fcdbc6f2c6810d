//! In-memory event capture for diagnostics assertions
//!
//! [`init_test_capture`] installs [`CaptureLayer`] as the global subscriber.
//! Every event lands in one shared buffer, so tests running in parallel see
//! each other's events and should filter on a key, step or op name unique to
//! the test.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use modview_core_types::schema::{EVENT_SKIP, FIELD_COMPONENT, FIELD_EVENT, FIELD_OP};

/// One captured event; every field value is kept in its rendered form
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub component: Option<String>,
    pub op: Option<String>,
    pub event: Option<String>,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Whether this is the `event` phase of operation `op`
    pub fn is(&self, op: &str, event: &str) -> bool {
        self.op.as_deref() == Some(op) && self.event.as_deref() == Some(event)
    }

    pub fn is_skip(&self) -> bool {
        self.event.as_deref() == Some(EVENT_SKIP)
    }
}

struct Fields(HashMap<String, String>);

impl Visit for Fields {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    // integers and bools fall back here and render the same as Display
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }
}

type Buffer = Arc<Mutex<Vec<CapturedEvent>>>;

/// Subscriber layer appending every event to a shared buffer
pub struct CaptureLayer {
    buffer: Buffer,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = Fields(HashMap::new());
        event.record(&mut fields);
        let fields = fields.0;

        let captured = CapturedEvent {
            level: *event.metadata().level(),
            component: fields.get(FIELD_COMPONENT).cloned(),
            op: fields.get(FIELD_OP).cloned(),
            event: fields.get(FIELD_EVENT).cloned(),
            fields,
        };
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(captured);
    }
}

/// Read handle on the captured events
#[derive(Clone)]
pub struct TestCapture {
    buffer: Buffer,
}

impl TestCapture {
    /// Snapshot of everything captured so far
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// First captured event matching `predicate`
    pub fn find<F>(&self, predicate: F) -> Option<CapturedEvent>
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().into_iter().find(|e| predicate(e))
    }

    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().iter().filter(|e| predicate(e)).count()
    }

    /// Skip events carrying `field = value`
    pub fn skips_where(&self, field: &str, value: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.is_skip() && e.field(field) == Some(value))
            .collect()
    }

    /// # Panics
    ///
    /// When no event of operation `op` in phase `event` was captured.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.events();
        assert!(
            events.iter().any(|e| e.is(op, event)),
            "no {} event for op {} among {} captured events",
            event,
            op,
            events.len()
        );
    }
}

static CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer on first call and return the shared handle
///
/// Must not be combined with [`init`](super::init) in the same process.
///
/// ```
/// use modview_core::logging_facility::test_capture::init_test_capture;
/// use modview_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_example_op");
/// capture.assert_event_exists("doc_example_op", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    CAPTURE
        .get_or_init(|| {
            let buffer = Buffer::default();
            let layer = CaptureLayer {
                buffer: Arc::clone(&buffer),
            };
            tracing_subscriber::registry().with(layer).init();
            TestCapture { buffer }
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skip_event(key: &str) -> CapturedEvent {
        let mut fields = HashMap::new();
        fields.insert("key".to_string(), key.to_string());
        CapturedEvent {
            level: Level::DEBUG,
            component: Some("modview_projection::children".to_string()),
            op: Some("enumerate_children".to_string()),
            event: Some(EVENT_SKIP.to_string()),
            fields,
        }
    }

    #[test]
    fn test_captured_event_predicates() {
        let event = skip_event("interfaces");
        assert!(event.is_skip());
        assert!(event.is("enumerate_children", EVENT_SKIP));
        assert!(!event.is("lookup_child", EVENT_SKIP));
        assert_eq!(event.field("key"), Some("interfaces"));
        assert_eq!(event.field("missing"), None);
    }

    #[test]
    fn test_handle_filters_buffer() {
        let capture = TestCapture {
            buffer: Buffer::default(),
        };
        capture
            .buffer
            .lock()
            .unwrap()
            .extend([skip_event("a"), skip_event("b"), skip_event("a")]);

        assert_eq!(capture.skips_where("key", "a").len(), 2);
        assert!(capture.find(|e| e.field("key") == Some("b")).is_some());
        assert_eq!(capture.count_events(CapturedEvent::is_skip), 3);
    }
}
