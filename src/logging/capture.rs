//! In-memory log capture for tests

use std::sync::{Arc, Mutex};

use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use super::syslog::MessageVisitor;

/// Renders events the same way the syslog layer does, into memory
#[derive(Clone, Default)]
struct CaptureLayer {
    lines: Arc<Mutex<Vec<String>>>,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.lines.lock().unwrap().push(visitor.render());
    }
}

/// Run `f` under a thread-local subscriber and return every rendered line.
pub fn capture(f: impl FnOnce()) -> Vec<String> {
    let layer = CaptureLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    tracing::subscriber::with_default(subscriber, f);
    let lines = layer.lines.lock().unwrap().clone();
    lines
}
