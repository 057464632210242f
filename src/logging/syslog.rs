//! Tracing layer that writes every event to syslog(3)

use std::ffi::CString;
use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::constants;

/// Forwards events to the system log under the program's identity.
pub struct SyslogLayer;

impl SyslogLayer {
    /// Call openlog(3) and return the layer.
    #[allow(unsafe_code)] // openlog/syslog are only exposed through libc
    pub fn open() -> Self {
        // SAFETY: IDENT is a 'static C string; openlog keeps the pointer.
        unsafe {
            libc::openlog(
                constants::syslog::IDENT.as_ptr(),
                libc::LOG_PID,
                libc::LOG_USER,
            )
        };
        Self
    }
}

impl<S> Layer<S> for SyslogLayer
where
    S: Subscriber,
{
    #[allow(unsafe_code)]
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let Ok(message) = CString::new(visitor.render()) else {
            return;
        };

        // SAFETY: "%s" consumes exactly the one NUL-terminated argument given.
        unsafe {
            libc::syslog(
                priority(*event.metadata().level()),
                c"%s".as_ptr(),
                message.as_ptr(),
            )
        };
    }
}

/// Map a tracing level onto a syslog priority
pub fn priority(level: Level) -> libc::c_int {
    match level {
        Level::ERROR => libc::LOG_ERR,
        Level::WARN => libc::LOG_WARNING,
        Level::INFO => libc::LOG_INFO,
        Level::DEBUG | Level::TRACE => libc::LOG_DEBUG,
    }
}

/// Collects the message and the remaining fields of one event
#[derive(Default)]
pub struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    /// `message key=value ...`, with NUL bytes dropped so the line fits in a C string
    pub fn render(self) -> String {
        let mut line = self.message;
        if !self.fields.is_empty() {
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&self.fields);
        }
        line.retain(|c| c != '\0');
        line
    }

    fn separator(&mut self) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.separator();
            let _ = write!(self.fields, "{}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            self.separator();
            let _ = write!(self.fields, "{}={:?}", field.name(), value);
        }
    }
}
