//! Root window event source

use tracing::{debug, info};
use x11rb::connection::Connection;
use x11rb::protocol::Event;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

use crate::error::{Error, Result};
use crate::watcher::{EventSource, WatchEvent};

/// Owns the display connection for the lifetime of the watcher.
///
/// Built once by [`RootWindowSource::open`]; never reconnects.
pub struct RootWindowSource {
    conn: RustConnection,
}

impl RootWindowSource {
    /// Connect, find the root window and subscribe to its structure events.
    pub fn open() -> Result<Self> {
        let (conn, screen_num) = connect()?;
        let root = acquire_root_window(&conn, screen_num)?;
        subscribe(&conn, root)?;
        Ok(Self { conn })
    }
}

impl EventSource for RootWindowSource {
    fn next_event(&mut self) -> Result<WatchEvent> {
        let event = self.conn.wait_for_event()?;
        if let Event::Error(err) = &event {
            debug!(error_kind = ?err.error_kind, "X11 error event ignored");
        }
        Ok(classify(&event))
    }
}

/// Open the display named by `DISPLAY`.
pub fn connect() -> Result<(RustConnection, usize)> {
    let (conn, screen_num) = x11rb::connect(None)?;
    info!(screen = screen_num, "Connected to X11 server");
    Ok((conn, screen_num))
}

pub fn acquire_root_window(conn: &impl Connection, screen_num: usize) -> Result<Window> {
    let screen = conn
        .setup()
        .roots
        .get(screen_num)
        .ok_or(Error::NoRootWindow(screen_num))?;

    info!(
        root = screen.root,
        width = screen.width_in_pixels,
        height = screen.height_in_pixels,
        "Found root window"
    );
    Ok(screen.root)
}

/// Select exposure and structure events on `window`, then map it.
pub fn subscribe(conn: &impl Connection, window: Window) -> Result<()> {
    conn.change_window_attributes(
        window,
        &ChangeWindowAttributesAux::new()
            .event_mask(EventMask::EXPOSURE | EventMask::STRUCTURE_NOTIFY),
    )?;
    conn.map_window(window)?;
    conn.flush()?;
    Ok(())
}

/// ConfigureNotify is the only geometry-change kind
pub fn classify(event: &Event) -> WatchEvent {
    match event {
        Event::ConfigureNotify(ev) => WatchEvent::GeometryChanged {
            width: ev.width,
            height: ev.height,
        },
        _ => WatchEvent::Other,
    }
}
