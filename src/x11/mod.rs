//! X11 side of the watcher
//!
//! Opens the display and feeds root window ConfigureNotify events to the
//! watch loop.

mod root;

pub use root::RootWindowSource;
