//! Event watcher - turns root window geometry changes into delayed spawns
//!
//! The loop is generic over where events come from and how children are
//! spawned. Production wires in the X11 root window and fork(2); tests drive
//! it with scripted events.

mod spawn;

use std::convert::Infallible;

use nix::unistd::Pid;
use tracing::{debug, info};

use crate::error::Result;
use crate::supervisor::TargetInvocation;

pub use spawn::ForkSpawner;

/// The parts of a windowing event the watcher cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent {
    /// The watched window was resized or moved
    GeometryChanged { width: u16, height: u16 },
    /// Anything else; discarded
    Other,
}

/// Blocking source of events
pub trait EventSource {
    /// Wait for the next event. Errors are fatal to the watcher.
    fn next_event(&mut self) -> Result<WatchEvent>;
}

/// Launches one delayed execution of the target per call
pub trait Spawner {
    /// Start a detached child and return its pid without waiting for it.
    fn spawn_delayed(&mut self, invocation: &TargetInvocation) -> Result<Pid>;
}

pub struct Watcher<'a, S, P> {
    source: S,
    spawner: P,
    invocation: &'a TargetInvocation,
}

impl<'a, S: EventSource, P: Spawner> Watcher<'a, S, P> {
    pub fn new(source: S, spawner: P, invocation: &'a TargetInvocation) -> Self {
        Self {
            source,
            spawner,
            invocation,
        }
    }

    /// Handle events until the source or the spawner fails.
    pub fn run(&mut self) -> Result<Infallible> {
        info!(
            target_path = %self.invocation.path().display(),
            "Watching for geometry changes"
        );

        loop {
            let WatchEvent::GeometryChanged { width, height } = self.source.next_event()? else {
                continue;
            };

            info!(width, height, "{} {}", width, height);
            let pid = self.spawner.spawn_delayed(self.invocation)?;
            debug!(pid = pid.as_raw(), "Spawned delayed child");
        }
    }
}
