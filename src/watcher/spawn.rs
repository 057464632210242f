//! Delayed, fire-and-forget execution of the target

use std::thread;
use std::time::Duration;

use nix::unistd::Pid;
use tracing::{error, info, warn};

use super::Spawner;
use crate::constants::exit;
use crate::error::Result;
use crate::process::{self, Fork, Forked};
use crate::supervisor::TargetInvocation;

/// Forks one child per geometry change. The child sleeps, then replaces
/// itself with the target. Children are never waited for.
pub struct ForkSpawner<F> {
    forker: F,
    delay: Duration,
    reap: bool,
}

impl<F: Fork> ForkSpawner<F> {
    pub fn new(forker: F, delay: Duration) -> Self {
        Self {
            forker,
            delay,
            reap: false,
        }
    }

    /// Set when the watcher ignores SIGCHLD, so children restore the default
    /// before exec.
    pub fn reaping(mut self, reap: bool) -> Self {
        self.reap = reap;
        self
    }
}

impl<F: Fork> Spawner for ForkSpawner<F> {
    fn spawn_delayed(&mut self, invocation: &TargetInvocation) -> Result<Pid> {
        match self.forker.fork()? {
            Forked::Parent { child } => Ok(child),
            Forked::Child => exec_after_delay(invocation, self.delay, self.reap),
        }
    }
}

/// Child side of a spawn. Never returns into the caller's loop.
fn exec_after_delay(invocation: &TargetInvocation, delay: Duration, reap: bool) -> ! {
    thread::sleep(delay);

    if reap && let Err(err) = process::restore_child_signal() {
        warn!(error = %err, "Target will inherit an ignored SIGCHLD");
    }

    info!("Executing {} ...", invocation.path().display());
    let errno = process::replace_image(invocation);

    error!(
        target_path = %invocation.path().display(),
        error = %errno,
        "Failed to execute target"
    );
    process::terminate(exit::EXEC_FAILED)
}
