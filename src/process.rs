//! Fork and image replacement primitives
//!
//! Every process in this program is single-threaded, which is what makes
//! `fork` sound here. No async runtime or helper thread may be started before
//! the last fork.

use nix::errno::Errno;
use nix::sys::signal::{self, SigHandler, Signal};
use nix::unistd::{self, ForkResult, Pid};

use crate::error::{Error, Result};
use crate::supervisor::TargetInvocation;

/// Which side of a fork the caller is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forked {
    Parent { child: Pid },
    Child,
}

/// Creates a copy of the current process
pub trait Fork {
    fn fork(&mut self) -> Result<Forked>;
}

/// fork(2)
pub struct SystemFork;

impl Fork for SystemFork {
    #[allow(unsafe_code)] // fork(2) has no safe wrapper
    fn fork(&mut self) -> Result<Forked> {
        // SAFETY: the process is single-threaded, so the child cannot inherit a
        // lock held by another thread.
        match unsafe { unistd::fork() } {
            Ok(ForkResult::Parent { child }) => Ok(Forked::Parent { child }),
            Ok(ForkResult::Child) => Ok(Forked::Child),
            Err(errno) => Err(Error::Fork(errno)),
        }
    }
}

/// Replace the current process image with the target.
///
/// Returns only when execve(2) failed. The caller must then [`terminate`]
/// rather than continue into code it shares with its parent.
pub fn replace_image(invocation: &TargetInvocation) -> Errno {
    match unistd::execve(invocation.exec_path(), invocation.argv(), invocation.envp()) {
        Ok(never) => match never {},
        Err(errno) => errno,
    }
}

/// End the current process immediately.
///
/// Skips atexit handlers and stdio flushing, which belong to the parent image
/// this process was forked from.
#[allow(unsafe_code)] // _exit(2) is only exposed through libc
pub fn terminate(status: i32) -> ! {
    // SAFETY: _exit takes no pointers and never returns.
    unsafe { libc::_exit(status) }
}

/// Ignore SIGCHLD so the kernel reaps finished children instead of leaving
/// zombies behind.
#[allow(unsafe_code)] // signal(2) can replace a Rust handler; we only install SIG_IGN
pub fn reap_children_automatically() -> Result<()> {
    // SAFETY: SIG_IGN runs no code in signal context.
    unsafe { signal::signal(Signal::SIGCHLD, SigHandler::SigIgn) }
        .map(drop)
        .map_err(Error::Signal)
}

/// Put SIGCHLD back to its default disposition.
///
/// An ignored SIGCHLD survives execve(2), so a child that is about to become
/// the target calls this first to hand it the disposition it would normally
/// inherit.
#[allow(unsafe_code)] // see reap_children_automatically
pub fn restore_child_signal() -> Result<()> {
    // SAFETY: SIG_DFL runs no code in signal context.
    unsafe { signal::signal(Signal::SIGCHLD, SigHandler::SigDfl) }
        .map(drop)
        .map_err(Error::Signal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::wait::{WaitStatus, waitpid};
    use std::ffi::OsString;

    fn invocation(args: &[&str], env: &[(&str, &str)]) -> TargetInvocation {
        TargetInvocation::capture(
            args.iter().map(OsString::from).collect(),
            env.iter()
                .map(|(k, v)| (OsString::from(k), OsString::from(v))),
        )
        .unwrap()
    }

    #[test]
    fn test_replace_image_returns_errno_for_missing_target() {
        let missing = invocation(&["/nonexistent/rootwatch-target"], &[]);
        assert_eq!(replace_image(&missing), Errno::ENOENT);
    }

    #[test]
    fn test_child_terminates_with_requested_status() {
        match SystemFork.fork().unwrap() {
            Forked::Child => terminate(7),
            Forked::Parent { child } => {
                assert_eq!(waitpid(child, None).unwrap(), WaitStatus::Exited(child, 7));
            }
        }
    }

    #[test]
    fn test_replaced_image_sees_captured_environment() {
        let target = invocation(
            &["/bin/sh", "-c", r#"test "$ROOTWATCH_PROBE" = yes"#],
            &[("ROOTWATCH_PROBE", "yes")],
        );

        match SystemFork.fork().unwrap() {
            Forked::Child => {
                replace_image(&target);
                terminate(crate::constants::exit::EXEC_FAILED)
            }
            Forked::Parent { child } => {
                assert_eq!(waitpid(child, None).unwrap(), WaitStatus::Exited(child, 0));
            }
        }
    }
}
