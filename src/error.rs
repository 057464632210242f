//! Error taxonomy shared by the supervisor and the watcher
//!
//! Every variant is fatal to the process that produces it: `main` logs it once
//! and exits with [`crate::constants::exit::FAILURE`].

use std::ffi::OsString;
use std::path::PathBuf;

use nix::errno::Errno;
use x11rb::errors::{ConnectError, ConnectionError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No target executable was given on the command line
    #[error("no arguments given, expected a target executable")]
    MissingArgument,

    /// An argument or environment entry cannot be handed to execve
    #[error("argument contains an interior NUL byte: {0:?}")]
    InvalidArgument(OsString),

    /// Target does not exist or lacks the owner-executable bit
    #[error("not an executable: {}", .0.display())]
    NotExecutable(PathBuf),

    /// fork(2) failed, in the supervisor or in the watcher
    #[error("fork failed: {0}")]
    Fork(#[source] Errno),

    /// SIGCHLD disposition could not be changed
    #[error("failed to set SIGCHLD disposition: {0}")]
    Signal(#[source] Errno),

    #[error("could not open display: {0}")]
    NoDisplay(#[from] ConnectError),

    #[error("failed to obtain the root window of screen {0}")]
    NoRootWindow(usize),

    /// The display connection broke after it was established
    #[error("display connection failed: {0}")]
    Connection(#[from] ConnectionError),
}
