//! Application-wide constants
//!
//! Single source of truth for the delays, exit statuses and identities used
//! by the supervisor, the watcher and the spawned children.

/// Spawned child constants
pub mod spawn {
    /// Seconds a spawned child sleeps before replacing its image
    pub const DEFAULT_DELAY_SECS: u64 = 5;
}

/// Process exit statuses
pub mod exit {
    /// Any validation, display or fork failure
    pub const FAILURE: u8 = 1;

    /// Status of a spawned child whose execve failed (shell convention)
    pub const EXEC_FAILED: i32 = 127;
}

/// System log identity
pub mod syslog {
    use std::ffi::CStr;

    /// Identity passed to openlog(3). Must outlive the process, hence static.
    pub const IDENT: &CStr = c"rootwatch";
}
