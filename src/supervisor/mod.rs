//! Process supervisor - validates the target and detaches the watcher
//!
//! The invoking process never waits for anything: it checks its arguments,
//! forks once, announces the background pid and exits.

mod invocation;

use std::path::Path;

use nix::sys::stat::{Mode, stat};
use nix::unistd::Pid;

use crate::error::{Error, Result};
use crate::process::{Fork, Forked};

pub use invocation::TargetInvocation;

/// Outcome of [`detach`], seen from each side of the fork
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detached {
    /// The original invocation; it should exit successfully right away
    Invoker { worker: Pid },
    /// The background process that must become the watcher
    Worker,
}

/// Fails unless `path` exists and has the owner-executable bit set.
pub fn validate_target(path: &Path) -> Result<()> {
    match stat(path) {
        Ok(st) if Mode::from_bits_truncate(st.st_mode).contains(Mode::S_IXUSR) => Ok(()),
        _ => Err(Error::NotExecutable(path.to_path_buf())),
    }
}

/// Fork the background worker.
///
/// The invoker side gets the worker's pid and must not wait for it.
pub fn detach(forker: &mut impl Fork) -> Result<Detached> {
    match forker.fork()? {
        Forked::Parent { child } => Ok(Detached::Invoker { worker: child }),
        Forked::Child => Ok(Detached::Worker),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::errno::Errno;
    use std::fs::{self, File, Permissions};
    use std::os::unix::fs::PermissionsExt;

    /// Fork double that replays scripted results and counts calls
    struct ScriptedFork {
        results: Vec<Result<Forked>>,
        calls: usize,
    }

    impl ScriptedFork {
        fn new(results: Vec<Result<Forked>>) -> Self {
            Self { results, calls: 0 }
        }
    }

    impl Fork for ScriptedFork {
        fn fork(&mut self) -> Result<Forked> {
            self.calls += 1;
            self.results.remove(0)
        }
    }

    fn file_with_mode(dir: &tempfile::TempDir, name: &str, mode: u32) -> std::path::PathBuf {
        let path = dir.path().join(name);
        File::create(&path).unwrap();
        fs::set_permissions(&path, Permissions::from_mode(mode)).unwrap();
        path
    }

    #[test]
    fn test_validate_target_requires_owner_exec_bit() {
        let dir = tempfile::tempdir().unwrap();

        let runnable = file_with_mode(&dir, "hook", 0o744);
        assert!(validate_target(&runnable).is_ok());

        let plain = file_with_mode(&dir, "plain", 0o644);
        assert!(matches!(
            validate_target(&plain),
            Err(Error::NotExecutable(p)) if p == plain
        ));

        // Group and other bits do not count
        let others_only = file_with_mode(&dir, "others", 0o611);
        assert!(validate_target(&others_only).is_err());
    }

    #[test]
    fn test_validate_target_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(matches!(
            validate_target(&missing),
            Err(Error::NotExecutable(_))
        ));
    }

    #[test]
    fn test_detach_parent_reports_worker() {
        let worker = Pid::from_raw(4242);
        let mut forker = ScriptedFork::new(vec![Ok(Forked::Parent { child: worker })]);

        assert_eq!(detach(&mut forker).unwrap(), Detached::Invoker { worker });
        assert_eq!(forker.calls, 1);
    }

    #[test]
    fn test_detach_child_becomes_worker() {
        let mut forker = ScriptedFork::new(vec![Ok(Forked::Child)]);

        assert_eq!(detach(&mut forker).unwrap(), Detached::Worker);
        assert_eq!(forker.calls, 1);
    }

    #[test]
    fn test_detach_fork_failure_is_not_retried() {
        let mut forker = ScriptedFork::new(vec![Err(Error::Fork(Errno::EAGAIN))]);

        assert!(matches!(
            detach(&mut forker),
            Err(Error::Fork(Errno::EAGAIN))
        ));
        assert_eq!(forker.calls, 1);
    }
}
