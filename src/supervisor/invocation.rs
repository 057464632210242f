//! The program to run on every geometry change

use std::ffi::{CStr, CString, OsStr, OsString};
use std::os::unix::ffi::OsStringExt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Target path, argument vector and environment, captured once at startup.
///
/// Everything is converted to C strings up front so a forked child can go
/// straight to execve(2) without building anything.
#[derive(Debug, Clone)]
pub struct TargetInvocation {
    path: PathBuf,
    argv: Vec<CString>,
    envp: Vec<CString>,
}

impl TargetInvocation {
    /// Build from the target-onward argument list and an environment.
    ///
    /// `args[0]` is the target and also becomes the child's `argv[0]`.
    pub fn capture<E>(args: Vec<OsString>, env: E) -> Result<Self>
    where
        E: IntoIterator<Item = (OsString, OsString)>,
    {
        let target = validate_arguments(&args)?;
        let path = PathBuf::from(target);

        let argv = args
            .into_iter()
            .map(to_cstring)
            .collect::<Result<Vec<_>>>()?;

        let envp = env
            .into_iter()
            .map(|(key, value)| {
                let mut entry = key;
                entry.push("=");
                entry.push(value);
                to_cstring(entry)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { path, argv, envp })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Same bytes as [`Self::path`], ready for execve
    pub fn exec_path(&self) -> &CStr {
        &self.argv[0]
    }

    pub fn argv(&self) -> &[CString] {
        &self.argv
    }

    pub fn envp(&self) -> &[CString] {
        &self.envp
    }
}

/// Fails with [`Error::MissingArgument`] when no target was supplied.
pub fn validate_arguments(args: &[OsString]) -> Result<&OsStr> {
    args.first()
        .map(OsString::as_os_str)
        .ok_or(Error::MissingArgument)
}

fn to_cstring(value: OsString) -> Result<CString> {
    CString::new(value.into_vec())
        .map_err(|err| Error::InvalidArgument(OsString::from_vec(err.into_vec())))
}
