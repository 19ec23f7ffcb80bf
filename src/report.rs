//! Four-line snapshot of the environment a script runs in.
//!
//! `docker-script` passes its own working directory to the container as
//! [`HOST_CWD_VAR`]; printing it next to the container's working directory
//! shows whether the mounts line up.

use std::{
    env,
    ffi::{OsStr, OsString},
    fmt,
    path::PathBuf,
};

use anyhow::{Context as _, anyhow};
use platform_info::{PlatformInfo, PlatformInfoAPI as _, UNameAPI as _};

use crate::HOST_CWD_VAR;

/// Kernel identification, as reported by `uname`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsIdentity {
    pub sysname: String,
    pub release: String,
    pub machine: String,
}

pub fn uname() -> anyhow::Result<OsIdentity> {
    let info = PlatformInfo::new()
        .map_err(|err| anyhow!("Failed to read OS identification: {err}"))?;
    Ok(OsIdentity {
        sysname: info.sysname().to_string_lossy().into_owned(),
        release: info.release().to_string_lossy().into_owned(),
        machine: info.machine().to_string_lossy().into_owned(),
    })
}

pub fn getcwd() -> anyhow::Result<PathBuf> {
    env::current_dir().context("Failed to get current working directory")
}

/// Look up a required environment variable. There is no fallback value.
pub fn lookup_env(key: &str) -> anyhow::Result<OsString> {
    lookup_with(key, |key| env::var_os(key))
}

fn lookup_with(
    key: &str,
    lookup: impl FnOnce(&str) -> Option<OsString>,
) -> anyhow::Result<OsString> {
    lookup(key).with_context(|| format!("environment variable {key} not found"))
}

pub fn get_argv() -> Vec<OsString> {
    env::args_os().collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub os: OsIdentity,
    pub guest_cwd: PathBuf,
    pub host_cwd: OsString,
    pub argv: Vec<OsString>,
}

impl Report {
    pub fn gather() -> anyhow::Result<Self> {
        Self::gather_from(get_argv(), |key| env::var_os(key))
    }

    pub fn gather_from(
        argv: Vec<OsString>,
        lookup: impl FnOnce(&str) -> Option<OsString>,
    ) -> anyhow::Result<Self> {
        let os = uname()?;
        let guest_cwd = getcwd()?;
        let host_cwd = lookup_with(HOST_CWD_VAR, lookup)?;
        tracing::debug!(?os, ?guest_cwd, ?host_cwd, argc = argv.len(), "gathered report");
        Ok(Self {
            os,
            guest_cwd,
            host_cwd,
            argv,
        })
    }
}

fn join_lossy<'a>(values: impl IntoIterator<Item = &'a OsStr>) -> String {
    values
        .into_iter()
        .map(OsStr::to_string_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Uname:     {} {} {}",
            self.os.sysname, self.os.release, self.os.machine
        )?;
        writeln!(f, "Guest CWD: {}", self.guest_cwd.display())?;
        writeln!(f, "Host CWD:  {}", self.host_cwd.to_string_lossy())?;
        writeln!(
            f,
            "argv:      {}",
            join_lossy(self.argv.iter().map(OsString::as_os_str))
        )
    }
}
