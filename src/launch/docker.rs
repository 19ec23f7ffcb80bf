use std::{
    borrow::Cow,
    ffi::{OsStr, OsString},
    fmt,
    path::Path,
    process::Command,
};

use super::{
    nvidia::NvidiaImages,
    options::LaunchOptions,
    script::{ScriptHeader, ScriptPath},
};
use crate::{HOST_CWD_VAR, config::ConfigFile};

/// Invoking the launcher under this name always selects `nvidia-docker`.
pub const NVIDIA_INVOCATION_NAME: &str = "nvidia-docker-script";

const SCRIPT_DIR_MOUNT: &str = "/scriptdir";
const WORKING_DIR_MOUNT: &str = "/workingdir";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockerFlavor {
    Vanilla,
    Nvidia,
}

impl DockerFlavor {
    pub fn select(
        options: &LaunchOptions,
        header: &ScriptHeader,
        nvidia_images: &NvidiaImages,
        program_name: &OsStr,
    ) -> Self {
        let invoked_as_nvidia =
            Path::new(program_name).file_name() == Some(OsStr::new(NVIDIA_INVOCATION_NAME));
        if options.force_nvidia || invoked_as_nvidia || nvidia_images.requires_nvidia(header) {
            Self::Nvidia
        } else {
            Self::Vanilla
        }
    }

    pub fn program(self, config: &ConfigFile) -> &str {
        match self {
            Self::Vanilla => config.docker.as_deref().unwrap_or("docker"),
            Self::Nvidia => config.nvidia_docker.as_deref().unwrap_or("nvidia-docker"),
        }
    }
}

fn concat(parts: &[&OsStr]) -> OsString {
    let mut joined = OsString::new();
    for part in parts {
        joined.push(part);
    }
    joined
}

/// A `docker run` invocation, kept as an argument vector rather than a shell string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerCommand {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl DockerCommand {
    pub fn build(
        program: &str,
        header: &ScriptHeader,
        script: &ScriptPath,
        working_dir: &Path,
        options: &LaunchOptions,
    ) -> Self {
        let mut args: Vec<OsString> = vec![
            "run".into(),
            concat(&[
                OsStr::new("-v"),
                script.dir.as_os_str(),
                OsStr::new(":"),
                OsStr::new(SCRIPT_DIR_MOUNT),
            ]),
            concat(&[
                OsStr::new("-v"),
                working_dir.as_os_str(),
                OsStr::new(":"),
                OsStr::new(WORKING_DIR_MOUNT),
            ]),
        ];
        if options.debug {
            args.push("--privileged=true".into());
        }
        args.push(format!("--workdir={}", WORKING_DIR_MOUNT).into());
        args.push("-e".into());
        args.push(concat(&[
            OsStr::new(HOST_CWD_VAR),
            OsStr::new("="),
            working_dir.as_os_str(),
        ]));
        args.push(if options.interactive { "-ti" } else { "-t" }.into());
        if let Some(name) = &options.name {
            args.push("--name".into());
            args.push(name.into());
        }
        args.push("--rm".into());
        args.push("--entrypoint=".into());
        args.push(header.image.as_str().into());
        args.push(header.interpreter.as_str().into());
        args.push(concat(&[
            OsStr::new(SCRIPT_DIR_MOUNT),
            OsStr::new("/"),
            script.file_name.as_os_str(),
        ]));
        args.extend(options.script_args.iter().cloned());

        tracing::debug!(program, ?args, "Built docker command");
        Self {
            program: program.into(),
            args,
        }
    }

    /// Replace the current process with docker where possible.
    ///
    /// Only returns on failure; elsewhere than unix, exits with docker's status code.
    pub fn exec(self) -> anyhow::Error {
        let program = match which::which(&self.program) {
            Ok(program) => program,
            Err(err) => {
                return anyhow::Error::from(err)
                    .context(format!("Could not find {:?} on PATH", self.program));
            }
        };
        tracing::info!(?program, "Executing docker");

        let mut docker_command = Command::new(&program);
        docker_command.args(&self.args);

        #[cfg(unix)]
        return anyhow::Error::from(std::os::unix::process::CommandExt::exec(
            &mut docker_command,
        ))
        .context(format!("Failed to execute {:?}", program));

        #[cfg(not(unix))]
        match docker_command.status() {
            Err(err) => anyhow::Error::from(err).context(format!("Failed to execute {:?}", program)),
            Ok(status) => std::process::exit(status.code().unwrap_or(1)),
        }
    }
}

/// Quote `arg` for display unless it is made of shell-safe characters only.
pub fn shell_quote(arg: &str) -> Cow<'_, str> {
    let is_safe = |c: char| c.is_ascii_alphanumeric() || "_./:=@%+,-".contains(c);
    if !arg.is_empty() && arg.chars().all(is_safe) {
        return Cow::Borrowed(arg);
    }
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

pub fn shell_join<'a>(args: impl IntoIterator<Item = &'a OsStr>) -> String {
    args.into_iter()
        .map(|arg| shell_quote(&arg.to_string_lossy()).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for DockerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str));
        f.write_str(&shell_join(words))
    }
}
