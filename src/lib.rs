pub mod config;
pub mod launch;
pub mod logging;
pub mod report;

use std::{
    env::{self, args_os},
    ffi::{OsStr, OsString},
    io::{self, Write as _},
    path::PathBuf,
};

use anyhow::Context as _;
use clap::Parser;
use launch::{Launch, options::LaunchOptions};

/// Name of the variable carrying the launcher's working directory into the container.
pub const HOST_CWD_VAR: &str = "HOST_CWD";

const SCRIPT_FORMAT_HELP: &str = "\
The first line of the script file should be a normal Unix shebang line.
The second line of the script file should be:
#!<IMAGE> <INTERPRETER>

Supported options:
---verbose            Enable verbose output
---debug              Enable debugging inside the container
---non-interactive    Non-interactive mode
---nvidia-docker      Use `nvidia-docker` instead of `docker`
---dry-run            Output generated command instead of running it
---name=NAME          Specify container name
";

#[derive(Debug, Parser)]
#[command(
    version,
    name = "docker-script",
    about = "Run script files inside Docker containers",
    override_usage = "docker-script <SCRIPT> [options] [args for script]",
    after_help = SCRIPT_FORMAT_HELP
)]
struct Opt {
    /// Script file to run. Options and arguments after it are handled separately.
    script: PathBuf,
}

fn usage(program_name: &OsString) -> String {
    format!(
        "Usage:\n{} <SCRIPT> [options] [args for script]\n\n{}",
        program_name.to_string_lossy(),
        SCRIPT_FORMAT_HELP
    )
}

/// Only these are handled by clap; any other first argument is the script path,
/// even when it starts with `-`.
fn is_help_or_version(arg: &OsStr) -> bool {
    ["-h", "--help", "-V", "--version"]
        .iter()
        .any(|flag| arg == *flag)
}

pub fn cli_main() -> anyhow::Result<()> {
    let mut args = args_os();
    let program_name = args.next().unwrap_or_else(|| OsString::from("docker-script"));

    let Some(script_arg) = args.next() else {
        eprintln!("{}", usage(&program_name));
        return Ok(());
    };

    // Everything after the script argument belongs to the script even when it
    // looks like a flag.
    let script = if is_help_or_version(&script_arg) {
        Opt::parse_from([program_name.clone(), script_arg]).script
    } else {
        PathBuf::from(script_arg)
    };
    let options = LaunchOptions::parse(args);

    let config = config::load()?;
    let working_dir = env::current_dir().context("Failed to get current working directory")?;

    let launch = Launch::prepare(&script, &program_name, options, &config, working_dir)?;

    if launch.options.verbose {
        eprintln!("{}", launch.verbose_summary());
    }

    if launch.options.dry_run {
        writeln!(io::stdout().lock(), "{}", launch.command)
            .context("Failed to write docker command to stdout")?;
        return Ok(());
    }

    Err(launch.command.exec())
}
