use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
};

use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("test should succeed"),
        }
    }

    fn root(&self) -> PathBuf {
        fs::canonicalize(self.dir.path()).expect("test should succeed")
    }

    fn script(&self, name: &str, second_line: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(
            &path,
            format!("#!/usr/bin/env docker-script\n{}\n", second_line),
        )
        .expect("test should succeed");
        path
    }

    /// The launcher run from the workspace, isolated from any user config.
    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_docker-script"));
        command
            .args(args)
            .current_dir(self.dir.path())
            .env("DOCKER_SCRIPT_CONFIG", self.dir.path().join("config.toml"))
            .env_remove("DOCKER_SCRIPT_LOG");
        command
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command(args).output().expect("test should succeed")
    }

    fn write_config(&self, contents: &str) {
        fs::write(self.dir.path().join("config.toml"), contents).expect("test should succeed");
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn script_arg(path: &Path) -> &str {
    path.to_str().expect("test should succeed")
}

#[test]
fn test_no_arguments_prints_usage() {
    let workspace = Workspace::new();
    let output = workspace.run(&[]);
    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("<SCRIPT> [options] [args for script]"));
    assert!(stderr(&output).contains("---dry-run"));
}

#[test]
fn test_dry_run_prints_command() {
    let workspace = Workspace::new();
    let script = workspace.script("test.py", "#!python:latest python");
    let output = workspace.run(&[script_arg(&script), "---dry-run", "a", "b"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let root = workspace.root();
    let expected = format!(
        "docker run -v{root}:/scriptdir -v{root}:/workingdir --workdir=/workingdir \
         -e HOST_CWD={root} -ti --rm --entrypoint= python:latest python /scriptdir/test.py a b\n",
        root = root.display()
    );
    assert_eq!(stdout(&output), expected);
}

#[test]
fn test_dry_run_with_launcher_options() {
    let workspace = Workspace::new();
    let script = workspace.script("job.sh", "#!alpine:3 sh");
    let output = workspace.run(&[
        script_arg(&script),
        "---dry-run",
        "---debug",
        "---non-interactive",
        "---name=job",
        "--keep",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));

    let command = stdout(&output);
    assert!(command.contains(" --privileged=true "));
    assert!(command.contains(" -t --name job --rm "));
    assert!(command.trim_end().ends_with("/scriptdir/job.sh --keep"));
}

#[test]
fn test_gpu_image_selects_nvidia_docker() {
    let workspace = Workspace::new();
    let script = workspace.script("train.py", "#!nvidia/cuda:9.0-devel python3");
    let output = workspace.run(&[script_arg(&script), "---dry-run"]);
    assert!(stdout(&output).starts_with("nvidia-docker run "));
}

#[test]
fn test_config_adds_gpu_images() {
    let workspace = Workspace::new();
    workspace.write_config("nvidia_images = [\"lab/trainer\"]\n");
    let script = workspace.script("train.py", "#!lab/trainer:v2 python3");
    let output = workspace.run(&[script_arg(&script), "---dry-run"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).starts_with("nvidia-docker run "));
}

#[test]
fn test_invalid_config_fails() {
    let workspace = Workspace::new();
    workspace.write_config("nvidia_images = [\"\"]\n");
    let script = workspace.script("test.py", "#!python:latest python");
    let output = workspace.run(&[script_arg(&script), "---dry-run"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("nvidia_images[0] must not be empty"));
}

#[test]
fn test_verbose_writes_details_to_stderr() {
    let workspace = Workspace::new();
    let script = workspace.script("test.py", "#!python:latest python");
    let output = workspace.run(&[script_arg(&script), "---dry-run", "---verbose"]);
    assert!(output.status.success());

    let details = stderr(&output);
    assert!(details.contains("Docker image:       python:latest"));
    assert!(details.contains("Script basename:    test.py"));
    assert!(details.contains("Docker command:"));
    assert!(stdout(&output).starts_with("docker run "));
}

#[test]
fn test_missing_script_fails() {
    let workspace = Workspace::new();
    let output = workspace.run(&["missing.py", "---dry-run"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("Error: failed to open script file"));
}

#[test]
fn test_script_without_second_shebang_fails() {
    let workspace = Workspace::new();
    let script = workspace.script("plain.py", "print('hi')");
    let output = workspace.run(&[script_arg(&script), "---dry-run"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("invalid second shebang line"));
}

#[test]
fn test_script_path_starting_with_hyphen() {
    let workspace = Workspace::new();
    workspace.script("-x.py", "#!python:latest python");
    let output = workspace.run(&["-x.py", "---dry-run", "-v"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).trim_end().ends_with("/scriptdir/-x.py -v"));
}

#[test]
fn test_missing_hyphen_script_reports_error() {
    let workspace = Workspace::new();
    let output = workspace.run(&["-nope.py"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("Error: failed to open script file"));
}

#[test]
fn test_help_as_first_argument() {
    let workspace = Workspace::new();
    for flag in ["-h", "--help"] {
        let output = workspace.run(&[flag]);
        assert!(output.status.success(), "{flag}");
        let help = stdout(&output);
        assert!(help.contains("Run script files inside Docker containers"), "{help}");
        assert!(help.contains("#!<IMAGE> <INTERPRETER>"), "{help}");
    }
}

#[test]
fn test_version_as_first_argument() {
    let workspace = Workspace::new();
    for flag in ["-V", "--version"] {
        let output = workspace.run(&[flag]);
        assert!(output.status.success(), "{flag}");
        assert_eq!(
            stdout(&output).trim_end(),
            format!("docker-script {}", env!("CARGO_PKG_VERSION"))
        );
    }
}

#[test]
fn test_help_after_script_is_forwarded() {
    let workspace = Workspace::new();
    let script = workspace.script("test.py", "#!python:latest python");
    let output = workspace.run(&[script_arg(&script), "---dry-run", "--help"]);
    assert!(output.status.success());
    assert!(stdout(&output).trim_end().ends_with("/scriptdir/test.py --help"));
}

#[test]
fn test_dry_run_closed_stdout_does_not_panic() {
    let workspace = Workspace::new();
    let script = workspace.script("test.py", "#!python:latest python");
    let mut child = workspace
        .command(&[script_arg(&script), "---dry-run"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("test should succeed");
    drop(child.stdout.take());
    let output = child.wait_with_output().expect("test should succeed");
    assert!(!stderr(&output).contains("panicked"));
}
