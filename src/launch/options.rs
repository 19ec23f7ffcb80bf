use std::ffi::OsString;

/// Launcher options use a `---` prefix so they never collide with the script's own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    pub verbose: bool,
    /// Run the container with `--privileged=true`.
    pub debug: bool,
    pub interactive: bool,
    pub force_nvidia: bool,
    pub dry_run: bool,
    pub name: Option<String>,
    /// Arguments forwarded to the script, in order.
    pub script_args: Vec<OsString>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            debug: false,
            interactive: true,
            force_nvidia: false,
            dry_run: false,
            name: None,
            script_args: Vec::new(),
        }
    }
}

impl LaunchOptions {
    /// Split the arguments following the script path into launcher options and script arguments.
    pub fn parse(args: impl IntoIterator<Item = OsString>) -> Self {
        let mut options = Self::default();
        for arg in args {
            if arg == "---verbose" {
                options.verbose = true;
            } else if arg == "---debug" {
                options.debug = true;
            } else if arg == "---non-interactive" {
                options.interactive = false;
            } else if arg == "---nvidia-docker" {
                options.force_nvidia = true;
            } else if arg == "---dry-run" {
                options.dry_run = true;
            } else if let Some(name) = arg.to_str().and_then(|s| s.strip_prefix("---name=")) {
                options.name = (!name.is_empty()).then(|| name.to_string());
            } else {
                options.script_args.push(arg);
            }
        }
        options
    }
}
