use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directives for both binaries, e.g. `DOCKER_SCRIPT_LOG=docker_script=debug`.
pub const LOG_ENV: &str = "DOCKER_SCRIPT_LOG";

/// Install the stderr subscriber. Stdout stays reserved for program output.
pub fn init() {
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    if let Err(err) = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
    {
        eprintln!("Failed to initialize logging: {err}");
    }
}
