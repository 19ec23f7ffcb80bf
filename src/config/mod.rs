mod config_file;

use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
pub use config_file::ConfigFile;

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "DOCKER_SCRIPT_CONFIG";

pub fn config_path() -> anyhow::Result<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("docker-script")
        .join("config.toml"))
}

pub fn load() -> anyhow::Result<ConfigFile> {
    load_from(&config_path()?)
}

/// Read the config file at `config_path`. A missing file is an empty config.
pub fn load_from(config_path: &Path) -> anyhow::Result<ConfigFile> {
    let toml_config_str = match fs::read_to_string(config_path) {
        Ok(s) => s,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(?config_path, "No config file, using defaults");
            return Ok(ConfigFile::default());
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("Failed to read config file at {:?}", config_path));
        }
    };

    let config = config_file::parse(&toml_config_str)
        .with_context(|| format!("Invalid config file at {:?}", config_path))?;
    tracing::debug!(?config_path, ?config, "Loaded config");
    Ok(config)
}
