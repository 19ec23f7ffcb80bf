use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_spanned::Spanned;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    /// Program used for plain images. Defaults to `docker`.
    pub docker: Option<String>,
    /// Program used for GPU images. Defaults to `nvidia-docker`.
    pub nvidia_docker: Option<String>,
    /// Images that need `nvidia-docker`, on top of the built-in list.
    pub nvidia_images: Vec<String>,
}

/// Span-aware config for better error reporting
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct SpannedConfigFile {
    docker: Option<Spanned<String>>,
    nvidia_docker: Option<Spanned<String>>,
    #[serde(default)]
    nvidia_images: Vec<Spanned<String>>,
}

fn line_of(toml_config_str: &str, offset: usize) -> usize {
    toml_config_str
        .bytes()
        .take(offset)
        .filter(|&b| b == b'\n')
        .count()
        + 1
}

/// Parse the contents of a config file.
///
/// Returns an error if the TOML is malformed, has unknown keys, or contains an empty string.
pub fn parse(toml_config_str: &str) -> Result<ConfigFile> {
    let spanned: SpannedConfigFile =
        toml_edit::de::from_str(toml_config_str).context("Failed to parse TOML configuration")?;

    let non_empty = |key: &str, value: Spanned<String>| -> Result<String> {
        if value.get_ref().trim().is_empty() {
            bail!(
                "{} must not be empty (line {})",
                key,
                line_of(toml_config_str, value.span().start)
            );
        }
        Ok(value.into_inner())
    };

    let docker = spanned
        .docker
        .map(|value| non_empty("docker", value))
        .transpose()?;
    let nvidia_docker = spanned
        .nvidia_docker
        .map(|value| non_empty("nvidia_docker", value))
        .transpose()?;

    let mut nvidia_images = Vec::with_capacity(spanned.nvidia_images.len());
    for (idx, image) in spanned.nvidia_images.into_iter().enumerate() {
        nvidia_images.push(non_empty(&format!("nvidia_images[{}]", idx), image)?);
    }

    Ok(ConfigFile {
        docker,
        nvidia_docker,
        nvidia_images,
    })
}
