use std::{
    ffi::OsString,
    fs::{self, File},
    io::{BufRead as _, BufReader},
    path::{Path, PathBuf},
};

use anyhow::{Context as _, bail};

/// The second shebang line of a script: `#!<IMAGE> <INTERPRETER>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptHeader {
    pub image: String,
    pub interpreter: String,
}

impl ScriptHeader {
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let file =
            File::open(path).with_context(|| format!("failed to open script file {:?}", path))?;

        let second_line = match BufReader::new(file).lines().nth(1) {
            Some(line) => line
                .with_context(|| format!("failed to read second shebang line from {:?}", path))?,
            None => bail!("failed to read second shebang line from {:?}", path),
        };

        Self::parse_line(&second_line)
            .with_context(|| format!("invalid second shebang line in script file {:?}", path))
    }

    /// Image is everything between `#!` and the first space, interpreter everything after it.
    pub fn parse_line(line: &str) -> anyhow::Result<Self> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let Some((image, interpreter)) = line
            .strip_prefix("#!")
            .and_then(|rest| rest.split_once(' '))
        else {
            bail!("expected `#!<IMAGE> <INTERPRETER>`, found {:?}", line);
        };
        if image.is_empty() || interpreter.trim().is_empty() {
            bail!("expected `#!<IMAGE> <INTERPRETER>`, found {:?}", line);
        }
        Ok(Self {
            image: image.to_string(),
            interpreter: interpreter.to_string(),
        })
    }

    pub fn image_without_tag(&self) -> &str {
        self.image
            .split_once(':')
            .map_or(self.image.as_str(), |(name, _tag)| name)
    }
}

/// Absolute location of the script, split the way the container mounts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPath {
    pub path: PathBuf,
    pub dir: PathBuf,
    pub file_name: OsString,
}

impl ScriptPath {
    pub fn resolve(path: &Path) -> anyhow::Result<Self> {
        let path = fs::canonicalize(path)
            .with_context(|| format!("Failed to resolve script path {:?}", path))?;
        let file_name = path
            .file_name()
            .with_context(|| format!("Script path has no file name: {:?}", &path))?
            .to_os_string();
        let dir = path
            .parent()
            .with_context(|| format!("Script path has no parent directory: {:?}", &path))?
            .to_path_buf();
        Ok(Self {
            path,
            dir,
            file_name,
        })
    }
}
