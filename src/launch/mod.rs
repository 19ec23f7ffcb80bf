pub mod docker;
pub mod nvidia;
pub mod options;
pub mod script;

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use docker::{DockerCommand, DockerFlavor, shell_join};
use nvidia::NvidiaImages;
use options::LaunchOptions;
use script::{ScriptHeader, ScriptPath};

use crate::config::ConfigFile;

/// Everything needed to run one script, resolved before docker is touched.
#[derive(Debug)]
pub struct Launch {
    pub header: ScriptHeader,
    pub script: ScriptPath,
    pub working_dir: PathBuf,
    pub flavor: DockerFlavor,
    pub command: DockerCommand,
    pub options: LaunchOptions,
}

impl Launch {
    pub fn prepare(
        script_path: &Path,
        program_name: &OsString,
        options: LaunchOptions,
        config: &ConfigFile,
        working_dir: PathBuf,
    ) -> anyhow::Result<Self> {
        let header = ScriptHeader::read(script_path)?;
        let script = ScriptPath::resolve(script_path)?;

        let nvidia_images = NvidiaImages::new(config.nvidia_images.iter().cloned());
        let flavor = DockerFlavor::select(&options, &header, &nvidia_images, program_name);
        tracing::debug!(image = %header.image, ?flavor, "Selected docker flavor");

        let command = DockerCommand::build(
            flavor.program(config),
            &header,
            &script,
            &working_dir,
            &options,
        );

        Ok(Self {
            header,
            script,
            working_dir,
            flavor,
            command,
            options,
        })
    }

    pub fn verbose_summary(&self) -> String {
        format!(
            "Docker image:       {}\n\
             Interpreter:        {}\n\
             Script path:        {}\n\
             Script basename:    {}\n\
             Script dirname:     {}\n\
             Working directory:  {}\n\
             Trailing arguments: {}\n\
             \n\
             Docker command:\n\
             {}\n",
            self.header.image,
            self.header.interpreter,
            self.script.path.display(),
            self.script.file_name.to_string_lossy(),
            self.script.dir.display(),
            self.working_dir.display(),
            shell_join(self.options.script_args.iter().map(OsString::as_os_str)),
            self.command,
        )
    }
}
