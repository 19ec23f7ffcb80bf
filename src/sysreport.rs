use std::io::{self, Write as _};

use anyhow::Context as _;
use docker_script::report::Report;

fn main() -> anyhow::Result<()> {
    docker_script::logging::init();
    let report = Report::gather()?;

    let mut stdout = io::stdout().lock();
    write!(stdout, "{report}").context("Failed to write report to stdout")?;
    stdout.flush().context("Failed to write report to stdout")?;
    Ok(())
}
