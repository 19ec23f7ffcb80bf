use std::process::ExitCode;

fn main() -> ExitCode {
    docker_script::logging::init();
    match docker_script::cli_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}\n");
            ExitCode::FAILURE
        }
    }
}
