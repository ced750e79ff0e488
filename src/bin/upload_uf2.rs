use std::process::ExitCode;

use upload_uf2::flags::{UploadUf2, USAGE};
use upload_uf2::upload;
use upload_uf2::volume::SystemVolumes;

fn main() -> ExitCode {
    let flags = match UploadUf2::from_env() {
        Ok(flags) => flags,
        Err(err) if err.is_help() => {
            println!("{err}");
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            println!("{err}");
            println!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    env_logger::Builder::new()
        .filter_level(flags.log_level())
        .parse_default_env()
        .init();

    upload::run(&flags, &SystemVolumes).exit_code()
}
