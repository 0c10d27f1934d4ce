//! watchtower viewer.
//!
//! Usage: `watchtower [config.json]`

use std::process::ExitCode;

fn main() -> ExitCode {
    let _ = env_logger::try_init();

    let result = match std::env::args_os().nth(1) {
        Some(path) => {
            log::info!("loading configuration from {}", path.to_string_lossy());
            watchtower::run_with_config_file(path)
        }
        None => watchtower::run(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("watchtower: {e}");
            ExitCode::FAILURE
        }
    }
}
