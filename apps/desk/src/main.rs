//! # Tillpoint Desk Entry Point
//!
//! ```text
//! tillpoint-desk [--config <desk.toml>]
//! ```
//!
//! The actual setup is in lib.rs so it can be tested.

use std::path::PathBuf;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let config_path = match (args.next().as_deref(), args.next()) {
        (None, _) => None,
        (Some("--config" | "-c"), Some(path)) => Some(PathBuf::from(path)),
        _ => {
            eprintln!("usage: tillpoint-desk [--config <desk.toml>]");
            return ExitCode::from(2);
        }
    };

    match tillpoint_desk::run(config_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tillpoint-desk: {e}");
            ExitCode::FAILURE
        }
    }
}
