//! Regression tree server.
//!
//! Usage:
//!   regtree-server [--port 8080] [--data-dir tables] [--model-dir trees] ...
//!
//! Run with `--help` for every option.
use std::process::ExitCode;

use regtree::{settings::USAGE, CsvTableSource, Server, ServerSettings, SettingsError};

fn main() -> ExitCode {
    let settings = match ServerSettings::from_args(std::env::args().skip(1)) {
        Ok(settings) => settings,
        Err(SettingsError::HelpRequested) => {
            eprintln!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(error) => {
            eprintln!("{error}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };
    let source = CsvTableSource::new(&settings.data_dir);
    let server = match Server::bind(settings, source) {
        Ok(server) => server,
        Err(error) => {
            eprintln!("cannot start the server: {error}");
            return ExitCode::FAILURE;
        }
    };
    match server.serve() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}
