//! majic - a bespoke CLI for day-to-day tasks

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = majic_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
