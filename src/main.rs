//! `forecasty` binary; all behavior lives in `forecasty::app`.

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(err) = forecasty::app::run() {
        eprintln!("forecasty: {err}");
        return ExitCode::from(err.exit_code());
    }
    ExitCode::SUCCESS
}
