mod bootstrap;
mod loop_runner;
mod sim;

use std::process::ExitCode;

use tracing::error;

/// Uncaught errors surface exactly once here, at the application boundary.
pub(crate) fn run() -> ExitCode {
    let wiring = match bootstrap::build_app() {
        Ok(wiring) => wiring,
        Err(err) => {
            error!(error = %err, "startup_failed");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = loop_runner::run_app(wiring) {
        error!(error = %err, "unhandled_error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
