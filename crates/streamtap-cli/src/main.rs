use streamtap_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    // The progress line owns stderr, so prefer the log file.
    if let Err(err) = logging::init_logging() {
        if logging::init_logging_stderr().is_ok() {
            tracing::warn!("file logging unavailable: {:#}", err);
        }
    }

    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("streamtap error: {:#}", err);
        std::process::exit(1);
    }
}
