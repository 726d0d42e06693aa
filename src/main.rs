use clap::Parser;
use namesort::cli::{Cli, run_cli_with_cancellation};
use namesort::events::CancellationToken;
use namesort::output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Ctrl+C stops the run after the file in progress.
    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        OutputFormatter::warning(&format!("Ctrl+C will not stop runs cleanly: {}", e));
    }

    match run_cli_with_cancellation(cli, cancel) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&format!("Error: {}", e));
            ExitCode::FAILURE
        }
    }
}
