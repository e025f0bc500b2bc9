use clap::Parser;
use scrayper_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Only a harvest keeps a run log; it starts in the working directory.
    let run_log = if cli.command.keeps_run_log() {
        match std::env::current_dir()
            .map_err(anyhow::Error::from)
            .and_then(|dir| logging::init_run_logging(&dir))
        {
            Ok(log) => Some(log),
            Err(err) => {
                logging::init_logging_stdout();
                tracing::warn!("run log unavailable, logging to stdout only: {:#}", err);
                None
            }
        }
    } else {
        logging::init_logging_stdout();
        None
    };

    if let Err(err) = cli.run(run_log).await {
        eprintln!("scrayper error: {:#}", err);
        std::process::exit(1);
    }
}
