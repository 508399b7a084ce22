use clap::Parser;
use urlgrab_core::logging;

mod cli;
mod server;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging as early as possible.
    logging::init(cli.command.log_target());

    if let Err(err) = cli.run().await {
        eprintln!("urlgrab error: {:#}", err);
        std::process::exit(1);
    }
}
