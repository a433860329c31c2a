//! wfimport binary entry point.

use anyhow::Result;
use clap::Parser;
use wfimport::cli;
use wfimport::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let config = cli.build_config();
    config.init_logging();

    match cli.execute_with_config(config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
