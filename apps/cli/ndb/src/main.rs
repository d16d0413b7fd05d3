use ndb::app;
use ndb::cli::Args;

use ndb_core::session::Termination;

use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match app::run(args).await {
        Ok(Termination::CleanExit) => {
            info!("Session ended");
            ExitCode::SUCCESS
        }
        Ok(Termination::Failed(e)) => {
            error!("Session failed: {e}");
            println!("{e}");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{e}");
            println!("{e}");
            ExitCode::FAILURE
        }
    }
}
