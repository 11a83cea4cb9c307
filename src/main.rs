use std::process::ExitCode;

use clap::Parser;
use filterer::{cli, logger};

fn main() -> ExitCode {
    let args = cli::CliArgs::parse();
    // Run log (overwrites the previous run's log)
    logger::init(args.log.as_deref());
    let code = cli::run(args);
    filterer::log_info!("Run finished: {:?}", code);
    code
}
