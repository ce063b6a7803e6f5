mod cli;
mod constants;
mod errors;
mod layout;
mod linux;
mod resize;
mod run;
mod utils;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

fn main() -> ExitCode {
    let args = cli::Cli::parse();

    if let Err(err) = run::run(args) {
        eprintln!("{} {err:?}", "ERROR:".red());

        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
