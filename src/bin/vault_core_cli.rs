use std::process::ExitCode;

use clap::Parser;
use vault_core::cli::{run_cli, CliArgs};

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match run_cli(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
