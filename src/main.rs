use std::io;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use simian::cli::Cli;
use simian::env::Environment;
use simian::repl::Repl;

fn main() -> ExitCode {
    simian::init_tracing();

    let cli = Cli::parse();
    let config = cli.config();

    if !config.color {
        colored::control::set_override(false);
    }

    match cli.file {
        Some(path) => {
            let env = Environment::new().into_env();

            match simian::run_file(&path, &env) {
                Ok(value) => {
                    println!("{}", value);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("{}", e.to_string().red());
                    ExitCode::FAILURE
                }
            }
        }
        None => {
            let stdin = io::stdin();
            let stdout = io::stdout();

            match Repl::new(config).run(stdin.lock(), stdout.lock()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("{}", e.to_string().red());
                    ExitCode::FAILURE
                }
            }
        }
    }
}
