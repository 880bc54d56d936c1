//! vgen - merge command variants into proxy commands
//!
//! Commands:
//! - `vgen generate <model>`: Generate proxies for every command in a model file
//! - `vgen check <model>`: Report construction errors and default warnings
//! - `vgen docs <model> <command>`: Print the documentation of one command
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error
//! - 2: At least one command could not be built

use clap::Parser;
use std::io::Write;
use vgen::{logging, Cli, EXIT_ERROR};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.debug);

    let mut stdout = std::io::stdout().lock();
    let exit_code = match vgen::run(&cli, &mut stdout) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            EXIT_ERROR
        }
    };
    // process::exit skips destructors
    let _ = stdout.flush();
    std::process::exit(exit_code);
}
