//! keel - Entry Point
//!
//! | Command | Description |
//! |---------|-------------|
//! | `keel check` | Assemble and resolve every binding |
//! | `keel graph` | Assemble, resolve and print the dependency graph |
//! | `keel migrate` | Assemble and apply pending migrations |

// Force-link keel-providers so the linkme store registrations are included
extern crate keel_providers;

use clap::Parser;
use keel::cli::{Cli, INTERRUPTED_EXIT_CODE, Outcome, run};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match run(cli).await? {
        Outcome::Completed(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Interrupted => Ok(ExitCode::from(INTERRUPTED_EXIT_CODE)),
    }
}
