//! propinject CLI Entry Point
//!
//! This binary patches key/value lines of a properties file in a build
//! workspace.

use std::process;

fn main() {
    if let Err(e) = propinject_interface::run_cli() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
