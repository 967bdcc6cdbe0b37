//! AutoNBI - builds Apple NetBoot Image bundles from OS X installer sources.
//!
//! Run as root:
//! `sudo autonbi -s /Applications -d ~/BuildRoot -n Mavericks`

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match autonbi::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
