//! mongo-classify
//!
//! Shows how a MongoDB client classifies raw server error replies: the error
//! kind, its ancestors, the preserved diagnostics and the retry policy.
//!
//! # Usage
//!
//! ```bash
//! echo '{"ok": 0, "errmsg": "not master", "code": 10107}' | mongo-classify classify
//! mongo-classify transport --message "timed out" --timed-out
//! mongo-classify kinds
//! ```

use tracing::Level;

use mongo_errors::cli::CliInterface;
use mongo_errors::error::Result;

/// Application entry point
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments
/// 2. Load configuration
/// 3. Initialize logging
/// 4. Run the selected subcommand
fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    cli.run()
}

/// Initialize logging system based on verbosity level
fn initialize_logging(cli: &CliInterface) {
    let level = if cli.args().very_verbose {
        Level::TRACE
    } else if cli.args().verbose {
        Level::DEBUG
    } else {
        cli.config().logging.level.to_tracing_level()
    };

    // Logs go to stderr so stdout stays parseable
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
