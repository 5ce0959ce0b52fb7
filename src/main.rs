//! Canteen Engine CLI
//!
//! Command-line interface for replaying cafeteria operation logs.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv > summary.csv
//! cargo run -- --strategy sync operations.csv > summary.csv
//! cargo run -- --strategy async operations.csv > summary.csv
//! ```
//!
//! The program reads operation rows from the input CSV file, replays them
//! through the canteen engine using the selected processing strategy, and
//! writes the final order statuses and wallet balances to stdout. Rejected
//! operations and malformed rows are logged to stderr and skipped.
//!
//! # Processing Strategies
//!
//! - **sync**: Synchronous CSV parsing with single-threaded processing (default)
//! - **async**: Streaming reads with non-blocking file I/O
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use canteen_engine::cli;
use canteen_engine::strategy;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    // Log to stderr so the summary CSV on stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Parse command-line arguments using clap
    let args = cli::parse_args();

    // Create the appropriate processing strategy based on CLI arguments
    let strategy = strategy::create_strategy(args.strategy);

    // Replay the operation log; the summary goes to stdout
    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
