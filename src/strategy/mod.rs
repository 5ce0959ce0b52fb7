//! Processing strategy module for operation replay
//!
//! This module defines the Strategy pattern for complete replay pipelines,
//! encompassing CSV parsing, engine processing and summary output. This
//! allows different input implementations (synchronous, asynchronous
//! streaming) to be selected at runtime.

use crate::cli::StrategyType;
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::AsyncProcessingStrategy;
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete replay pipelines
///
/// This trait defines the interface for different replay implementations.
/// Each strategy must be able to read operations from a CSV file, apply
/// them through the replay engine in file order, and write the final
/// summary to output.
pub trait ProcessingStrategy: Send + Sync {
    /// Replay operations from input file and write the summary to output
    ///
    /// # Arguments
    ///
    /// * `input_path` - Path to the input CSV file containing operation rows
    /// * `output` - Mutable reference to a writer for the summary CSV
    ///
    /// # Returns
    ///
    /// * `Ok(())` if all processing completed successfully (or with
    ///   recoverable errors)
    /// * `Err(String)` if a fatal error occurred (file not found, I/O error,
    ///   etc.)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file cannot be opened (file not found, permission denied)
    /// - A fatal I/O error occurs during reading or writing
    /// - Output cannot be written
    ///
    /// Individual operation failures (rejected transitions, unknown labels,
    /// malformed rows) are logged and skipped; replay continues with the
    /// next row.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String>;
}

/// Create a processing strategy based on the specified strategy type
///
/// This factory function selects and instantiates the appropriate replay
/// strategy implementation at runtime.
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or
///   Async)
///
/// # Returns
///
/// A boxed trait object implementing the ProcessingStrategy trait
pub fn create_strategy(strategy_type: StrategyType) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => Box::new(AsyncProcessingStrategy::default()),
    }
}
