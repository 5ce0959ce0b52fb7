//! Synchronous processing strategy
//!
//! This module provides a synchronous, single-threaded implementation of the
//! ProcessingStrategy trait. It orchestrates replay by coordinating between
//! the SyncReader (for CSV input) and ReplayEngine (for business logic).
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Operation processing to `ReplayEngine` (business logic)
//! - CSV output to `csv_format::write_summary_csv` (format handling)
//!
//! # Memory Efficiency
//!
//! This strategy maintains streaming behavior: rows are processed one at a
//! time, and memory usage is bounded by the size of the resulting world
//! (users, products, orders, ledgers), not by the size of the log.

use crate::core::ReplayEngine;
use crate::io::csv_format::write_summary_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::ProcessingStrategy;
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Synchronous processing strategy
///
/// Implements the ProcessingStrategy trait using single-threaded,
/// synchronous processing. Orchestrates the flow between CSV reading,
/// operation replay, and output generation.
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    /// Replay operations from input file and write the summary to output
    ///
    /// This method orchestrates the complete synchronous pipeline:
    /// 1. Creates a SyncReader to stream operation rows from the CSV file
    /// 2. Creates a ReplayEngine to apply operations
    /// 3. Iterates through rows, applying each through the engine
    /// 4. Collects the final summary from the engine
    /// 5. Writes the summary using csv_format::write_summary_csv
    ///
    /// # Error Handling
    ///
    /// Fatal errors (file not found, I/O errors) are returned immediately.
    /// Individual operation errors are logged and replay continues.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let mut engine = ReplayEngine::new();

        let reader = SyncReader::new(input_path)?;

        // Apply each operation in file order; a failed operation must not
        // stop the replay
        for result in reader {
            match result {
                Ok(operation) => {
                    if let Err(e) = engine.apply(operation) {
                        warn!(error = %e, "operation rejected; continuing");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "skipping unparseable row");
                }
            }
        }

        write_summary_csv(&engine.summary(), output)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_sync_strategy_processes_full_lifecycle() {
        let csv_content = "op,actor,target,qty,amount,note\n\
            cafeteria,caf,,,,\n\
            parent,p1,,,,\n\
            student,s1,p1,,,\n\
            product,caf,burger,100,5.99,Hamburger\n\
            recharge,p1,s1,,100.00,\n\
            cart,s1,burger,2,,\n\
            submit,s1,o1,,,\n\
            approve,p1,o1,,,\n\
            pay,,o1,,,\n";
        let file = create_temp_csv(csv_content);

        let strategy = SyncProcessingStrategy;
        let mut output = Vec::new();

        let result = strategy.process(file.path(), &mut output);
        assert!(result.is_ok());

        let output_str = String::from_utf8(output).unwrap();
        assert_eq!(
            output_str,
            "record,id,status,amount\norder,o1,approved,11.98\nbalance,s1,,88.02\n"
        );
    }

    #[test]
    fn test_sync_strategy_handles_missing_file() {
        let strategy = SyncProcessingStrategy;
        let mut output = Vec::new();

        let result = strategy.process(Path::new("nonexistent.csv"), &mut output);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Failed to open file"));
    }

    #[test]
    fn test_sync_strategy_continues_on_rejected_operations() {
        // The unlinked parent p2 cannot approve; replay must continue and
        // the order must stay pending
        let csv_content = "op,actor,target,qty,amount,note\n\
            cafeteria,caf,,,,\n\
            parent,p1,,,,\n\
            parent,p2,,,,\n\
            student,s1,p1,,,\n\
            product,caf,burger,100,5.99,Hamburger\n\
            cart,s1,burger,1,,\n\
            submit,s1,o1,,,\n\
            approve,p2,o1,,,\n";
        let file = create_temp_csv(csv_content);

        let strategy = SyncProcessingStrategy;
        let mut output = Vec::new();

        strategy.process(file.path(), &mut output).unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.contains("order,o1,pending_approval,5.99"));
    }

    #[test]
    fn test_sync_strategy_continues_on_malformed_rows() {
        let csv_content = "op,actor,target,qty,amount,note\n\
            cafeteria,caf,,,,\n\
            teleport,caf,,,,\n\
            parent,p1,,,,\n\
            student,s1,p1,,,\n";
        let file = create_temp_csv(csv_content);

        let strategy = SyncProcessingStrategy;
        let mut output = Vec::new();

        let result = strategy.process(file.path(), &mut output);
        assert!(result.is_ok());

        let output_str = String::from_utf8(output).unwrap();
        // Registration succeeded despite the malformed row
        assert!(output_str.contains("balance,s1,,0.00"));
    }

    #[test]
    fn test_sync_strategy_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncProcessingStrategy>();
    }
}
