//! Asynchronous streaming strategy
//!
//! This module provides an asynchronous implementation of the
//! ProcessingStrategy trait. The operation log is read with non-blocking
//! file I/O in batches, while operations are applied strictly in file
//! order: a submit must see its cart rows, an approval its submit, so
//! replay cannot be reordered the way independent records could be.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── AsyncReader (batched streaming CSV reads)
//!     └── ReplayEngine (business logic, applied in order)
//! ```

use crate::core::ReplayEngine;
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::write_summary_csv;
use crate::strategy::ProcessingStrategy;
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Default number of rows fetched per read
const DEFAULT_BATCH_SIZE: usize = 1000;

/// Asynchronous streaming strategy
///
/// Reads the operation log with async file I/O, in batches of
/// `batch_size`, and applies each batch in order before fetching the next.
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    /// Number of rows fetched per read
    batch_size: usize,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy with the given batch size
    ///
    /// A zero batch size falls back to the default.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: if batch_size == 0 {
                DEFAULT_BATCH_SIZE
            } else {
                batch_size
            },
        }
    }
}

impl Default for AsyncProcessingStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Replay operations from input file and write the summary to output
    ///
    /// This method implements the asynchronous pipeline:
    /// 1. Creates a tokio runtime
    /// 2. Opens the CSV file with non-blocking I/O
    /// 3. Reads operation rows in batches using AsyncReader
    /// 4. Applies every row in file order through the ReplayEngine
    /// 5. Writes the final summary using csv_format::write_summary_csv
    ///
    /// # Error Handling
    ///
    /// Fatal errors (file not found, I/O errors, runtime errors) are
    /// returned immediately. Individual operation errors are logged and
    /// replay continues.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        // Create tokio runtime for async execution
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let mut engine = ReplayEngine::new();

            // Open the CSV file
            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);

            let mut reader = AsyncReader::new(compat_file);

            // Batches overlap file reads with processing; application stays
            // strictly in file order
            loop {
                let batch = reader.read_batch(self.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                for operation in batch {
                    if let Err(e) = engine.apply(operation) {
                        warn!(error = %e, "operation rejected; continuing");
                    }
                }
            }

            write_summary_csv(&engine.summary(), output)?;

            Ok(())
        })
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
    fn test_async_strategy_matches_sync_output() {
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

        let mut async_output = Vec::new();
        AsyncProcessingStrategy::default()
            .process(file.path(), &mut async_output)
            .unwrap();

        let mut sync_output = Vec::new();
        crate::strategy::SyncProcessingStrategy
            .process(file.path(), &mut sync_output)
            .unwrap();

        assert_eq!(async_output, sync_output);
    }

    #[test]
    fn test_async_strategy_small_batches_keep_order() {
        // A batch size of 1 forces every causal dependency to cross a batch
        // boundary
        let csv_content = "op,actor,target,qty,amount,note\n\
            cafeteria,caf,,,,\n\
            parent,p1,,,,\n\
            student,s1,p1,,,\n\
            product,caf,burger,100,5.99,Hamburger\n\
            recharge,p1,s1,,20.00,\n\
            cart,s1,burger,1,,\n\
            submit,s1,o1,,,\n\
            approve,p1,o1,,,\n\
            pay,,o1,,,\n\
            advance,caf,o1,,,\n";
        let file = create_temp_csv(csv_content);

        let mut output = Vec::new();
        AsyncProcessingStrategy::new(1)
            .process(file.path(), &mut output)
            .unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert_eq!(
            output_str,
            "record,id,status,amount\norder,o1,preparing,5.99\nbalance,s1,,14.01\n"
        );
    }

    #[test]
    fn test_async_strategy_handles_missing_file() {
        let strategy = AsyncProcessingStrategy::default();
        let mut output = Vec::new();

        let result = strategy.process(Path::new("nonexistent.csv"), &mut output);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Failed to open file"));
    }

    #[test]
    fn test_zero_batch_size_falls_back_to_default() {
        let strategy = AsyncProcessingStrategy::new(0);
        assert_eq!(strategy.batch_size, DEFAULT_BATCH_SIZE);
    }
}
