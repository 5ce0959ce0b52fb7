//! Asynchronous CSV reader with batch interface
//!
//! Provides a streaming interface over operation records from a CSV file.
//! Supports batch reading so the async strategy can interleave file I/O and
//! processing without buffering the whole log.
//!
//! # Design
//!
//! The AsyncReader uses:
//! - csv-async for streaming CSV parsing
//! - futures for the stream interface
//!
//! Parsing and conversion are delegated to the csv_format module, so sync
//! and async input paths cannot drift apart.

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::OperationRecord;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

/// Asynchronous CSV reader
///
/// Provides batch reading interface over operation records.
/// Maintains streaming behavior with constant memory usage.
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async reader
    ///
    /// # Arguments
    ///
    /// * `reader` - Async reader providing CSV data
    ///
    /// # Returns
    ///
    /// A new AsyncReader instance
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self { csv_reader }
    }

    /// Read a batch of operation records
    ///
    /// This method reads up to `batch_size` rows from the CSV file,
    /// converting them to OperationRecords. Invalid rows are logged and
    /// skipped; replay order of the valid rows is preserved.
    ///
    /// # Arguments
    ///
    /// * `batch_size` - Maximum number of records to read
    ///
    /// # Returns
    ///
    /// A vector of successfully converted operation records.
    /// Returns an empty vector when the end of the file is reached.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<OperationRecord> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<CsvRecord>();

        while batch.len() < batch_size {
            match records.next().await {
                Some(Ok(csv_record)) => match convert_csv_record(csv_record) {
                    Ok(operation) => batch.push(operation),
                    Err(e) => warn!(error = %e, "skipping malformed operation row"),
                },
                Some(Err(e)) => warn!(error = %e, "skipping unparseable CSV row"),
                None => break,
            }
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OperationKind;
    use futures::io::Cursor;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_async_reader_read_batch() {
        let csv_content = "op,actor,target,qty,amount,note\n\
            cafeteria,caf,,,,\n\
            parent,p1,,,,\n\
            recharge,p1,s1,,25.00,\n";
        let reader = Cursor::new(csv_content.as_bytes());
        let mut async_reader = AsyncReader::new(reader);

        let batch = async_reader.read_batch(2).await;
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].kind, OperationKind::RegisterCafeteria);
        assert_eq!(batch[1].kind, OperationKind::RegisterParent);

        let batch = async_reader.read_batch(2).await;
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].kind, OperationKind::Recharge);
        assert_eq!(batch[0].amount, Some(Decimal::new(2500, 2)));

        let batch = async_reader.read_batch(2).await;
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn test_async_reader_empty_csv() {
        let csv_content = "op,actor,target,qty,amount,note\n";
        let reader = Cursor::new(csv_content.as_bytes());
        let mut async_reader = AsyncReader::new(reader);

        let batch = async_reader.read_batch(10).await;
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn test_async_reader_skips_malformed_rows() {
        let csv_content = "op,actor,target,qty,amount,note\n\
            student,s1,,,,\n\
            teleport,s1,,,,\n\
            parent,p1,,,,\n";
        let reader = Cursor::new(csv_content.as_bytes());
        let mut async_reader = AsyncReader::new(reader);

        let batch = async_reader.read_batch(10).await;
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].kind, OperationKind::RegisterStudent);
        assert_eq!(batch[1].kind, OperationKind::RegisterParent);
    }

    #[tokio::test]
    async fn test_async_reader_preserves_order_across_batches() {
        let mut csv_content = String::from("op,actor,target,qty,amount,note\n");
        for i in 0..10 {
            csv_content.push_str(&format!("student,s{},,,,\n", i));
        }
        let reader = Cursor::new(csv_content.into_bytes());
        let mut async_reader = AsyncReader::new(reader);

        let mut actors = Vec::new();
        loop {
            let batch = async_reader.read_batch(3).await;
            if batch.is_empty() {
                break;
            }
            actors.extend(batch.into_iter().map(|record| record.actor));
        }

        let expected: Vec<String> = (0..10).map(|i| format!("s{}", i)).collect();
        assert_eq!(actors, expected);
    }
}
