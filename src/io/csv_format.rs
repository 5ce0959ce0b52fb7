//! CSV format handling for operation logs and summary output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to operation records
//! - Summary output serialization
//!
//! All functions are pure (no I/O) for easy testing.
//!
//! # Input format
//!
//! `op,actor,target,qty,amount,note` - which fields are required depends on
//! the operation:
//!
//! ```text
//! op,actor,target,qty,amount,note
//! cafeteria,caf,,,,
//! parent,p1,,,,
//! student,s1,p1,,,
//! product,caf,burger,100,5.99,Hamburger
//! recharge,p1,s1,,100.00,
//! cart,s1,burger,2,,
//! submit,s1,o1,,,
//! approve,p1,o1,,,
//! pay,,o1,,,
//! ```
//!
//! # Output format
//!
//! `record,id,status,amount` - one `order` row per submitted order with its
//! final status and total, then one `balance` row per student with the final
//! wallet balance. Amounts are written with two decimal places.

use crate::core::engine::SummaryRow;
use crate::types::{OperationKind, OperationRecord};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns: op, actor, target, qty,
/// amount, note. Everything after `actor` is optional because most
/// operations only use a subset of the columns.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    pub op: String,
    pub actor: String,
    pub target: Option<String>,
    pub qty: Option<String>,
    pub amount: Option<String>,
    pub note: Option<String>,
}

/// Convert a CsvRecord to an OperationRecord
///
/// This function:
/// - Parses the operation name into an OperationKind
/// - Parses qty into an integer and amount into a Decimal (if present)
/// - Normalizes empty optional fields to None
/// - Validates that an actor is present (except for `pay`, which has none)
///
/// Per-operation field requirements (which rows need a target, an amount,
/// a note) are enforced by the replay engine, which can report them as
/// typed domain errors.
///
/// # Arguments
///
/// * `csv_record` - The deserialized CSV record
///
/// # Returns
///
/// Result containing either:
/// - Ok(OperationRecord) - Successfully converted record
/// - Err(String) - Error message describing the conversion failure
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<OperationRecord, String> {
    let kind = match csv_record.op.to_lowercase().as_str() {
        "student" => OperationKind::RegisterStudent,
        "parent" => OperationKind::RegisterParent,
        "cafeteria" => OperationKind::RegisterCafeteria,
        "product" => OperationKind::AddProduct,
        "recharge" => OperationKind::Recharge,
        "cart" => OperationKind::CartAdd,
        "submit" => OperationKind::Submit,
        "approve" => OperationKind::Approve,
        "reject" => OperationKind::Reject,
        "pay" => OperationKind::Pay,
        "advance" => OperationKind::Advance,
        "cancel" => OperationKind::Cancel,
        other => return Err(format!("Invalid operation '{}'", other)),
    };

    let actor = csv_record.actor.trim().to_string();
    if actor.is_empty() && kind != OperationKind::Pay {
        return Err(format!("Operation '{}' requires an actor", csv_record.op));
    }

    let qty = match non_empty(csv_record.qty) {
        Some(raw) => Some(
            raw.parse::<u32>()
                .map_err(|_| format!("Invalid quantity '{}'", raw))?,
        ),
        None => None,
    };

    let amount = match non_empty(csv_record.amount) {
        Some(raw) => {
            Some(Decimal::from_str(&raw).map_err(|_| format!("Invalid amount '{}'", raw))?)
        }
        None => None,
    };

    Ok(OperationRecord {
        kind,
        actor,
        target: non_empty(csv_record.target),
        qty,
        amount,
        note: non_empty(csv_record.note),
    })
}

/// Trim an optional CSV field, mapping empty strings to None
fn non_empty(field: Option<String>) -> Option<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Write summary rows to CSV format
///
/// Writes rows in CSV format with columns: record, id, status, amount.
/// The rows arrive already sorted (orders by label, then balances by
/// label); amounts are rescaled to two decimal places so the output is
/// byte-for-byte deterministic.
///
/// # Arguments
///
/// * `rows` - Summary rows to write
/// * `output` - Mutable reference to a writer for outputting CSV
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_summary_csv(rows: &[SummaryRow], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    // Write header
    writer
        .write_record(["record", "id", "status", "amount"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    for row in rows {
        let mut amount = row.amount;
        amount.rescale(2);

        writer
            .write_record(&[
                row.record.to_string(),
                row.id.clone(),
                row.status.clone(),
                amount.to_string(),
            ])
            .map_err(|e| format!("Failed to write summary record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(op: &str, actor: &str) -> CsvRecord {
        CsvRecord {
            op: op.to_string(),
            actor: actor.to_string(),
            target: None,
            qty: None,
            amount: None,
            note: None,
        }
    }

    #[rstest]
    #[case("student", OperationKind::RegisterStudent)]
    #[case("parent", OperationKind::RegisterParent)]
    #[case("cafeteria", OperationKind::RegisterCafeteria)]
    #[case("product", OperationKind::AddProduct)]
    #[case("recharge", OperationKind::Recharge)]
    #[case("cart", OperationKind::CartAdd)]
    #[case("submit", OperationKind::Submit)]
    #[case("approve", OperationKind::Approve)]
    #[case("reject", OperationKind::Reject)]
    #[case("advance", OperationKind::Advance)]
    #[case("cancel", OperationKind::Cancel)]
    #[case("APPROVE", OperationKind::Approve)] // case insensitive
    fn test_convert_parses_operations(#[case] op: &str, #[case] expected: OperationKind) {
        let result = convert_csv_record(record(op, "u1"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().kind, expected);
    }

    #[test]
    fn test_convert_pay_allows_empty_actor() {
        let result = convert_csv_record(record("pay", ""));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().kind, OperationKind::Pay);
    }

    #[rstest]
    #[case::invalid_op(record("refund", "u1"), "Invalid operation")]
    #[case::missing_actor(record("approve", "  "), "requires an actor")]
    #[case::bad_qty(
        CsvRecord { qty: Some("two".to_string()), ..record("cart", "s1") },
        "Invalid quantity"
    )]
    #[case::bad_amount(
        CsvRecord { amount: Some("1,5".to_string()), ..record("recharge", "p1") },
        "Invalid amount"
    )]
    fn test_convert_errors(#[case] csv_record: CsvRecord, #[case] expected_error: &str) {
        let result = convert_csv_record(csv_record);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains(expected_error));
    }

    #[test]
    fn test_convert_parses_qty_and_amount() {
        let csv_record = CsvRecord {
            target: Some("burger".to_string()),
            qty: Some(" 100 ".to_string()),
            amount: Some(" 5.99 ".to_string()),
            note: Some("Hamburger".to_string()),
            ..record("product", "caf")
        };

        let converted = convert_csv_record(csv_record).unwrap();
        assert_eq!(converted.qty, Some(100));
        assert_eq!(converted.amount, Some(Decimal::new(599, 2)));
        assert_eq!(converted.target.as_deref(), Some("burger"));
        assert_eq!(converted.note.as_deref(), Some("Hamburger"));
    }

    #[test]
    fn test_convert_normalizes_empty_fields_to_none() {
        let csv_record = CsvRecord {
            target: Some("".to_string()),
            qty: Some("  ".to_string()),
            amount: Some("".to_string()),
            note: Some("".to_string()),
            ..record("submit", "s1")
        };

        let converted = convert_csv_record(csv_record).unwrap();
        assert_eq!(converted.target, None);
        assert_eq!(converted.qty, None);
        assert_eq!(converted.amount, None);
        assert_eq!(converted.note, None);
    }

    #[rstest]
    #[case::orders_and_balances(
        vec![
            SummaryRow {
                record: "order",
                id: "o1".to_string(),
                status: "approved".to_string(),
                amount: Decimal::new(898, 2),
            },
            SummaryRow {
                record: "balance",
                id: "s1".to_string(),
                status: String::new(),
                amount: Decimal::new(9102, 2),
            },
        ],
        "record,id,status,amount\norder,o1,approved,8.98\nbalance,s1,,91.02\n"
    )]
    #[case::zero_balance_is_two_decimal(
        vec![SummaryRow {
            record: "balance",
            id: "s1".to_string(),
            status: String::new(),
            amount: Decimal::ZERO,
        }],
        "record,id,status,amount\nbalance,s1,,0.00\n"
    )]
    #[case::integral_amount_is_two_decimal(
        vec![SummaryRow {
            record: "balance",
            id: "s1".to_string(),
            status: String::new(),
            amount: Decimal::from(100),
        }],
        "record,id,status,amount\nbalance,s1,,100.00\n"
    )]
    #[case::empty_summary(
        vec![],
        "record,id,status,amount\n"
    )]
    fn test_write_summary_csv(#[case] rows: Vec<SummaryRow>, #[case] expected_output: &str) {
        let mut output = Vec::new();
        let result = write_summary_csv(&rows, &mut output);
        assert!(result.is_ok());

        let output_str = String::from_utf8(output).unwrap();
        assert_eq!(output_str, expected_output);
    }
}
