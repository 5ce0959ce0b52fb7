//! Error types for the canteen engine
//!
//! This module defines all error types that can occur while processing
//! cafeteria operations. Errors are designed to be descriptive and
//! user-friendly for CLI output.
//!
//! # Error Categories
//!
//! - **File I/O Errors**: File not found, permission denied, etc.
//! - **CSV Parsing Errors**: Malformed CSV, invalid data types, etc.
//! - **Domain Errors**: Illegal status transitions, unauthorized actors,
//!   insufficient stock or funds, malformed input
//! - **Arithmetic Errors**: Overflow in money calculations

use crate::types::order::OrderStatus;
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the canteen engine
///
/// This enum represents all possible errors that can occur while processing
/// operations. Each variant includes relevant context to help diagnose and
/// resolve the issue.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CanteenError {
    /// File not found at the specified path
    ///
    /// This is a fatal error that prevents processing from starting.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    ///
    /// This is typically a fatal error (file permissions, disk full, etc.).
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// This is a recoverable error - the malformed row is skipped and
    /// processing continues with the next row.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Malformed input for an operation
    ///
    /// Empty cart, non-positive amount, missing rejection note, and similar
    /// input-shape failures. The operation is rejected without side effects.
    #[error("Validation error: {message}")]
    Validation {
        /// Description of what was malformed
        message: String,
    },

    /// A referenced entity does not exist
    ///
    /// Unknown order, product or user id. The operation is rejected without
    /// side effects.
    #[error("{entity} '{id}' not found")]
    NotFound {
        /// Kind of entity that was looked up (e.g. "order", "product")
        entity: String,
        /// The id that was not found
        id: String,
    },

    /// The actor lacks the role or relationship required for the operation
    ///
    /// Only the linked parent may approve or reject an order, only the
    /// cafeteria may advance or cancel one. The order and ledger are left
    /// exactly as they were.
    #[error("User '{actor}' is not authorized to {operation}")]
    Unauthorized {
        /// Id of the acting user
        actor: String,
        /// The operation that was attempted
        operation: String,
    },

    /// The requested status transition is not legal from the current state
    ///
    /// Also raised when a transition is re-invoked after it already
    /// succeeded, which keeps side effects (notably debits) from running
    /// twice.
    #[error("Order '{order}' cannot {operation} while in status '{status}'")]
    InvalidTransition {
        /// Id of the order
        order: String,
        /// Current status of the order
        status: OrderStatus,
        /// The transition that was attempted
        operation: String,
    },

    /// Requested quantity exceeds the product's available stock
    ///
    /// The order is not created.
    #[error("Insufficient stock for product '{product}': requested {requested}, in stock {in_stock}")]
    InsufficientStock {
        /// Id of the product
        product: String,
        /// Quantity requested
        requested: u32,
        /// Quantity available
        in_stock: u32,
    },

    /// The wallet balance does not cover the requested debit
    ///
    /// Nothing is appended to the ledger and the order stays in its current
    /// status.
    #[error("Insufficient funds for user '{user}': balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Id of the wallet owner
        user: String,
        /// Current balance
        balance: Decimal,
        /// Requested debit amount
        requested: Decimal,
    },

    /// Arithmetic overflow would occur
    ///
    /// The operation is rejected to keep order totals and balances intact.
    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
    },
}

// Conversion from io::Error to CanteenError
impl From<std::io::Error> for CanteenError {
    fn from(error: std::io::Error) -> Self {
        CanteenError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to CanteenError
impl From<csv::Error> for CanteenError {
    fn from(error: csv::Error) -> Self {
        // Extract line number if available
        let line = error.position().map(|pos| pos.line());

        CanteenError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl CanteenError {
    /// Create a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        CanteenError::Validation {
            message: message.into(),
        }
    }

    /// Create a NotFound error
    pub fn not_found(entity: &str, id: &str) -> Self {
        CanteenError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Create an Unauthorized error
    pub fn unauthorized(actor: &str, operation: &str) -> Self {
        CanteenError::Unauthorized {
            actor: actor.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Create an InvalidTransition error
    pub fn invalid_transition(order: &str, status: OrderStatus, operation: &str) -> Self {
        CanteenError::InvalidTransition {
            order: order.to_string(),
            status,
            operation: operation.to_string(),
        }
    }

    /// Create an InsufficientStock error
    pub fn insufficient_stock(product: &str, requested: u32, in_stock: u32) -> Self {
        CanteenError::InsufficientStock {
            product: product.to_string(),
            requested,
            in_stock,
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(user: &str, balance: Decimal, requested: Decimal) -> Self {
        CanteenError::InsufficientFunds {
            user: user.to_string(),
            balance,
            requested,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str) -> Self {
        CanteenError::ArithmeticOverflow {
            operation: operation.to_string(),
        }
    }
}
