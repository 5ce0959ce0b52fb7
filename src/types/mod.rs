//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `user`: Users and roles
//! - `product`: Catalog products
//! - `order`: The order aggregate and its status machine
//! - `transaction`: Ledger transactions
//! - `operation`: Parsed replay operations
//! - `error`: Error types for the canteen engine

pub mod error;
pub mod operation;
pub mod order;
pub mod product;
pub mod transaction;
pub mod user;

pub use error::CanteenError;
pub use operation::{OperationKind, OperationRecord};
pub use order::{Order, OrderDraft, OrderId, OrderItem, OrderStatus};
pub use product::{Product, ProductId};
pub use transaction::{Amount, TokenTransaction, TransactionId, TransactionKind};
pub use user::{Role, User, UserId};
