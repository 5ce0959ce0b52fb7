//! Canteen Engine Library
//! # Overview
//!
//! This library implements a school cafeteria ordering system: students
//! submit orders built from a product catalog, parents gate purchases
//! through an approval step and fund a per-student token wallet, and the
//! cafeteria fulfills or cancels orders. A CSV replay pipeline (sync and
//! async input strategies) drives the whole system from operation logs.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (User, Product, Order, TokenTransaction, etc.)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::order_service`] - The order lifecycle state machine
//!   - [`core::wallet_service`] - Recharges, debits and balance queries
//!   - [`core::auth_service`] - Registration and parent↔child linking
//!   - [`core::catalog_service`] - Product management
//!   - [`core::traits`] - Repository contracts (persistence boundary)
//!   - [`core::memory`] - Thread-safe in-memory repositories
//!   - [`core::engine`] - Operation replay orchestration
//! - [`io`] - I/O handling with pluggable parsing strategies
//!
//! # Order Lifecycle
//!
//! An order moves through a closed set of states:
//!
//! - **pending_approval**: created by the student from a non-empty cart
//! - **pending_payment**: the linked parent approved it
//! - **approved**: the wallet debit succeeded
//! - **preparing / ready_for_pickup / completed**: cafeteria fulfillment
//! - **rejected_by_parent**: terminal, with a mandatory note
//! - **cancelled_by_cafeteria**: terminal, refunding the debit if one was made
//!
//! # Wallet Model
//!
//! Every student wallet is an append-only ledger of signed transactions:
//! positive `recharge` entries (parent top-ups, cancellation refunds) and
//! negative `purchase` entries (order payments). Balance is always derived
//! by summation, never stored, so it can be reconstructed and audited from
//! the ledger alone.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use crate::core::{
    AuthService, CatalogService, OrderService, ReplayEngine, SummaryRow, WalletService,
};
pub use crate::io::write_summary_csv;
pub use crate::types::{
    CanteenError, Order, OrderItem, OrderStatus, Product, Role, TokenTransaction, TransactionKind,
    User,
};
