//! Core business logic module
//!
//! This module contains the canteen's business logic components:
//! - `traits` - Repository contracts, the persistence boundary
//! - `memory` - Thread-safe in-memory repository implementations
//! - `wallet_service` - Recharges, debits and balance queries over the ledger
//! - `order_service` - The order lifecycle state machine
//! - `auth_service` - Registration, parent↔child linking and login
//! - `catalog_service` - Cafeteria product management
//! - `engine` - Operation replay orchestration

pub mod auth_service;
pub mod catalog_service;
pub mod engine;
pub mod memory;
pub mod order_service;
pub mod traits;
pub mod wallet_service;

pub use auth_service::{AuthService, Registration};
pub use catalog_service::{CatalogService, NewProduct};
pub use engine::{ReplayEngine, SummaryRow};
pub use order_service::OrderService;
pub use traits::{
    AuthRepository, Credential, OrderRepository, ProductRepository, TokenRepository,
    UserRepository,
};
pub use wallet_service::WalletService;
