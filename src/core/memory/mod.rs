//! Thread-safe in-memory repository implementations
//!
//! Every repository is backed by a `DashMap`, whose per-entry locking gives
//! the atomic closure-update semantics the contracts in
//! [`crate::core::traits`] require: the closure runs on a copy of the entry
//! while the entry is exclusively held, and the copy is committed only when
//! the closure succeeds. Failed operations therefore never leave partial
//! writes behind, and two callers racing the same order or the same ledger
//! cannot both succeed a check-then-act sequence.
//!
//! These implementations are the single-process stand-in for a real
//! database; the services never know the difference.

mod auth;
mod orders;
mod products;
mod tokens;
mod users;

pub use auth::MemoryAuthRepository;
pub use orders::MemoryOrderRepository;
pub use products::MemoryProductRepository;
pub use tokens::MemoryTokenRepository;
pub use users::MemoryUserRepository;
