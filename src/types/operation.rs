//! Replay operation types
//!
//! An operation log row describes one action against the canteen: register a
//! user, add a product, recharge a wallet, build a cart, or drive an order
//! through its lifecycle. Rows reference entities by human-readable labels;
//! the replay engine resolves labels to entity ids.

use rust_decimal::Decimal;

/// Kinds of operations accepted by the replay pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Register a student, optionally naming the parent to link
    RegisterStudent,

    /// Register a parent, optionally naming the student to link
    RegisterParent,

    /// Register the cafeteria operator
    RegisterCafeteria,

    /// Add a catalog product (actor: cafeteria)
    AddProduct,

    /// Recharge a student wallet (actor: the student or the linked parent)
    Recharge,

    /// Put a quantity of a product into a student's cart
    CartAdd,

    /// Submit the accumulated cart as a new order
    Submit,

    /// Parent approves a pending order
    Approve,

    /// Parent rejects a pending order with a note
    Reject,

    /// Record the wallet payment for an approved-by-parent order
    Pay,

    /// Cafeteria moves an order one fulfillment step forward
    Advance,

    /// Cafeteria cancels an order with a reason
    Cancel,
}

/// One parsed row of the operation log
///
/// Which of the optional fields are required depends on the kind; the
/// conversion in `io::csv_format` enforces the per-kind shape and the
/// replay engine enforces the semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    /// What to do
    pub kind: OperationKind,

    /// Label of the acting user (empty for `pay`, which has no actor)
    pub actor: String,

    /// Label of the entity acted on: a user for registrations/recharges, a
    /// product for cart rows, an order for lifecycle rows
    pub target: Option<String>,

    /// Quantity, for product stock and cart rows
    pub qty: Option<u32>,

    /// Money amount, for product prices and recharges
    pub amount: Option<Decimal>,

    /// Free text: registration email, rejection note, cancel reason
    pub note: Option<String>,
}
