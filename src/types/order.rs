//! Order aggregate types
//!
//! This module defines the order aggregate: the closed status enum with the
//! transition helpers used by the lifecycle service, line items carrying
//! product snapshots, and the order record itself.
//!
//! # Status Machine
//!
//! ```text
//! pending_approval ──► pending_payment ──► approved ──► preparing ──► ready_for_pickup ──► completed
//!        │
//!        └──► rejected_by_parent
//!
//! any non-terminal ──► cancelled_by_cafeteria
//! ```
//!
//! `completed`, `rejected_by_parent` and `cancelled_by_cafeteria` are
//! terminal: no further transitions are legal from them.

use crate::types::product::Product;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order identifier
pub type OrderId = String;

/// Status of an order within its lifecycle
///
/// The set of states is closed: every order is in exactly one of these, and
/// all transition logic is centralized in the helpers below plus the
/// lifecycle service. Serialized as the snake_case wire strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created by the student, waiting for the linked parent's decision
    PendingApproval,

    /// Approved by the parent, waiting for the wallet debit
    PendingPayment,

    /// Paid for; the debit has been appended to the ledger
    Approved,

    /// The cafeteria started preparing the order
    Preparing,

    /// Prepared and waiting for the student to pick it up
    ReadyForPickup,

    /// Picked up. Terminal.
    Completed,

    /// Rejected by the linked parent, with a mandatory note. Terminal.
    RejectedByParent,

    /// Cancelled by the cafeteria from any non-terminal state. Terminal.
    ///
    /// If the order had already been debited, the cancel operation appends a
    /// compensating recharge before entering this state.
    CancelledByCafeteria,
}

impl OrderStatus {
    /// Whether this status admits no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Completed
                | OrderStatus::RejectedByParent
                | OrderStatus::CancelledByCafeteria
        )
    }

    /// The next step of the cafeteria fulfillment progression, if any
    ///
    /// Returns `Some` only along `approved → preparing → ready_for_pickup →
    /// completed`; every other status has no fulfillment successor.
    pub fn next_fulfillment_step(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Approved => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::ReadyForPickup),
            OrderStatus::ReadyForPickup => Some(OrderStatus::Completed),
            _ => None,
        }
    }

    /// Whether the student's wallet has been debited for this order
    ///
    /// True from `approved` onward; cancelling a debited order must refund
    /// the debit with a compensating recharge.
    pub fn is_debited(self) -> bool {
        matches!(
            self,
            OrderStatus::Approved
                | OrderStatus::Preparing
                | OrderStatus::ReadyForPickup
                | OrderStatus::Completed
        )
    }

    /// The snake_case wire string for this status
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::PendingApproval => "pending_approval",
            OrderStatus::PendingPayment => "pending_payment",
            OrderStatus::Approved => "approved",
            OrderStatus::Preparing => "preparing",
            OrderStatus::ReadyForPickup => "ready_for_pickup",
            OrderStatus::Completed => "completed",
            OrderStatus::RejectedByParent => "rejected_by_parent",
            OrderStatus::CancelledByCafeteria => "cancelled_by_cafeteria",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single order line: a product snapshot and a quantity
///
/// The product is snapshotted at submission time so later catalog edits or
/// deletions cannot change what an existing order says was bought, or at
/// what price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Copy of the product as it was when the order was submitted
    pub product: Product,

    /// Number of units ordered (>= 1, <= product stock at submission)
    pub quantity: u32,
}

/// A purchase order
///
/// Created by the lifecycle service in `pending_approval` and mutated only
/// through it. Never physically deleted; terminated into a terminal status
/// instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order id
    pub id: OrderId,

    /// Id of the student who owns the order
    pub student_id: String,

    /// Order lines (non-empty)
    pub items: Vec<OrderItem>,

    /// Total price, equal to the sum of price × quantity over the items
    ///
    /// Computed at creation and immutable afterwards.
    pub total: Decimal,

    /// Current lifecycle status
    pub status: OrderStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last transition timestamp, monotonically non-decreasing
    pub updated_at: DateTime<Utc>,

    /// Parent's note, present if and only if the status is
    /// `rejected_by_parent`
    pub rejection_note: Option<String>,

    /// Cafeteria's reason, present if and only if the status is
    /// `cancelled_by_cafeteria`
    pub cancellation_reason: Option<String>,
}

impl Order {
    /// Stamp `updated_at`, keeping it monotonically non-decreasing
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}

/// Order fields supplied by the caller at creation time
///
/// The repository assigns the id and the timestamps.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    /// Id of the student submitting the order
    pub student_id: String,

    /// Order lines (validated non-empty by the lifecycle service)
    pub items: Vec<OrderItem>,

    /// Total computed by the lifecycle service
    pub total: Decimal,

    /// Initial status
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(OrderStatus::PendingApproval, false)]
    #[case(OrderStatus::PendingPayment, false)]
    #[case(OrderStatus::Approved, false)]
    #[case(OrderStatus::Preparing, false)]
    #[case(OrderStatus::ReadyForPickup, false)]
    #[case(OrderStatus::Completed, true)]
    #[case(OrderStatus::RejectedByParent, true)]
    #[case(OrderStatus::CancelledByCafeteria, true)]
    fn test_terminal_states(#[case] status: OrderStatus, #[case] terminal: bool) {
        assert_eq!(status.is_terminal(), terminal);
    }

    #[rstest]
    #[case(OrderStatus::Approved, Some(OrderStatus::Preparing))]
    #[case(OrderStatus::Preparing, Some(OrderStatus::ReadyForPickup))]
    #[case(OrderStatus::ReadyForPickup, Some(OrderStatus::Completed))]
    #[case(OrderStatus::PendingApproval, None)]
    #[case(OrderStatus::PendingPayment, None)]
    #[case(OrderStatus::Completed, None)]
    #[case(OrderStatus::RejectedByParent, None)]
    #[case(OrderStatus::CancelledByCafeteria, None)]
    fn test_fulfillment_progression(
        #[case] status: OrderStatus,
        #[case] next: Option<OrderStatus>,
    ) {
        assert_eq!(status.next_fulfillment_step(), next);
    }

    #[rstest]
    #[case(OrderStatus::PendingApproval, false)]
    #[case(OrderStatus::PendingPayment, false)]
    #[case(OrderStatus::Approved, true)]
    #[case(OrderStatus::Preparing, true)]
    #[case(OrderStatus::ReadyForPickup, true)]
    #[case(OrderStatus::Completed, true)]
    #[case(OrderStatus::RejectedByParent, false)]
    #[case(OrderStatus::CancelledByCafeteria, false)]
    fn test_debited_states(#[case] status: OrderStatus, #[case] debited: bool) {
        assert_eq!(status.is_debited(), debited);
    }

    #[rstest]
    #[case(OrderStatus::PendingApproval, "pending_approval")]
    #[case(OrderStatus::PendingPayment, "pending_payment")]
    #[case(OrderStatus::Approved, "approved")]
    #[case(OrderStatus::Preparing, "preparing")]
    #[case(OrderStatus::ReadyForPickup, "ready_for_pickup")]
    #[case(OrderStatus::Completed, "completed")]
    #[case(OrderStatus::RejectedByParent, "rejected_by_parent")]
    #[case(OrderStatus::CancelledByCafeteria, "cancelled_by_cafeteria")]
    fn test_status_wire_strings(#[case] status: OrderStatus, #[case] expected: &str) {
        assert_eq!(status.as_str(), expected);
        assert_eq!(status.to_string(), expected);
    }

    #[test]
    fn test_touch_is_monotonic() {
        let created = Utc::now();
        let mut order = Order {
            id: "o1".to_string(),
            student_id: "s1".to_string(),
            items: Vec::new(),
            total: Decimal::ZERO,
            status: OrderStatus::PendingApproval,
            created_at: created,
            updated_at: created,
            rejection_note: None,
            cancellation_reason: None,
        };

        let later = created + chrono::Duration::seconds(5);
        order.touch(later);
        assert_eq!(order.updated_at, later);

        // An earlier clock reading must not move updated_at backwards
        order.touch(created);
        assert_eq!(order.updated_at, later);
    }
}
