//! Order lifecycle service
//!
//! The state machine at the heart of the system. This service is the only
//! component allowed to change an order's status; it enforces which
//! transitions are legal, who may trigger them, and couples the transitions
//! that move money to their ledger effect so that status change and ledger
//! append land as one atomic unit.
//!
//! # Transitions
//!
//! | Operation        | From               | To                       | Actor          |
//! |------------------|--------------------|--------------------------|----------------|
//! | `submit`         | -                  | `pending_approval`       | student        |
//! | `approve`        | `pending_approval` | `pending_payment`        | linked parent  |
//! | `reject`         | `pending_approval` | `rejected_by_parent`     | linked parent  |
//! | `record_payment` | `pending_payment`  | `approved`               | system         |
//! | `advance`        | fulfillment chain  | next fulfillment step    | cafeteria      |
//! | `cancel`         | any non-terminal   | `cancelled_by_cafeteria` | cafeteria      |
//!
//! Re-invoking a transition that already succeeded fails with
//! `InvalidTransition` instead of silently succeeding, which is what keeps a
//! double-tapped approve or a retried payment from debiting twice.

use crate::core::traits::{OrderRepository, ProductRepository, TokenRepository, UserRepository};
use crate::core::wallet_service::WalletService;
use crate::types::{CanteenError, Order, OrderDraft, OrderItem, OrderStatus, Role};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

/// The order lifecycle state machine
///
/// Cheap to clone; clones share the underlying repositories.
pub struct OrderService<O, P, U, T> {
    orders: Arc<O>,
    products: Arc<P>,
    users: Arc<U>,
    wallet: WalletService<T, U>,
}

impl<O, P, U, T> Clone for OrderService<O, P, U, T> {
    fn clone(&self) -> Self {
        OrderService {
            orders: Arc::clone(&self.orders),
            products: Arc::clone(&self.products),
            users: Arc::clone(&self.users),
            wallet: self.wallet.clone(),
        }
    }
}

impl<O, P, U, T> OrderService<O, P, U, T>
where
    O: OrderRepository,
    P: ProductRepository,
    U: UserRepository,
    T: TokenRepository,
{
    /// Create a lifecycle service over the given repositories
    pub fn new(orders: Arc<O>, products: Arc<P>, users: Arc<U>, wallet: WalletService<T, U>) -> Self {
        OrderService {
            orders,
            products,
            users,
            wallet,
        }
    }

    /// Submit a cart as a new order in `pending_approval`
    ///
    /// Each line is `(product id, quantity)`. Products are snapshotted into
    /// the order and the total is computed here, once, with checked
    /// arithmetic; it never changes afterwards.
    ///
    /// Stock is validated against the requested quantities but not
    /// decremented.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the student or a product id is unknown
    /// - `Unauthorized` if the submitting user is not a student
    /// - `Validation` if the cart is empty or a quantity is zero
    /// - `InsufficientStock` if a quantity exceeds the product's stock
    pub fn submit(
        &self,
        student_id: &str,
        lines: &[(String, u32)],
    ) -> Result<Order, CanteenError> {
        let student = self.users.get(student_id)?;
        if student.role != Role::Student {
            return Err(CanteenError::unauthorized(student_id, "submit an order"));
        }

        if lines.is_empty() {
            return Err(CanteenError::validation(
                "order must contain at least one item",
            ));
        }

        let mut items = Vec::with_capacity(lines.len());
        let mut total = Decimal::ZERO;
        for (product_id, quantity) in lines {
            if *quantity == 0 {
                return Err(CanteenError::validation(format!(
                    "quantity for product '{}' must be at least 1",
                    product_id
                )));
            }

            let product = self.products.get(product_id)?;
            if *quantity > product.stock {
                return Err(CanteenError::insufficient_stock(
                    product_id,
                    *quantity,
                    product.stock,
                ));
            }

            let line_total = product
                .price
                .checked_mul(Decimal::from(*quantity))
                .ok_or_else(|| CanteenError::arithmetic_overflow("order line total"))?;
            total = total
                .checked_add(line_total)
                .ok_or_else(|| CanteenError::arithmetic_overflow("order total"))?;

            items.push(OrderItem {
                product,
                quantity: *quantity,
            });
        }

        let order = self.orders.create(OrderDraft {
            student_id: student_id.to_string(),
            items,
            total,
            status: OrderStatus::PendingApproval,
        })?;

        info!(order = %order.id, student = student_id, total = %order.total, "order submitted");
        Ok(order)
    }

    /// Parent approves a pending order: `pending_approval → pending_payment`
    ///
    /// # Errors
    ///
    /// - `NotFound` if the order or the acting user is unknown
    /// - `Unauthorized` unless the actor is the parent linked to the
    ///   order's student
    /// - `InvalidTransition` unless the order is in `pending_approval`
    pub fn approve(&self, order_id: &str, acting_parent: &str) -> Result<Order, CanteenError> {
        let actor = self.users.get(acting_parent)?;
        let now = Utc::now();

        let order = self.orders.update(order_id, |order| {
            if !actor.is_parent_of(&order.student_id) {
                return Err(CanteenError::unauthorized(
                    acting_parent,
                    &format!("approve order '{}'", order_id),
                ));
            }
            if order.status != OrderStatus::PendingApproval {
                return Err(CanteenError::invalid_transition(
                    order_id,
                    order.status,
                    "approve",
                ));
            }

            order.status = OrderStatus::PendingPayment;
            order.touch(now);
            Ok(())
        })?;

        info!(order = order_id, parent = acting_parent, "order approved by parent");
        Ok(order)
    }

    /// Parent rejects a pending order: `pending_approval → rejected_by_parent`
    ///
    /// The note is mandatory and is stored on the order; this is a terminal
    /// state.
    ///
    /// # Errors
    ///
    /// Same as [`approve`], plus `Validation` when the note is empty.
    ///
    /// [`approve`]: OrderService::approve
    pub fn reject(
        &self,
        order_id: &str,
        acting_parent: &str,
        note: &str,
    ) -> Result<Order, CanteenError> {
        if note.trim().is_empty() {
            return Err(CanteenError::validation("rejection note must not be empty"));
        }

        let actor = self.users.get(acting_parent)?;
        let now = Utc::now();

        let order = self.orders.update(order_id, |order| {
            if !actor.is_parent_of(&order.student_id) {
                return Err(CanteenError::unauthorized(
                    acting_parent,
                    &format!("reject order '{}'", order_id),
                ));
            }
            if order.status != OrderStatus::PendingApproval {
                return Err(CanteenError::invalid_transition(
                    order_id,
                    order.status,
                    "reject",
                ));
            }

            order.status = OrderStatus::RejectedByParent;
            order.rejection_note = Some(note.to_string());
            order.touch(now);
            Ok(())
        })?;

        info!(order = order_id, parent = acting_parent, "order rejected by parent");
        Ok(order)
    }

    /// Record the wallet payment: `pending_payment → approved`
    ///
    /// Debits the student by the order total as a `purchase` transaction.
    /// The debit and the status change are one atomic unit: the whole call
    /// runs inside the order's update lock, the debit itself inside the
    /// student's ledger lock, and a failed debit leaves the order in
    /// `pending_payment` with nothing appended. A second invocation finds
    /// the order in `approved` and fails before touching the ledger, so an
    /// order can never be charged twice.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the order is unknown
    /// - `InvalidTransition` unless the order is in `pending_payment`
    /// - `InsufficientFunds` if the student's balance does not cover the
    ///   total
    pub fn record_payment(&self, order_id: &str) -> Result<Order, CanteenError> {
        let now = Utc::now();

        let order = self.orders.update(order_id, |order| {
            if order.status != OrderStatus::PendingPayment {
                return Err(CanteenError::invalid_transition(
                    order_id,
                    order.status,
                    "record payment",
                ));
            }

            self.wallet.debit(
                &order.student_id,
                order.total,
                &format!("payment for order '{}'", order_id),
            )?;

            order.status = OrderStatus::Approved;
            order.touch(now);
            Ok(())
        })?;

        info!(order = order_id, total = %order.total, "order payment recorded");
        Ok(order)
    }

    /// Cafeteria moves an order one fulfillment step forward
    ///
    /// The progression is `approved → preparing → ready_for_pickup →
    /// completed`, one step per call.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the order or the acting user is unknown
    /// - `Unauthorized` unless the actor has the cafeteria role
    /// - `InvalidTransition` if the order is not on the fulfillment chain
    pub fn advance(&self, order_id: &str, acting_cafeteria: &str) -> Result<Order, CanteenError> {
        let actor = self.users.get(acting_cafeteria)?;
        if actor.role != Role::Cafeteria {
            return Err(CanteenError::unauthorized(
                acting_cafeteria,
                &format!("advance order '{}'", order_id),
            ));
        }

        let now = Utc::now();
        let order = self.orders.update(order_id, |order| {
            let next = order.status.next_fulfillment_step().ok_or_else(|| {
                CanteenError::invalid_transition(order_id, order.status, "advance")
            })?;

            order.status = next;
            order.touch(now);
            Ok(())
        })?;

        info!(order = order_id, status = %order.status, "order advanced");
        Ok(order)
    }

    /// Cafeteria cancels an order: any non-terminal state
    /// `→ cancelled_by_cafeteria`
    ///
    /// If the order had already been debited (status `approved` or later),
    /// a compensating `recharge` of the full total is appended in the same
    /// atomic unit - refund-on-cancel is an invariant, not a courtesy.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the order or the acting user is unknown
    /// - `Unauthorized` unless the actor has the cafeteria role
    /// - `Validation` if the reason is empty
    /// - `InvalidTransition` if the order is already terminal
    pub fn cancel(
        &self,
        order_id: &str,
        acting_cafeteria: &str,
        reason: &str,
    ) -> Result<Order, CanteenError> {
        if reason.trim().is_empty() {
            return Err(CanteenError::validation(
                "cancellation reason must not be empty",
            ));
        }

        let actor = self.users.get(acting_cafeteria)?;
        if actor.role != Role::Cafeteria {
            return Err(CanteenError::unauthorized(
                acting_cafeteria,
                &format!("cancel order '{}'", order_id),
            ));
        }

        let now = Utc::now();
        let order = self.orders.update(order_id, |order| {
            if order.status.is_terminal() {
                return Err(CanteenError::invalid_transition(
                    order_id,
                    order.status,
                    "cancel",
                ));
            }

            if order.status.is_debited() {
                self.wallet.refund(
                    &order.student_id,
                    order.total,
                    &format!("cancellation of order '{}'", order_id),
                )?;
            }

            order.status = OrderStatus::CancelledByCafeteria;
            order.cancellation_reason = Some(reason.to_string());
            order.touch(now);
            Ok(())
        })?;

        info!(order = order_id, reason, "order cancelled by cafeteria");
        Ok(order)
    }

    /// Fetch an order by id
    pub fn get(&self, order_id: &str) -> Result<Order, CanteenError> {
        self.orders.get(order_id)
    }

    /// All orders of the given student, oldest first
    pub fn orders_for_student(&self, student_id: &str) -> Vec<Order> {
        self.orders.list_by_student(student_id)
    }

    /// All orders in the system, oldest first (the cafeteria view)
    pub fn all_orders(&self) -> Vec<Order> {
        self.orders.list_all()
    }
}
