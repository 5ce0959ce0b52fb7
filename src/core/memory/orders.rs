//! In-memory order repository
//!
//! Orders are stored in a `DashMap` keyed by order id, each entry carrying
//! an insertion sequence number so listings come back oldest first without
//! relying on timestamp uniqueness.
//!
//! # Thread Safety
//!
//! `update` runs its closure while the order's map entry is exclusively
//! held. Concurrent updates to different orders do not block each other;
//! updates to the same order are serialized, which is exactly the
//! single-writer-per-order model the lifecycle service is built on.

use crate::core::traits::OrderRepository;
use crate::types::{CanteenError, Order, OrderDraft, OrderId};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Thread-safe in-memory order store
#[derive(Debug, Default)]
pub struct MemoryOrderRepository {
    /// Orders by id, tagged with their insertion sequence number
    orders: DashMap<OrderId, (u64, Order)>,

    /// Monotonic insertion counter
    seq: AtomicU64,
}

impl MemoryOrderRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(&self, mut filter: impl FnMut(&Order) -> bool) -> Vec<Order> {
        let mut orders: Vec<(u64, Order)> = self
            .orders
            .iter()
            .filter(|entry| filter(&entry.value().1))
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by_key(|(seq, _)| *seq);
        orders.into_iter().map(|(_, order)| order).collect()
    }
}

impl OrderRepository for MemoryOrderRepository {
    fn create(&self, draft: OrderDraft) -> Result<Order, CanteenError> {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            student_id: draft.student_id,
            items: draft.items,
            total: draft.total,
            status: draft.status,
            created_at: now,
            updated_at: now,
            rejection_note: None,
            cancellation_reason: None,
        };

        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.orders.insert(order.id.clone(), (seq, order.clone()));
        Ok(order)
    }

    fn get(&self, order_id: &str) -> Result<Order, CanteenError> {
        self.orders
            .get(order_id)
            .map(|entry| entry.value().1.clone())
            .ok_or_else(|| CanteenError::not_found("order", order_id))
    }

    fn list_by_student(&self, student_id: &str) -> Vec<Order> {
        self.sorted(|order| order.student_id == student_id)
    }

    fn list_all(&self) -> Vec<Order> {
        self.sorted(|_| true)
    }

    fn update<F>(&self, order_id: &str, f: F) -> Result<Order, CanteenError>
    where
        F: FnOnce(&mut Order) -> Result<(), CanteenError>,
    {
        let mut entry = self
            .orders
            .get_mut(order_id)
            .ok_or_else(|| CanteenError::not_found("order", order_id))?;

        // Run the closure on a copy and commit only on success, so a failed
        // validation leaves the stored order untouched.
        let (_, order) = entry.value_mut();
        let mut updated = order.clone();
        f(&mut updated)?;
        *order = updated.clone();

        Ok(updated)
    }
}
