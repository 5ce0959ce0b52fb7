//! Operation replay engine
//!
//! Routes parsed operation records to the appropriate service, resolving
//! the human-readable labels used in operation logs to the entity ids the
//! services work with. One engine instance owns one in-memory world:
//! registrations, catalog, carts, orders and ledgers.
//!
//! Order, wallet and catalog rules all live in the services; the engine
//! only translates labels, accumulates carts between `cart` and `submit`
//! rows, and collects the final summary. User rows are the one exception:
//! replay logs seed profiles directly into the user repository (the way
//! fixture data always has), keeping interactive credential handling in
//! [`crate::core::auth_service`] where it belongs.

use crate::core::catalog_service::{CatalogService, NewProduct};
use crate::core::memory::{
    MemoryOrderRepository, MemoryProductRepository, MemoryTokenRepository, MemoryUserRepository,
};
use crate::core::order_service::OrderService;
use crate::core::traits::UserRepository;
use crate::core::wallet_service::WalletService;
use crate::types::{
    Amount, CanteenError, OperationKind, OperationRecord, OrderId, ProductId, Role, User, UserId,
};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use uuid::Uuid;

type ReplayOrderService = OrderService<
    MemoryOrderRepository,
    MemoryProductRepository,
    MemoryUserRepository,
    MemoryTokenRepository,
>;

/// One row of the final summary output
///
/// Orders come first (by label), then student balances (by label); the
/// writer in `io::csv_format` relies on that order being deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    /// Row kind: `"order"` or `"balance"`
    pub record: &'static str,

    /// The label the operation log used for this entity
    pub id: String,

    /// Final order status wire string; empty for balance rows
    pub status: String,

    /// Order total, or wallet balance
    pub amount: Amount,
}

/// Replay processing engine
///
/// Owns the in-memory repositories and the services over them, plus the
/// label↔id maps that make operation logs human-writable.
pub struct ReplayEngine {
    users: Arc<MemoryUserRepository>,
    catalog: CatalogService<MemoryProductRepository, MemoryUserRepository>,
    wallet: WalletService<MemoryTokenRepository, MemoryUserRepository>,
    orders: ReplayOrderService,

    /// All registered users by label
    users_by_label: HashMap<String, UserId>,

    /// Student labels only, ordered, for the balance section of the summary
    students_by_label: BTreeMap<String, UserId>,

    /// Catalog products by label
    products_by_label: HashMap<String, ProductId>,

    /// Submitted orders by label, ordered, for the order section of the summary
    orders_by_label: BTreeMap<String, OrderId>,

    /// Carts being accumulated per student label
    carts: HashMap<String, Vec<(ProductId, u32)>>,
}

impl ReplayEngine {
    /// Create an engine over a fresh in-memory world
    pub fn new() -> Self {
        let users = Arc::new(MemoryUserRepository::new());
        let products = Arc::new(MemoryProductRepository::new());
        let tokens = Arc::new(MemoryTokenRepository::new());

        let wallet = WalletService::new(tokens, Arc::clone(&users));
        let orders = OrderService::new(
            Arc::new(MemoryOrderRepository::new()),
            Arc::clone(&products),
            Arc::clone(&users),
            wallet.clone(),
        );

        ReplayEngine {
            catalog: CatalogService::new(products, Arc::clone(&users)),
            users,
            wallet,
            orders,
            users_by_label: HashMap::new(),
            students_by_label: BTreeMap::new(),
            products_by_label: HashMap::new(),
            orders_by_label: BTreeMap::new(),
            carts: HashMap::new(),
        }
    }

    /// Apply a single operation record
    ///
    /// Routes the record to the matching service call. Label resolution
    /// failures surface as `NotFound`; everything else is whatever the
    /// services decide.
    pub fn apply(&mut self, record: OperationRecord) -> Result<(), CanteenError> {
        match record.kind {
            OperationKind::RegisterStudent => self.register(record, Role::Student),
            OperationKind::RegisterParent => self.register(record, Role::Parent),
            OperationKind::RegisterCafeteria => self.register(record, Role::Cafeteria),
            OperationKind::AddProduct => self.add_product(record),
            OperationKind::Recharge => self.recharge(record),
            OperationKind::CartAdd => self.cart_add(record),
            OperationKind::Submit => self.submit(record),
            OperationKind::Approve => {
                let order = self.order_id(record.target.as_deref())?.to_string();
                let actor = self.user_id(&record.actor)?.to_string();
                self.orders.approve(&order, &actor)?;
                Ok(())
            }
            OperationKind::Reject => {
                let order = self.order_id(record.target.as_deref())?.to_string();
                let actor = self.user_id(&record.actor)?.to_string();
                self.orders
                    .reject(&order, &actor, record.note.as_deref().unwrap_or_default())?;
                Ok(())
            }
            OperationKind::Pay => {
                let order = self.order_id(record.target.as_deref())?.to_string();
                self.orders.record_payment(&order)?;
                Ok(())
            }
            OperationKind::Advance => {
                let order = self.order_id(record.target.as_deref())?.to_string();
                let actor = self.user_id(&record.actor)?.to_string();
                self.orders.advance(&order, &actor)?;
                Ok(())
            }
            OperationKind::Cancel => {
                let order = self.order_id(record.target.as_deref())?.to_string();
                let actor = self.user_id(&record.actor)?.to_string();
                self.orders.cancel(
                    &order,
                    &actor,
                    record.note.as_deref().unwrap_or_default(),
                )?;
                Ok(())
            }
        }
    }

    /// Final summary: orders by label, then student balances by label
    pub fn summary(&self) -> Vec<SummaryRow> {
        let mut rows =
            Vec::with_capacity(self.orders_by_label.len() + self.students_by_label.len());

        for (label, order_id) in &self.orders_by_label {
            if let Ok(order) = self.orders.get(order_id) {
                rows.push(SummaryRow {
                    record: "order",
                    id: label.clone(),
                    status: order.status.to_string(),
                    amount: order.total,
                });
            }
        }

        for (label, user_id) in &self.students_by_label {
            if let Ok(balance) = self.wallet.balance(user_id) {
                rows.push(SummaryRow {
                    record: "balance",
                    id: label.clone(),
                    status: String::new(),
                    amount: balance,
                });
            }
        }

        rows
    }

    /// Seed a user profile, maintaining the parent↔child link invariant
    ///
    /// The optional target labels the counterpart to link with: a student
    /// row names its parent, a parent row names its student. Both sides of
    /// the link are written, mirroring what interactive registration does.
    fn register(&mut self, record: OperationRecord, role: Role) -> Result<(), CanteenError> {
        let label = record.actor;
        if self.users_by_label.contains_key(&label) {
            return Err(CanteenError::validation(format!(
                "user label '{}' is already in use",
                label
            )));
        }

        let email = record
            .note
            .unwrap_or_else(|| format!("{}@canteen.local", label));
        if self.users.find_by_email(&email).is_some() {
            return Err(CanteenError::validation(format!(
                "email '{}' is already registered",
                email
            )));
        }

        let counterpart = match role {
            Role::Student => record
                .target
                .as_deref()
                .map(|parent| self.link_target(parent, Role::Parent))
                .transpose()?,
            Role::Parent => record
                .target
                .as_deref()
                .map(|child| self.link_target(child, Role::Student))
                .transpose()?,
            Role::Cafeteria => None,
        };

        let user = self.users.create(User {
            id: Uuid::new_v4().to_string(),
            email,
            role,
            first_name: label.clone(),
            last_name: "User".to_string(),
            parent_id: match role {
                Role::Student => counterpart.as_ref().map(|parent| parent.id.clone()),
                _ => None,
            },
            child_id: match role {
                Role::Parent => counterpart.as_ref().map(|child| child.id.clone()),
                _ => None,
            },
        })?;

        // Write the counterpart's side of the link
        if let Some(counterpart) = counterpart {
            let user_id = user.id.clone();
            match role {
                Role::Student => self.users.update(&counterpart.id, |parent| {
                    parent.child_id = Some(user_id.clone());
                    Ok(())
                })?,
                _ => self.users.update(&counterpart.id, |child| {
                    child.parent_id = Some(user_id.clone());
                    Ok(())
                })?,
            };
        }

        if role == Role::Student {
            self.students_by_label
                .insert(label.clone(), user.id.clone());
        }
        self.users_by_label.insert(label, user.id);
        Ok(())
    }

    /// Resolve a link counterpart and check it can accept the link
    fn link_target(&self, label: &str, expected: Role) -> Result<User, CanteenError> {
        let target = self.users.get(self.user_id(label)?)?;
        if target.role != expected {
            return Err(CanteenError::validation(format!(
                "user '{}' has role {}, expected {}",
                label, target.role, expected
            )));
        }

        let already_linked = match expected {
            Role::Parent => target.child_id.is_some(),
            _ => target.parent_id.is_some(),
        };
        if already_linked {
            return Err(CanteenError::validation(format!(
                "user '{}' is already linked",
                label
            )));
        }

        Ok(target)
    }

    fn add_product(&mut self, record: OperationRecord) -> Result<(), CanteenError> {
        let label = record
            .target
            .ok_or_else(|| CanteenError::validation("product row requires a target label"))?;
        if self.products_by_label.contains_key(&label) {
            return Err(CanteenError::validation(format!(
                "product label '{}' is already in use",
                label
            )));
        }

        let price = record
            .amount
            .ok_or_else(|| CanteenError::validation("product row requires a price"))?;
        let actor = self.user_id(&record.actor)?.to_string();

        let product = self.catalog.add_product(
            &actor,
            NewProduct {
                name: record.note.unwrap_or_else(|| label.clone()),
                description: String::new(),
                price,
                cost: Decimal::ZERO,
                stock: record.qty.unwrap_or(0),
                image_url: None,
            },
        )?;

        self.products_by_label.insert(label, product.id);
        Ok(())
    }

    fn recharge(&mut self, record: OperationRecord) -> Result<(), CanteenError> {
        let target = record
            .target
            .as_deref()
            .ok_or_else(|| CanteenError::validation("recharge row requires a target user"))?;
        let amount = record
            .amount
            .ok_or_else(|| CanteenError::validation("recharge row requires an amount"))?;

        let user = self.user_id(target)?.to_string();
        let initiator = self.user_id(&record.actor)?.to_string();
        self.wallet.recharge(&user, amount, &initiator)?;
        Ok(())
    }

    fn cart_add(&mut self, record: OperationRecord) -> Result<(), CanteenError> {
        let product_label = record
            .target
            .as_deref()
            .ok_or_else(|| CanteenError::validation("cart row requires a product"))?;
        let product_id = self
            .products_by_label
            .get(product_label)
            .cloned()
            .ok_or_else(|| CanteenError::not_found("product", product_label))?;

        self.carts
            .entry(record.actor)
            .or_default()
            .push((product_id, record.qty.unwrap_or(1)));
        Ok(())
    }

    fn submit(&mut self, record: OperationRecord) -> Result<(), CanteenError> {
        let label = record
            .target
            .ok_or_else(|| CanteenError::validation("submit row requires an order label"))?;
        if self.orders_by_label.contains_key(&label) {
            return Err(CanteenError::validation(format!(
                "order label '{}' is already in use",
                label
            )));
        }

        let student = self.user_id(&record.actor)?.to_string();
        // The cart is consumed by submission, successful or not; a student
        // retrying after a failure rebuilds it
        let lines = self.carts.remove(&record.actor).unwrap_or_default();

        let order = self.orders.submit(&student, &lines)?;
        self.orders_by_label.insert(label, order.id);
        Ok(())
    }

    fn user_id(&self, label: &str) -> Result<&str, CanteenError> {
        self.users_by_label
            .get(label)
            .map(String::as_str)
            .ok_or_else(|| CanteenError::not_found("user", label))
    }

    fn order_id(&self, label: Option<&str>) -> Result<&str, CanteenError> {
        let label =
            label.ok_or_else(|| CanteenError::validation("operation requires an order label"))?;
        self.orders_by_label
            .get(label)
            .map(String::as_str)
            .ok_or_else(|| CanteenError::not_found("order", label))
    }
}

impl Default for ReplayEngine {
    fn default() -> Self {
        Self::new()
    }
}
