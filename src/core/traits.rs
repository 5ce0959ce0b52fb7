//! Repository contracts: the persistence boundary of the core
//!
//! The services in this crate depend only on these traits. The provided
//! implementation lives in [`crate::core::memory`]; swapping it for a
//! database-backed one must require no change to the services.
//!
//! # Atomicity
//!
//! The mutating methods that matter for correctness (`OrderRepository::update`
//! and `TokenRepository::update_ledger`) take a closure and must run it as
//! one atomic unit against the addressed entity: the closure observes a
//! consistent snapshot, and either its mutations are committed in full or,
//! when it returns an error, nothing is persisted. This is what makes the
//! lifecycle service's check-then-act sequences race-free.

use crate::types::{
    Amount, CanteenError, Order, OrderDraft, Product, TokenTransaction, User, UserId,
};

/// Trait for order persistence
///
/// Orders are created once, then mutated only through [`update`], and never
/// deleted.
///
/// [`update`]: OrderRepository::update
pub trait OrderRepository {
    /// Persist a new order, assigning its id and timestamps
    fn create(&self, draft: OrderDraft) -> Result<Order, CanteenError>;

    /// Fetch an order by id
    fn get(&self, order_id: &str) -> Result<Order, CanteenError>;

    /// All orders submitted by the given student, oldest first
    fn list_by_student(&self, student_id: &str) -> Vec<Order>;

    /// All orders in the system, oldest first (the cafeteria's work queue)
    fn list_all(&self) -> Vec<Order>;

    /// Update an order using a closure, atomically
    ///
    /// The closure runs while the order entry is exclusively held; no other
    /// caller can observe or mutate the order in between. If the closure
    /// returns an error the order is left exactly as it was.
    ///
    /// Returns the updated order.
    fn update<F>(&self, order_id: &str, f: F) -> Result<Order, CanteenError>
    where
        F: FnOnce(&mut Order) -> Result<(), CanteenError>;
}

/// Trait for the append-only token ledger
///
/// Entries are appended, never edited or removed. Balance is derived by
/// summation and never stored.
pub trait TokenRepository {
    /// Run a closure against one user's ledger entries, atomically
    ///
    /// The closure runs while the user's ledger is exclusively held, so a
    /// balance computed inside it cannot be invalidated by a concurrent
    /// append before the closure's own append lands. If the closure returns
    /// an error nothing is persisted.
    ///
    /// The closure must only append; existing entries are immutable.
    fn update_ledger<F, T>(&self, user_id: &str, f: F) -> Result<T, CanteenError>
    where
        F: FnOnce(&mut Vec<TokenTransaction>) -> Result<T, CanteenError>;

    /// All transactions of the given user, ordered by `created_at` ascending
    fn list_by_user(&self, user_id: &str) -> Vec<TokenTransaction>;

    /// Balance of the given user: the sum over their transactions
    ///
    /// A derived value; implementations may cache it only if every append
    /// updates the cache within the same atomic unit.
    fn balance(&self, user_id: &str) -> Amount {
        self.list_by_user(user_id)
            .iter()
            .map(|tx| tx.amount)
            .sum()
    }
}

/// Trait for product persistence
pub trait ProductRepository {
    /// Persist a new product
    fn create(&self, product: Product) -> Result<Product, CanteenError>;

    /// Fetch a product by id
    fn get(&self, product_id: &str) -> Result<Product, CanteenError>;

    /// All products, in insertion order
    fn list(&self) -> Vec<Product>;

    /// Replace an existing product
    fn update(&self, product: Product) -> Result<Product, CanteenError>;

    /// Remove a product from the catalog
    ///
    /// Orders keep their snapshots; deleting a product never rewrites
    /// order history.
    fn delete(&self, product_id: &str) -> Result<(), CanteenError>;
}

/// Trait for user persistence
pub trait UserRepository {
    /// Persist a new user
    fn create(&self, user: User) -> Result<User, CanteenError>;

    /// Fetch a user by id
    fn get(&self, user_id: &str) -> Result<User, CanteenError>;

    /// Look a user up by login email
    fn find_by_email(&self, email: &str) -> Option<User>;

    /// Update a user using a closure, atomically
    ///
    /// Used by the auth service to maintain the parent↔child link. If the
    /// closure returns an error the user is left exactly as it was.
    fn update<F>(&self, user_id: &str, f: F) -> Result<User, CanteenError>
    where
        F: FnOnce(&mut User) -> Result<(), CanteenError>;
}

/// A stored login credential
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    /// Login email, unique
    pub email: String,

    /// Id of the user owning this credential
    pub user_id: UserId,

    /// Argon2 password hash in PHC string format
    pub password_hash: String,
}

/// Trait for credential persistence
pub trait AuthRepository {
    /// Store a credential; fails if the email is already registered
    fn store(&self, credential: Credential) -> Result<(), CanteenError>;

    /// Look a credential up by login email
    fn find_by_email(&self, email: &str) -> Option<Credential>;
}
