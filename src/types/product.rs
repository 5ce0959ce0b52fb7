//! Product catalog types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product identifier
pub type ProductId = String;

/// A catalog entry owned by the cafeteria
///
/// Orders embed snapshots of this type, so mutating or deleting a product
/// never rewrites history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product id
    pub id: ProductId,

    pub name: String,
    pub description: String,

    /// Unit sale price, non-negative
    pub price: Decimal,

    /// Unit cost, non-negative
    ///
    /// Not validated against `price`; a product sold below cost is the
    /// cafeteria's business.
    pub cost: Decimal,

    /// Units available; checked (but not decremented) at order submission
    pub stock: u32,

    /// Optional picture for the menu UI
    pub image_url: Option<String>,
}
