//! Catalog management
//!
//! The write side of the product catalog, restricted to the cafeteria role.
//! The order lifecycle only ever reads products; everything here exists so
//! the cafeteria can maintain the menu.

use crate::core::traits::{ProductRepository, UserRepository};
use crate::types::{CanteenError, Product, ProductId, Role};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Product fields supplied by the cafeteria when adding to the catalog
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub cost: Decimal,
    pub stock: u32,
    pub image_url: Option<String>,
}

/// Catalog management over the product repository
///
/// Cheap to clone; clones share the underlying repositories.
pub struct CatalogService<P, U> {
    products: Arc<P>,
    users: Arc<U>,
}

impl<P, U> Clone for CatalogService<P, U> {
    fn clone(&self) -> Self {
        CatalogService {
            products: Arc::clone(&self.products),
            users: Arc::clone(&self.users),
        }
    }
}

impl<P, U> CatalogService<P, U>
where
    P: ProductRepository,
    U: UserRepository,
{
    /// Create a catalog service over the given repositories
    pub fn new(products: Arc<P>, users: Arc<U>) -> Self {
        CatalogService { products, users }
    }

    /// Add a product to the catalog
    ///
    /// # Errors
    ///
    /// - `NotFound` if the actor is unknown
    /// - `Unauthorized` unless the actor has the cafeteria role
    /// - `Validation` for an empty name or a negative price or cost
    pub fn add_product(
        &self,
        acting_user: &str,
        new_product: NewProduct,
    ) -> Result<Product, CanteenError> {
        self.require_cafeteria(acting_user, "add a product")?;
        validate_product_fields(&new_product.name, new_product.price, new_product.cost)?;

        let product = self.products.create(Product {
            id: Uuid::new_v4().to_string(),
            name: new_product.name,
            description: new_product.description,
            price: new_product.price,
            cost: new_product.cost,
            stock: new_product.stock,
            image_url: new_product.image_url,
        })?;

        info!(product = %product.id, name = %product.name, "product added");
        Ok(product)
    }

    /// Replace an existing product's fields
    ///
    /// Orders that already snapshotted the product are unaffected.
    ///
    /// # Errors
    ///
    /// Same as [`add_product`], plus `NotFound` for an unknown product id.
    ///
    /// [`add_product`]: CatalogService::add_product
    pub fn update_product(
        &self,
        acting_user: &str,
        product: Product,
    ) -> Result<Product, CanteenError> {
        self.require_cafeteria(acting_user, "update a product")?;
        validate_product_fields(&product.name, product.price, product.cost)?;

        self.products.update(product)
    }

    /// Remove a product from the catalog
    ///
    /// # Errors
    ///
    /// - `NotFound` if the actor or the product is unknown
    /// - `Unauthorized` unless the actor has the cafeteria role
    pub fn delete_product(&self, acting_user: &str, product_id: &str) -> Result<(), CanteenError> {
        self.require_cafeteria(acting_user, "delete a product")?;
        self.products.delete(product_id)?;

        info!(product = product_id, "product deleted");
        Ok(())
    }

    /// Fetch a product by id
    pub fn get(&self, product_id: &str) -> Result<Product, CanteenError> {
        self.products.get(product_id)
    }

    /// All products in the catalog
    pub fn list(&self) -> Vec<Product> {
        self.products.list()
    }

    fn require_cafeteria(&self, acting_user: &str, operation: &str) -> Result<(), CanteenError> {
        let actor = self.users.get(acting_user)?;
        if actor.role != Role::Cafeteria {
            return Err(CanteenError::unauthorized(acting_user, operation));
        }
        Ok(())
    }
}

fn validate_product_fields(
    name: &str,
    price: Decimal,
    cost: Decimal,
) -> Result<(), CanteenError> {
    if name.trim().is_empty() {
        return Err(CanteenError::validation("product name must not be empty"));
    }
    if price < Decimal::ZERO {
        return Err(CanteenError::validation(format!(
            "product price must not be negative, got {}",
            price
        )));
    }
    if cost < Decimal::ZERO {
        return Err(CanteenError::validation(format!(
            "product cost must not be negative, got {}",
            cost
        )));
    }
    Ok(())
}
