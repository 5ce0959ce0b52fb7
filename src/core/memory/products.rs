//! In-memory product repository

use crate::core::traits::ProductRepository;
use crate::types::{CanteenError, Product, ProductId};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe in-memory product store
#[derive(Debug, Default)]
pub struct MemoryProductRepository {
    /// Products by id, tagged with their insertion sequence number
    products: DashMap<ProductId, (u64, Product)>,

    /// Monotonic insertion counter
    seq: AtomicU64,
}

impl MemoryProductRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProductRepository for MemoryProductRepository {
    fn create(&self, product: Product) -> Result<Product, CanteenError> {
        if self.products.contains_key(&product.id) {
            return Err(CanteenError::validation(format!(
                "product '{}' already exists",
                product.id
            )));
        }

        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.products
            .insert(product.id.clone(), (seq, product.clone()));
        Ok(product)
    }

    fn get(&self, product_id: &str) -> Result<Product, CanteenError> {
        self.products
            .get(product_id)
            .map(|entry| entry.value().1.clone())
            .ok_or_else(|| CanteenError::not_found("product", product_id))
    }

    fn list(&self) -> Vec<Product> {
        let mut products: Vec<(u64, Product)> = self
            .products
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        products.sort_by_key(|(seq, _)| *seq);
        products.into_iter().map(|(_, product)| product).collect()
    }

    fn update(&self, product: Product) -> Result<Product, CanteenError> {
        let mut entry = self
            .products
            .get_mut(&product.id)
            .ok_or_else(|| CanteenError::not_found("product", &product.id))?;

        entry.value_mut().1 = product.clone();
        Ok(product)
    }

    fn delete(&self, product_id: &str) -> Result<(), CanteenError> {
        self.products
            .remove(product_id)
            .map(|_| ())
            .ok_or_else(|| CanteenError::not_found("product", product_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn burger(id: &str) -> Product {
        Product {
            id: id.to_string(),
            name: "Hamburger".to_string(),
            description: "A delicious hamburger".to_string(),
            price: Decimal::new(599, 2),
            cost: Decimal::new(250, 2),
            stock: 100,
            image_url: None,
        }
    }

    #[test]
    fn test_create_and_get() {
        let repo = MemoryProductRepository::new();
        repo.create(burger("p1")).unwrap();

        let fetched = repo.get("p1").unwrap();
        assert_eq!(fetched.name, "Hamburger");
        assert_eq!(fetched.price, Decimal::new(599, 2));
    }

    #[test]
    fn test_create_duplicate_id_fails() {
        let repo = MemoryProductRepository::new();
        repo.create(burger("p1")).unwrap();

        let result = repo.create(burger("p1"));
        assert!(matches!(result, Err(CanteenError::Validation { .. })));
    }

    #[test]
    fn test_get_unknown_product_fails() {
        let repo = MemoryProductRepository::new();

        let result = repo.get("missing");
        assert!(matches!(result, Err(CanteenError::NotFound { .. })));
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let repo = MemoryProductRepository::new();
        repo.create(burger("p2")).unwrap();
        repo.create(burger("p1")).unwrap();
        repo.create(burger("p3")).unwrap();

        let ids: Vec<String> = repo.list().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["p2", "p1", "p3"]);
    }

    #[test]
    fn test_update_replaces_fields() {
        let repo = MemoryProductRepository::new();
        repo.create(burger("p1")).unwrap();

        let mut updated = burger("p1");
        updated.stock = 5;
        updated.price = Decimal::new(649, 2);
        repo.update(updated).unwrap();

        let fetched = repo.get("p1").unwrap();
        assert_eq!(fetched.stock, 5);
        assert_eq!(fetched.price, Decimal::new(649, 2));
    }

    #[test]
    fn test_update_unknown_product_fails() {
        let repo = MemoryProductRepository::new();

        let result = repo.update(burger("missing"));
        assert!(matches!(result, Err(CanteenError::NotFound { .. })));
    }

    #[test]
    fn test_delete_removes_product() {
        let repo = MemoryProductRepository::new();
        repo.create(burger("p1")).unwrap();

        repo.delete("p1").unwrap();
        assert!(repo.get("p1").is_err());
        assert!(repo.delete("p1").is_err());
    }
}
