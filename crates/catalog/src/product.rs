use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, ProductId};

/// A catalog product.
///
/// `price` is an integer in the smallest currency unit. `stock` is the
/// authoritative on-hand count; it never goes negative and is only changed
/// through the inventory ledger (or seeded once at creation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product. Seeds the initial stock count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: i64,
    pub stock: i64,
}

impl NewProduct {
    /// Validate the input fields without touching storage.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::invalid_argument("name cannot be empty"));
        }
        if self.price < 0 {
            return Err(DomainError::invalid_argument("price cannot be negative"));
        }
        if self.stock < 0 {
            return Err(DomainError::invalid_argument("stock cannot be negative"));
        }
        Ok(())
    }
}

/// Partial update for a product. `None` fields are left untouched.
///
/// Deliberately has no `stock` field: after creation, stock only moves
/// through ledger operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
}

impl ProductPatch {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(DomainError::invalid_argument("name cannot be empty"));
            }
        }
        if let Some(price) = self.price {
            if price < 0 {
                return Err(DomainError::invalid_argument("price cannot be negative"));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.price.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product() -> NewProduct {
        NewProduct {
            name: "pork loin".to_string(),
            description: "boneless cut".to_string(),
            price: 1500,
            stock: 10,
        }
    }

    #[test]
    fn valid_product_passes_validation() {
        assert!(new_product().validate().is_ok());
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut p = new_product();
        p.price = -1;
        assert!(matches!(
            p.validate().unwrap_err(),
            DomainError::InvalidArgument(_)
        ));
    }

    #[test]
    fn negative_stock_is_rejected() {
        let mut p = new_product();
        p.stock = -5;
        assert!(p.validate().is_err());
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut p = new_product();
        p.name = "   ".to_string();
        assert!(p.validate().is_err());
    }

    #[test]
    fn patch_validates_only_present_fields() {
        let patch = ProductPatch {
            name: None,
            description: Some(String::new()),
            price: None,
        };
        assert!(patch.validate().is_ok());

        let patch = ProductPatch {
            price: Some(-10),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }
}
