use std::sync::Arc;

use async_trait::async_trait;

use storefront_core::{DomainResult, ProductId};

use crate::product::{NewProduct, Product, ProductPatch};

/// Catalog read/write collaborator.
///
/// Pass-through CRUD with no independent logic; callers validate inputs
/// via [`NewProduct::validate`] / [`ProductPatch::validate`] before
/// reaching storage. Implementations must not mutate `stock` in
/// `update` — that column belongs to the inventory ledger.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Insert a product, seeding its initial stock.
    async fn insert_product(&self, input: NewProduct) -> DomainResult<Product>;

    /// Apply a partial update. `NotFound` if the product does not exist.
    async fn update_product(&self, id: ProductId, patch: ProductPatch) -> DomainResult<Product>;

    /// Delete a product. `NotFound` if it does not exist.
    async fn delete_product(&self, id: ProductId) -> DomainResult<()>;

    /// Fetch one product. `NotFound` if it does not exist.
    async fn get_product(&self, id: ProductId) -> DomainResult<Product>;

    /// List all products, oldest first.
    async fn list_products(&self) -> DomainResult<Vec<Product>>;
}

#[async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn insert_product(&self, input: NewProduct) -> DomainResult<Product> {
        (**self).insert_product(input).await
    }

    async fn update_product(&self, id: ProductId, patch: ProductPatch) -> DomainResult<Product> {
        (**self).update_product(id, patch).await
    }

    async fn delete_product(&self, id: ProductId) -> DomainResult<()> {
        (**self).delete_product(id).await
    }

    async fn get_product(&self, id: ProductId) -> DomainResult<Product> {
        (**self).get_product(id).await
    }

    async fn list_products(&self) -> DomainResult<Vec<Product>> {
        (**self).list_products().await
    }
}
