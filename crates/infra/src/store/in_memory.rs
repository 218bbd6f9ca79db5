use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use storefront_auth::{NewUser, User, UserStore};
use storefront_cart::{CartItem, CartLine, CartStore};
use storefront_catalog::{CatalogStore, NewProduct, Product, ProductPatch};
use storefront_core::{DomainError, DomainResult, OrderId, OrderItemId, ProductId, UserId};
use storefront_inventory::{ensure_positive, InventoryLedger, ReserveOutcome};
use storefront_orders::{NewOrder, Order, OrderItem, OrderStore, PlacedOrder};

/// In-memory implementation of every store trait.
///
/// Intended for tests/dev. The products map's write lock is what makes
/// `check_and_reserve` atomic: check and decrement happen under one guard,
/// so concurrent reservations on the same product serialize.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    products: RwLock<HashMap<ProductId, Product>>,
    cart_items: RwLock<Vec<CartItem>>,
    orders: RwLock<Vec<PlacedOrder>>,
    users: RwLock<Vec<User>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_products(&self) -> DomainResult<RwLockReadGuard<'_, HashMap<ProductId, Product>>> {
        self.products
            .read()
            .map_err(|_| DomainError::persistence("products lock poisoned"))
    }

    fn write_products(&self) -> DomainResult<RwLockWriteGuard<'_, HashMap<ProductId, Product>>> {
        self.products
            .write()
            .map_err(|_| DomainError::persistence("products lock poisoned"))
    }

    fn read_cart(&self) -> DomainResult<RwLockReadGuard<'_, Vec<CartItem>>> {
        self.cart_items
            .read()
            .map_err(|_| DomainError::persistence("cart lock poisoned"))
    }

    fn write_cart(&self) -> DomainResult<RwLockWriteGuard<'_, Vec<CartItem>>> {
        self.cart_items
            .write()
            .map_err(|_| DomainError::persistence("cart lock poisoned"))
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn insert_product(&self, input: NewProduct) -> DomainResult<Product> {
        input.validate()?;

        let now = Utc::now();
        let product = Product {
            id: ProductId::new(),
            name: input.name,
            description: input.description,
            price: input.price,
            stock: input.stock,
            created_at: now,
            updated_at: now,
        };

        self.write_products()?.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: ProductId, patch: ProductPatch) -> DomainResult<Product> {
        patch.validate()?;

        let mut products = self.write_products()?;
        let product = products.get_mut(&id).ok_or(DomainError::NotFound)?;

        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(description) = patch.description {
            product.description = description;
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        product.updated_at = Utc::now();

        Ok(product.clone())
    }

    async fn delete_product(&self, id: ProductId) -> DomainResult<()> {
        self.write_products()?
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::NotFound)
    }

    async fn get_product(&self, id: ProductId) -> DomainResult<Product> {
        self.read_products()?
            .get(&id)
            .cloned()
            .ok_or(DomainError::NotFound)
    }

    async fn list_products(&self) -> DomainResult<Vec<Product>> {
        let mut products: Vec<Product> = self.read_products()?.values().cloned().collect();
        products.sort_by_key(|p| p.id);
        Ok(products)
    }
}

#[async_trait]
impl InventoryLedger for InMemoryStore {
    async fn check_and_reserve(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> DomainResult<ReserveOutcome> {
        ensure_positive("quantity", quantity)?;

        // Single write guard: the check and the decrement are indivisible
        // with respect to every other ledger call.
        let mut products = self.write_products()?;
        let Some(product) = products.get_mut(&product_id) else {
            return Ok(ReserveOutcome::ProductNotFound);
        };

        if product.stock < quantity {
            return Ok(ReserveOutcome::InsufficientStock {
                available: product.stock,
            });
        }

        product.stock -= quantity;
        product.updated_at = Utc::now();
        Ok(ReserveOutcome::Reserved {
            remaining: product.stock,
        })
    }

    async fn restock(&self, product_id: ProductId, amount: i64) -> DomainResult<i64> {
        ensure_positive("amount", amount)?;

        let mut products = self.write_products()?;
        let product = products.get_mut(&product_id).ok_or(DomainError::NotFound)?;
        product.stock += amount;
        product.updated_at = Utc::now();
        Ok(product.stock)
    }

    async fn release(&self, product_id: ProductId, amount: i64) -> DomainResult<()> {
        ensure_positive("amount", amount)?;

        let mut products = self.write_products()?;
        match products.get_mut(&product_id) {
            Some(product) => {
                product.stock += amount;
                product.updated_at = Utc::now();
            }
            // The product vanished between reservation and release; the
            // reservation has nothing to go back to.
            None => {
                tracing::warn!(product_id = %product_id, amount, "release on missing product");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CartStore for InMemoryStore {
    async fn upsert_cart_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> DomainResult<CartItem> {
        ensure_positive("quantity", quantity)?;

        if !self.read_products()?.contains_key(&product_id) {
            return Err(DomainError::NotFound);
        }

        let mut cart = self.write_cart()?;
        if let Some(item) = cart
            .iter_mut()
            .find(|i| i.user_id == user_id && i.product_id == product_id)
        {
            item.quantity += quantity;
            return Ok(item.clone());
        }

        let item = CartItem {
            user_id,
            product_id,
            quantity,
            created_at: Utc::now(),
        };
        cart.push(item.clone());
        Ok(item)
    }

    async fn remove_cart_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> DomainResult<bool> {
        let mut cart = self.write_cart()?;
        let before = cart.len();
        cart.retain(|i| !(i.user_id == user_id && i.product_id == product_id));
        Ok(cart.len() < before)
    }

    async fn list_cart(&self, user_id: UserId) -> DomainResult<Vec<CartLine>> {
        let products = self.read_products()?;
        let cart = self.read_cart()?;

        let mut lines: Vec<CartLine> = cart
            .iter()
            .filter(|i| i.user_id == user_id)
            .filter_map(|item| {
                products.get(&item.product_id).map(|product| CartLine {
                    item: item.clone(),
                    product: product.clone(),
                })
            })
            .collect();

        lines.sort_by(|a, b| b.item.created_at.cmp(&a.item.created_at));
        Ok(lines)
    }

    async fn clear_cart(&self, user_id: UserId) -> DomainResult<u64> {
        let mut cart = self.write_cart()?;
        let before = cart.len();
        cart.retain(|i| i.user_id != user_id);
        Ok((before - cart.len()) as u64)
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert_order(&self, order: NewOrder) -> DomainResult<PlacedOrder> {
        let order_id = OrderId::new();
        let placed = PlacedOrder {
            order: Order {
                id: order_id,
                user_id: order.user_id,
                total_price: order.total_price,
                created_at: Utc::now(),
            },
            items: order
                .items
                .iter()
                .map(|snap| OrderItem {
                    id: OrderItemId::new(),
                    order_id,
                    product_id: snap.product_id,
                    quantity: snap.quantity,
                    price: snap.unit_price,
                })
                .collect(),
        };

        self.orders
            .write()
            .map_err(|_| DomainError::persistence("orders lock poisoned"))?
            .push(placed.clone());
        Ok(placed)
    }

    async fn list_orders_for_user(&self, user_id: UserId) -> DomainResult<Vec<PlacedOrder>> {
        let orders = self
            .orders
            .read()
            .map_err(|_| DomainError::persistence("orders lock poisoned"))?;

        let mut own: Vec<PlacedOrder> = orders
            .iter()
            .filter(|p| p.order.user_id == user_id)
            .cloned()
            .collect();
        own.sort_by(|a, b| b.order.created_at.cmp(&a.order.created_at));
        Ok(own)
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&self, input: NewUser) -> DomainResult<User> {
        let mut users = self
            .users
            .write()
            .map_err(|_| DomainError::persistence("users lock poisoned"))?;

        if users.iter().any(|u| u.username == input.username) {
            return Err(DomainError::conflict("username is already taken"));
        }

        let user = User {
            id: UserId::new(),
            username: input.username,
            email: input.email,
            password_hash: input.password_hash,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let users = self
            .users
            .read()
            .map_err(|_| DomainError::persistence("users lock poisoned"))?;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
        let users = self
            .users
            .read()
            .map_err(|_| DomainError::persistence("users lock poisoned"))?;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }
}
