use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use uuid::Uuid;

use storefront_auth::{NewUser, User, UserStore};
use storefront_cart::{CartItem, CartLine, CartStore};
use storefront_catalog::{CatalogStore, NewProduct, Product, ProductPatch};
use storefront_core::{DomainError, DomainResult, OrderId, OrderItemId, ProductId, UserId};
use storefront_inventory::{ensure_positive, InventoryLedger, ReserveOutcome};
use storefront_orders::{NewOrder, Order, OrderItem, OrderStore, PlacedOrder};

/// Postgres-backed implementation of every store trait.
///
/// Reservation atomicity comes from a conditional UPDATE: the stock check
/// and the decrement are a single statement, so the `stock >= 0` invariant
/// holds under any interleaving without explicit row locks.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> DomainResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(db_err)?;
        Ok(Self::new(pool))
    }

    pub async fn run_migrations(&self) -> DomainResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DomainError::persistence(format!("migration failed: {e}")))
    }
}

fn db_err(e: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return DomainError::conflict("a record with that key already exists");
        }
        if db.is_foreign_key_violation() {
            return DomainError::NotFound;
        }
    }
    DomainError::persistence(e.to_string())
}

fn product_from_row(row: &PgRow) -> Product {
    Product {
        id: ProductId::from_uuid(row.get::<Uuid, _>("id")),
        name: row.get("name"),
        description: row.get("description"),
        price: row.get("price"),
        stock: row.get("stock"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: UserId::from_uuid(row.get::<Uuid, _>("id")),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    }
}

fn order_from_row(row: &PgRow) -> Order {
    Order {
        id: OrderId::from_uuid(row.get::<Uuid, _>("id")),
        user_id: UserId::from_uuid(row.get::<Uuid, _>("user_id")),
        total_price: row.get("total_price"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    }
}

fn order_item_from_row(row: &PgRow) -> OrderItem {
    OrderItem {
        id: OrderItemId::from_uuid(row.get::<Uuid, _>("id")),
        order_id: OrderId::from_uuid(row.get::<Uuid, _>("order_id")),
        product_id: ProductId::from_uuid(row.get::<Uuid, _>("product_id")),
        quantity: row.get("quantity"),
        price: row.get("price"),
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn insert_product(&self, input: NewProduct) -> DomainResult<Product> {
        input.validate()?;

        let row = sqlx::query(
            "INSERT INTO products (id, name, description, price, stock) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, description, price, stock, created_at, updated_at",
        )
        .bind(Uuid::from(ProductId::new()))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.stock)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(product_from_row(&row))
    }

    async fn update_product(&self, id: ProductId, patch: ProductPatch) -> DomainResult<Product> {
        patch.validate()?;

        let row = sqlx::query(
            "UPDATE products SET \
                 name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 price = COALESCE($4, price), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING id, name, description, price, stock, created_at, updated_at",
        )
        .bind(Uuid::from(id))
        .bind(patch.name)
        .bind(patch.description)
        .bind(patch.price)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(|r| product_from_row(&r)).ok_or(DomainError::NotFound)
    }

    async fn delete_product(&self, id: ProductId) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(Uuid::from(id))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    async fn get_product(&self, id: ProductId) -> DomainResult<Product> {
        let row = sqlx::query(
            "SELECT id, name, description, price, stock, created_at, updated_at \
             FROM products WHERE id = $1",
        )
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(|r| product_from_row(&r)).ok_or(DomainError::NotFound)
    }

    async fn list_products(&self) -> DomainResult<Vec<Product>> {
        let rows = sqlx::query(
            "SELECT id, name, description, price, stock, created_at, updated_at \
             FROM products ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.iter().map(product_from_row).collect())
    }
}

#[async_trait]
impl InventoryLedger for PostgresStore {
    async fn check_and_reserve(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> DomainResult<ReserveOutcome> {
        ensure_positive("quantity", quantity)?;

        // The WHERE clause makes this a check-and-decrement in one
        // statement; Postgres row locking serializes rivals.
        let row = sqlx::query(
            "UPDATE products SET stock = stock - $2, updated_at = now() \
             WHERE id = $1 AND stock >= $2 \
             RETURNING stock",
        )
        .bind(Uuid::from(product_id))
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        if let Some(row) = row {
            return Ok(ReserveOutcome::Reserved {
                remaining: row.get("stock"),
            });
        }

        // No row updated: either the product is gone or stock was short.
        let current = sqlx::query("SELECT stock FROM products WHERE id = $1")
            .bind(Uuid::from(product_id))
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        match current {
            Some(row) => Ok(ReserveOutcome::InsufficientStock {
                available: row.get("stock"),
            }),
            None => Ok(ReserveOutcome::ProductNotFound),
        }
    }

    async fn restock(&self, product_id: ProductId, amount: i64) -> DomainResult<i64> {
        ensure_positive("amount", amount)?;

        let row = sqlx::query(
            "UPDATE products SET stock = stock + $2, updated_at = now() \
             WHERE id = $1 \
             RETURNING stock",
        )
        .bind(Uuid::from(product_id))
        .bind(amount)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(|r| r.get("stock")).ok_or(DomainError::NotFound)
    }

    async fn release(&self, product_id: ProductId, amount: i64) -> DomainResult<()> {
        ensure_positive("amount", amount)?;

        let result = sqlx::query(
            "UPDATE products SET stock = stock + $2, updated_at = now() WHERE id = $1",
        )
        .bind(Uuid::from(product_id))
        .bind(amount)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            // Reserved stock has nowhere to go back to; log and move on.
            tracing::warn!(product_id = %product_id, amount, "release on missing product");
        }
        Ok(())
    }
}

#[async_trait]
impl CartStore for PostgresStore {
    async fn upsert_cart_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> DomainResult<CartItem> {
        ensure_positive("quantity", quantity)?;

        let row = sqlx::query(
            "INSERT INTO cart_items (user_id, product_id, quantity) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, product_id) \
             DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity \
             RETURNING user_id, product_id, quantity, created_at",
        )
        .bind(Uuid::from(user_id))
        .bind(Uuid::from(product_id))
        .bind(quantity)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(CartItem {
            user_id: UserId::from_uuid(row.get::<Uuid, _>("user_id")),
            product_id: ProductId::from_uuid(row.get::<Uuid, _>("product_id")),
            quantity: row.get("quantity"),
            created_at: row.get::<DateTime<Utc>, _>("created_at"),
        })
    }

    async fn remove_cart_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> DomainResult<bool> {
        let result = sqlx::query(
            "DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2",
        )
        .bind(Uuid::from(user_id))
        .bind(Uuid::from(product_id))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_cart(&self, user_id: UserId) -> DomainResult<Vec<CartLine>> {
        let rows = sqlx::query(
            "SELECT c.user_id, c.product_id, c.quantity, c.created_at AS item_created_at, \
                    p.id, p.name, p.description, p.price, p.stock, p.created_at, p.updated_at \
             FROM cart_items c \
             JOIN products p ON p.id = c.product_id \
             WHERE c.user_id = $1 \
             ORDER BY c.created_at DESC",
        )
        .bind(Uuid::from(user_id))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows
            .iter()
            .map(|row| CartLine {
                item: CartItem {
                    user_id: UserId::from_uuid(row.get::<Uuid, _>("user_id")),
                    product_id: ProductId::from_uuid(row.get::<Uuid, _>("product_id")),
                    quantity: row.get("quantity"),
                    created_at: row.get::<DateTime<Utc>, _>("item_created_at"),
                },
                product: product_from_row(row),
            })
            .collect())
    }

    async fn clear_cart(&self, user_id: UserId) -> DomainResult<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(Uuid::from(user_id))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn insert_order(&self, order: NewOrder) -> DomainResult<PlacedOrder> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let order_row = sqlx::query(
            "INSERT INTO orders (id, user_id, total_price) \
             VALUES ($1, $2, $3) \
             RETURNING id, user_id, total_price, created_at",
        )
        .bind(Uuid::from(OrderId::new()))
        .bind(Uuid::from(order.user_id))
        .bind(order.total_price)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        let placed_order = order_from_row(&order_row);

        let mut items = Vec::with_capacity(order.items.len());
        for snap in &order.items {
            let row = sqlx::query(
                "INSERT INTO order_items (id, order_id, product_id, quantity, price) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING id, order_id, product_id, quantity, price",
            )
            .bind(Uuid::from(OrderItemId::new()))
            .bind(Uuid::from(placed_order.id))
            .bind(Uuid::from(snap.product_id))
            .bind(snap.quantity)
            .bind(snap.unit_price)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?;

            items.push(order_item_from_row(&row));
        }

        tx.commit().await.map_err(db_err)?;

        Ok(PlacedOrder {
            order: placed_order,
            items,
        })
    }

    async fn list_orders_for_user(&self, user_id: UserId) -> DomainResult<Vec<PlacedOrder>> {
        let order_rows = sqlx::query(
            "SELECT id, user_id, total_price, created_at \
             FROM orders WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(Uuid::from(user_id))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut placed = Vec::with_capacity(order_rows.len());
        for order_row in &order_rows {
            let order = order_from_row(order_row);
            let item_rows = sqlx::query(
                "SELECT id, order_id, product_id, quantity, price \
                 FROM order_items WHERE order_id = $1 \
                 ORDER BY id",
            )
            .bind(Uuid::from(order.id))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

            placed.push(PlacedOrder {
                order,
                items: item_rows.iter().map(order_item_from_row).collect(),
            });
        }

        Ok(placed)
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn insert_user(&self, input: NewUser) -> DomainResult<User> {
        let row = sqlx::query(
            "INSERT INTO users (id, username, email, password_hash) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, username, email, password_hash, created_at",
        )
        .bind(Uuid::from(UserId::new()))
        .bind(&input.username)
        .bind(&input.email)
        .bind(&input.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match db_err(e) {
            DomainError::Conflict(_) => DomainError::conflict("username is already taken"),
            other => other,
        })?;

        Ok(user_from_row(&row))
    }

    async fn find_user_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, created_at \
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.map(|r| user_from_row(&r)))
    }

    async fn find_user_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, created_at \
             FROM users WHERE id = $1",
        )
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.map(|r| user_from_row(&r)))
    }
}
