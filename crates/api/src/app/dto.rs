use serde::Deserialize;
use serde_json::json;

use storefront_cart::CartLine;
use storefront_orders::PlacedOrder;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
    #[serde(default)]
    pub stock: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct AddCartItemRequest {
    pub product_id: String,
    pub quantity: i64,
}

pub fn cart_line_to_json(line: &CartLine) -> serde_json::Value {
    json!({
        "product_id": line.product_id().to_string(),
        "name": line.product.name,
        "unit_price": line.product.price,
        "quantity": line.quantity(),
        // Display only; order placement recomputes with checked math.
        "line_total": line.product.price.saturating_mul(line.quantity()),
    })
}

pub fn placed_order_to_json(placed: &PlacedOrder) -> serde_json::Value {
    json!({
        "id": placed.order.id.to_string(),
        "total_price": placed.order.total_price,
        "created_at": placed.order.created_at,
        "items": placed
            .items
            .iter()
            .map(|item| json!({
                "product_id": item.product_id.to_string(),
                "quantity": item.quantity,
                "price": item.price,
            }))
            .collect::<Vec<_>>(),
    })
}
