use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};

use storefront_core::{DomainError, ProductId};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(view_cart))
        .route("/items", post(add_item))
        .route("/items/:product_id", delete(remove_item))
}

pub async fn view_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.cart.list_cart(principal.user_id()).await {
        Ok(lines) => {
            let total = lines.iter().fold(0i64, |acc, l| {
                acc.saturating_add(l.product.price.saturating_mul(l.quantity()))
            });
            let items: Vec<_> = lines.iter().map(dto::cart_line_to_json).collect();
            (
                StatusCode::OK,
                Json(serde_json::json!({ "items": items, "total": total })),
            )
                .into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn add_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::AddCartItemRequest>,
) -> axum::response::Response {
    let product_id: ProductId = match body.product_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
        }
    };

    if body.quantity < 1 {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_argument",
            "quantity must be at least 1",
        );
    }

    // Adding to the cart does not reserve stock, but it does reject
    // requests that could never be fulfilled against the current shelf:
    // the accumulated cart quantity must not exceed what is in stock.
    let product = match services.catalog.get_product(product_id).await {
        Ok(product) => product,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let already_in_cart = match services.cart.list_cart(principal.user_id()).await {
        Ok(lines) => lines
            .iter()
            .find(|l| l.product_id() == product_id)
            .map(|l| l.quantity())
            .unwrap_or(0),
        Err(e) => return errors::domain_error_to_response(e),
    };

    if already_in_cart + body.quantity > product.stock {
        return errors::domain_error_to_response(DomainError::insufficient_stock(&product.name));
    }

    match services
        .cart
        .upsert_cart_item(principal.user_id(), product_id, body.quantity)
        .await
    {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn remove_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(product_id): Path<String>,
) -> axum::response::Response {
    let product_id: ProductId = match product_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
        }
    };

    match services
        .cart
        .remove_cart_item(principal.user_id(), product_id)
        .await
    {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "item not in cart"),
        Err(e) => errors::domain_error_to_response(e),
    }
}
