use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use storefront_catalog::{NewProduct, ProductPatch};
use storefront_core::ProductId;
use storefront_inventory::ReserveOutcome;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route(
            "/:id",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route("/:id/restock", post(restock))
        .route("/:id/withdraw", post(withdraw))
}

fn parse_id(id: &str) -> Result<ProductId, axum::response::Response> {
    id.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
    })
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    let input = NewProduct {
        name: body.name,
        description: body.description,
        price: body.price,
        stock: body.stock,
    };

    match services.catalog.insert_product(input).await {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.catalog.list_products().await {
        Ok(products) => {
            (StatusCode::OK, Json(serde_json::json!({ "items": products }))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.catalog.get_product(id).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateProductRequest>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let patch = ProductPatch {
        name: body.name,
        description: body.description,
        price: body.price,
    };
    if patch.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "empty_patch",
            "at least one field must be provided",
        );
    }

    match services.catalog.update_product(id, patch).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.catalog.delete_product(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn restock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::RestockRequest>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.ledger.restock(id, body.amount).await {
        Ok(stock) => (
            StatusCode::OK,
            Json(serde_json::json!({ "id": id.to_string(), "stock": stock })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Direct stock withdrawal, outside of any order. Goes through the same
/// atomic check-and-reserve as order placement.
pub async fn withdraw(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::WithdrawRequest>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.ledger.check_and_reserve(id, body.quantity).await {
        Ok(ReserveOutcome::Reserved { remaining }) => (
            StatusCode::OK,
            Json(serde_json::json!({ "id": id.to_string(), "stock": remaining })),
        )
            .into_response(),
        Ok(ReserveOutcome::InsufficientStock { available }) => errors::json_error(
            StatusCode::CONFLICT,
            "insufficient_stock",
            format!("only {available} in stock"),
        ),
        Ok(ReserveOutcome::ProductNotFound) => {
            errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found")
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}
