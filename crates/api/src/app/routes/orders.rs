use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/", post(place_order).get(history))
}

pub async fn place_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.assembler.place_order(principal.user_id()).await {
        Ok(placed) => {
            tracing::info!(
                user_id = %principal.user_id(),
                order_id = %placed.order.id,
                total = placed.order.total_price,
                "order placed"
            );
            (StatusCode::CREATED, Json(dto::placed_order_to_json(&placed))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn history(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.orders.list_orders_for_user(principal.user_id()).await {
        Ok(placed) => {
            let items: Vec<_> = placed.iter().map(dto::placed_order_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}
