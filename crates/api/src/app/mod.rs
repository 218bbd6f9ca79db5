//! HTTP application wiring (axum router + service wiring).
//!
//! - `services.rs`: store and service construction
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router over the in-memory store (used by `main.rs`
/// and the black-box tests).
pub fn build_app(jwt_secret: String) -> Router {
    build_app_with_services(Arc::new(services::build_services(&jwt_secret)))
}

pub fn build_app_with_services(services: Arc<services::AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        services: services.clone(),
    };

    // Cart and order routes require a principal; catalog and account
    // routes do not.
    let protected = routes::protected_router()
        .layer(Extension(services.clone()))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    routes::public_router()
        .layer(Extension(services))
        .merge(protected)
        .layer(ServiceBuilder::new())
}
