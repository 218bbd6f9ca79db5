use axum::{routing::get, Router};

pub mod cart;
pub mod orders;
pub mod products;
pub mod system;
pub mod users;

/// Routes open to anonymous callers.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .nest("/users", users::router())
        .nest("/products", products::router())
}

/// Routes that require a bearer token.
pub fn protected_router() -> Router {
    Router::new()
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
}
