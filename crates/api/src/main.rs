use std::sync::Arc;

use storefront_api::app;
use storefront_api::app::services::AppServices;
use storefront_infra::PostgresStore;

#[tokio::main]
async fn main() {
    storefront_observability::init();

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });

    let app = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let store = PostgresStore::connect(&url)
                .await
                .expect("failed to connect to DATABASE_URL");
            store
                .run_migrations()
                .await
                .expect("failed to run migrations");
            tracing::info!("using postgres storage");
            app::build_app_with_services(Arc::new(AppServices::from_store(
                Arc::new(store),
                &jwt_secret,
            )))
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using in-memory storage");
            app::build_app(jwt_secret)
        }
    };

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("failed to bind 0.0.0.0:8080");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
