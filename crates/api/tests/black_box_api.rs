use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = storefront_api::app::build_app("test-secret".to_string());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn register(client: &reqwest::Client, base_url: &str, username: &str) -> String {
    let res = client
        .post(format!("{}/users/register", base_url))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "password123",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

async fn create_product(
    client: &reqwest::Client,
    base_url: &str,
    name: &str,
    price: i64,
    stock: i64,
) -> String {
    let res = client
        .post(format!("{}/products", base_url))
        .json(&json!({
            "name": name,
            "description": "",
            "price": price,
            "stock": stock,
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn cart_and_order_routes_require_a_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for path in ["/cart", "/orders"] {
        let res = client
            .get(format!("{}{}", srv.base_url, path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{path}");
    }

    let res = client
        .get(format!("{}/cart", srv.base_url))
        .bearer_auth("garbage")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_login_and_duplicate_usernames() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    register(&client, &srv.base_url, "alice").await;

    let res = client
        .post(format!("{}/users/login", srv.base_url))
        .json(&json!({"username": "alice", "password": "password123"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/users/login", srv.base_url))
        .json(&json!({"username": "alice", "password": "wrong-password"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(format!("{}/users/register", srv.base_url))
        .json(&json!({
            "username": "alice",
            "email": "again@example.com",
            "password": "password456",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn full_shopping_flow_register_stock_cart_order_history() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let token = register(&client, &srv.base_url, "alice").await;
    let product_id = create_product(&client, &srv.base_url, "pork loin", 1500, 5).await;

    let res = client
        .post(format!("{}/cart/items", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({"product_id": product_id, "quantity": 2}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .get(format!("{}/cart", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let cart: serde_json::Value = res.json().await.unwrap();
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["total"], 3000);

    let res = client
        .post(format!("{}/orders", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let order: serde_json::Value = res.json().await.unwrap();
    assert_eq!(order["total_price"], 3000);
    assert_eq!(order["items"].as_array().unwrap().len(), 1);

    // Stock was consumed and the cart emptied.
    let res = client
        .get(format!("{}/products/{}", srv.base_url, product_id))
        .send()
        .await
        .unwrap();
    let product: serde_json::Value = res.json().await.unwrap();
    assert_eq!(product["stock"], 3);

    let res = client
        .get(format!("{}/cart", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let cart: serde_json::Value = res.json().await.unwrap();
    assert!(cart["items"].as_array().unwrap().is_empty());

    let res = client
        .get(format!("{}/orders", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let history: serde_json::Value = res.json().await.unwrap();
    assert_eq!(history["items"].as_array().unwrap().len(), 1);
    assert_eq!(history["items"][0]["total_price"], 3000);
}

#[tokio::test]
async fn adding_more_than_the_shelf_holds_is_a_conflict() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let token = register(&client, &srv.base_url, "alice").await;
    let product_id = create_product(&client, &srv.base_url, "ribs", 800, 3).await;

    let res = client
        .post(format!("{}/cart/items", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({"product_id": product_id, "quantity": 2}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // 2 already in the cart; 2 more would exceed the stock of 3.
    let res = client
        .post(format!("{}/cart/items", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({"product_id": product_id, "quantity": 2}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn placing_an_order_with_an_empty_cart_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let token = register(&client, &srv.base_url, "alice").await;

    let res = client
        .post(format!("{}/orders", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "empty_cart");
}

#[tokio::test]
async fn restock_and_withdraw_move_stock_through_the_ledger() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let product_id = create_product(&client, &srv.base_url, "loin", 1500, 2).await;

    let res = client
        .post(format!("{}/products/{}/restock", srv.base_url, product_id))
        .json(&json!({"amount": 3}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["stock"], 5);

    let res = client
        .post(format!("{}/products/{}/withdraw", srv.base_url, product_id))
        .json(&json!({"quantity": 4}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["stock"], 1);

    let res = client
        .post(format!("{}/products/{}/withdraw", srv.base_url, product_id))
        .json(&json!({"quantity": 2}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}
