use std::net::SocketAddr;

use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use storefront::config::Config;

/// A running API instance bound to an ephemeral port, backed by a database
/// created just for this test.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
}

/// Swap the database name at the end of a Postgres URL.
fn with_db_name(base_url: &str, name: &str) -> String {
    match base_url.rsplit_once('/') {
        Some((base, _)) => format!("{base}/{name}"),
        None => base_url.to_string(),
    }
}

async fn admin_pool() -> PgPool {
    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    PgPoolOptions::new()
        .max_connections(2)
        .connect(&with_db_name(&base_url, "postgres"))
        .await
        .expect("Failed to connect to the postgres maintenance database")
}

async fn into_json(resp: Response) -> (Value, StatusCode) {
    let status = resp.status();
    let body = resp.json().await.unwrap_or(Value::Null);
    (body, status)
}

/// Spawn a test app: fresh database, migrations, server on a random port.
pub async fn spawn_app() -> TestApp {
    let _ = dotenvy::dotenv();
    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let db_name = format!("storefront_test_{}", Uuid::new_v4().simple());

    let admin = admin_pool().await;
    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin)
        .await
        .expect("Failed to create test database");
    admin.close().await;

    let test_url = with_db_name(&base_url, &db_name);
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let config = Config {
        database_url: test_url,
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        app_url: "http://api.test".to_string(),
        jwt_secret: b"test-jwt-secret-that-is-long-enough".to_vec(),
        log_level: "warn".to_string(),
        smtp: None,
        bootstrap_admin: None,
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind an ephemeral port");
    let addr = listener.local_addr().unwrap();

    let app = storefront::build_app(pool.clone(), config);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        pool,
        client: Client::new(),
        db_name,
    }
}

/// Drop the per-test database.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let admin = admin_pool().await;
    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin)
        .await;
    admin.close().await;
}

/// A phone number that will not collide with other test registrations.
pub fn unique_phone() -> String {
    format!("+1555{}", &Uuid::new_v4().simple().to_string()[..9])
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Register a customer account with a complete profile.
    pub async fn register(&self, email: &str, password: &str, phone: &str) -> (Value, StatusCode) {
        self.post(
            "/api/v1/user/create",
            &json!({
                "first_name": "Test",
                "last_name": "Customer",
                "email": email,
                "password": password,
                "password_confirmation": password,
                "address": "1 Main Street",
                "phone_number": phone,
            }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> (Value, StatusCode) {
        self.post(
            "/api/v1/user/login",
            &json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Register + login a customer, return the bearer token.
    pub async fn customer_token(&self, email: &str, password: &str) -> String {
        let (body, status) = self.register(email, password, &unique_phone()).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        let (body, status) = self.login(email, password).await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Register an account, promote it to admin directly in the database,
    /// then login and return the bearer token.
    pub async fn admin_token(&self, email: &str, password: &str) -> String {
        let (body, status) = self.register(email, password, &unique_phone()).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");

        sqlx::query("UPDATE users SET is_admin = true WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await
            .expect("failed to promote test admin");

        let (body, status) = self.login(email, password).await;
        assert_eq!(status, StatusCode::OK, "admin login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn get(&self, path: &str) -> (Value, StatusCode) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        into_json(resp).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .unwrap();
        into_json(resp).await
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        into_json(resp).await
    }

    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .unwrap();
        into_json(resp).await
    }

    pub async fn put_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .unwrap();
        into_json(resp).await
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        into_json(resp).await
    }
}
