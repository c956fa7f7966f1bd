// tests/common/mod.rs

#![allow(dead_code)]

use optik_portal::{
    config::Config, routes, state::AppState, utils::hash::hash_password, utils::text::Casing,
};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

pub const ADMIN_EMAIL: &str = "admin@mail.com";
pub const ADMIN_PASSWORD: &str = "admin-password";

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub client: reqwest::Client,
}

/// Spawns the app on a random port backed by a fresh in-memory database.
pub async fn spawn_app() -> TestApp {
    // A single connection that never expires keeps the in-memory database alive.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        jwt_remember_expiration: 3600,
        rust_log: "error".to_string(),
        admin_email: None,
        admin_password: None,
        port: 0,
        partition_casing: Casing::Turkish,
    };

    seed_admin(&pool).await;

    let state = AppState {
        pool: pool.clone(),
        config,
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        pool,
        client: reqwest::Client::new(),
    }
}

async fn seed_admin(pool: &SqlitePool) {
    sqlx::query(
        "INSERT INTO users (email, password, role, created_at) VALUES (?, ?, 'admin', ?)",
    )
    .bind(ADMIN_EMAIL)
    .bind(hash_password(ADMIN_PASSWORD).unwrap())
    .bind(chrono::Utc::now())
    .execute(pool)
    .await
    .expect("Failed to seed admin");
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn login(&self, email: &str, password: &str) -> serde_json::Value {
        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Login request failed");
        assert_eq!(response.status().as_u16(), 200, "login should succeed");
        response.json().await.expect("Failed to parse login json")
    }

    pub async fn admin_token(&self) -> String {
        let body = self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        body["token"].as_str().expect("Token not found").to_string()
    }

    /// Creates a student through the admin API and returns (email, token).
    pub async fn student(&self, admin: &str, first: &str, last: &str) -> (String, String) {
        let email = format!("s_{}@school.test", &uuid::Uuid::new_v4().to_string()[..8]);
        let password = "student-pass";

        let response = self
            .client
            .post(self.url("/api/admin/students"))
            .bearer_auth(admin)
            .json(&serde_json::json!({
                "email": email,
                "first_name": first,
                "last_name": last,
                "password": password,
            }))
            .send()
            .await
            .expect("Create student failed");
        assert_eq!(response.status().as_u16(), 201);

        let body = self.login(&email, password).await;
        (email, body["token"].as_str().unwrap().to_string())
    }

    pub async fn post_admin(
        &self,
        admin: &str,
        path: &str,
        body: serde_json::Value,
    ) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(admin)
            .json(&body)
            .send()
            .await
            .expect("Request failed")
    }

    /// Creates a test category and a test in it; returns the test id.
    pub async fn create_test(
        &self,
        admin: &str,
        category: &str,
        grade: i64,
        name: &str,
        question_count: u32,
        answer_key: &str,
    ) -> i64 {
        let response = self
            .post_admin(
                admin,
                "/api/admin/categories",
                serde_json::json!({ "name": category, "kind": "test" }),
            )
            .await;
        let category_id = match response.status().as_u16() {
            201 => response.json::<serde_json::Value>().await.unwrap()["id"]
                .as_i64()
                .unwrap(),
            409 => sqlx::query_scalar::<_, i64>(
                "SELECT id FROM categories WHERE kind = 'test' AND name = ?",
            )
            .bind(category)
            .fetch_one(&self.pool)
            .await
            .unwrap(),
            other => panic!("unexpected status {other} creating category"),
        };

        let response = self
            .post_admin(
                admin,
                "/api/admin/tests",
                serde_json::json!({
                    "category_id": category_id,
                    "grade": grade,
                    "name": name,
                    "link": "https://example.com/test.pdf",
                    "question_count": question_count,
                    "answer_key": answer_key,
                }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201, "test should be created");
        response.json::<serde_json::Value>().await.unwrap()["id"]
            .as_i64()
            .unwrap()
    }
}
