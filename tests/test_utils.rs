#![allow(dead_code)]

use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use portfolio_media::{
    auth::jwt::JwtService,
    middlewares::auth::AuthMiddleware,
    routes::configure_routes,
    settings::{AppConfig, AppEnvironment, StorageBackend},
    shared_repos::SharedRepositories,
    storage::memory::InMemoryMediaStorage,
    AppState,
};
use reqwest::{multipart, Client, Response};
use serde_json::Value;
use std::{net::TcpListener, sync::Arc, time::Duration};

pub const BUCKET: &str = "portfolio-test";

pub struct TestApp {
    pub state: Arc<AppState>,
    pub address: String,
    pub client: Client,
    pub config: AppConfig,
    pub storage: Arc<InMemoryMediaStorage>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let config = test_config();

        let storage = Arc::new(InMemoryMediaStorage::new(BUCKET, config.s3_public_host.clone()));
        let state = Arc::new(AppState::new(
            &config,
            SharedRepositories::in_memory(),
            storage.clone(),
        ));

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let state_clone = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::from(state_clone.clone()))
                .wrap(NormalizePath::trim())
                .wrap(AuthMiddleware)
                .configure(configure_routes)
        })
        .listen(listener)
        .expect("Failed to bind server")
        .workers(config.worker_count)
        .run();

        tokio::spawn(server);

        let client = Client::new();
        while client.get(format!("{}/health", address)).send().await.is_err() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Self {
            state,
            address,
            client,
            config,
            storage,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn admin_token(&self) -> String {
        JwtService::new(&self.config)
            .create_jwt("admin@example.com", true)
            .expect("Failed to create admin token")
    }

    pub fn visitor_token(&self) -> String {
        JwtService::new(&self.config)
            .create_jwt("visitor@example.com", false)
            .expect("Failed to create visitor token")
    }

    pub async fn upload(&self, file_name: &str, content_type: &str, body: Vec<u8>) -> Response {
        let part = multipart::Part::bytes(body)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .expect("Invalid mime type");
        let form = multipart::Form::new().part("file", part);

        self.client
            .post(self.url("/media/upload"))
            .bearer_auth(self.admin_token())
            .multipart(form)
            .send()
            .await
            .expect("Failed to upload media")
    }

    /// Uploads a small PNG and returns the media JSON.
    pub async fn upload_png(&self, file_name: &str) -> Value {
        let response = self.upload(file_name, "image/png", b"\x89PNG\r\n\x1a\n".to_vec()).await;
        assert_eq!(response.status(), 201, "upload of {} failed", file_name);
        response.json().await.expect("Invalid media JSON")
    }

    pub async fn create_project(&self, body: &Value) -> Response {
        self.client
            .post(self.url("/projects"))
            .bearer_auth(self.admin_token())
            .json(body)
            .send()
            .await
            .expect("Failed to create project")
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute GET")
    }

    pub async fn admin_post(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .bearer_auth(self.admin_token())
            .json(body)
            .send()
            .await
            .expect("Failed to execute POST")
    }

    pub async fn admin_delete(&self, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .bearer_auth(self.admin_token())
            .send()
            .await
            .expect("Failed to execute DELETE")
    }
}

pub fn project_body(name: &str, media: &[&str], tech_stack: &[&str]) -> Value {
    serde_json::json!({
        "name": name,
        "description": format!("{} description", name),
        "shortDescription": "Short",
        "repositoryLink": "https://github.com/example/portfolio",
        "isPublished": true,
        "media": media,
        "techStack": tech_stack
            .iter()
            .map(|t| serde_json::json!({ "name": t, "iconUrl": format!("https://icons.example.com/{}.svg", t) }))
            .collect::<Vec<_>>(),
    })
}

/// Object key of a stored media URL.
pub fn key_of(media: &Value) -> String {
    let url = media["url"].as_str().expect("media url");
    url.splitn(4, '/').nth(3).expect("key in url").to_string()
}

fn test_config() -> AppConfig {
    AppConfig {
        env: AppEnvironment::Testing,
        name: "Portfolio Media Test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        worker_count: 1,
        database_url: "memory://".to_string(),
        cors_allowed_origins: vec!["*".to_string()],
        jwt_secret: "test_jwt_secret_that_is_long_enough_for_hs512_1234567890".to_string(),
        jwt_expiration_minutes: 5,
        storage_backend: StorageBackend::Memory,
        s3_bucket: BUCKET.to_string(),
        s3_region: "us-east-1".to_string(),
        s3_endpoint: None,
        s3_access_key_id: None,
        s3_secret_access_key: None,
        s3_public_host: "s3.amazonaws.com".to_string(),
    }
}
