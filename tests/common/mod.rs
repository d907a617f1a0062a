#![allow(dead_code)]

use std::net::SocketAddr;
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::Value;

pub const GOOD_TOKEN: &str = "good-token";
pub const VIEWER_TOKEN: &str = "viewer-token";
pub const UNKNOWN_TOKEN: &str = "unknown-token";

/// In-process stand-in for the token decoder's `/check-role` endpoint.
///
/// `GOOD_TOKEN` holds every role, `VIEWER_TOKEN` only `viewer`, and
/// `UNKNOWN_TOKEN` is answered with a 404 error document.
pub struct MockRoleService {
    pub addr: SocketAddr,
    pub requests: Arc<Mutex<Vec<(String, Value)>>>,
}

impl MockRoleService {
    pub async fn start() -> Result<Self> {
        let requests: Arc<Mutex<Vec<(String, Value)>>> = Arc::default();
        let seen = requests.clone();

        let router = Router::new().route(
            "/check-role",
            post(move |headers: HeaderMap, Json(roles): Json<Value>| {
                let seen = seen.clone();
                async move {
                    let token = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.strip_prefix("Bearer "))
                        .unwrap_or_default()
                        .to_string();
                    seen.lock().unwrap().push((token.clone(), roles.clone()));
                    check_role(&token, &roles)
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });
        Ok(Self { addr, requests })
    }

    /// Serve a fixed status and raw body for every `/check-role` call.
    pub async fn fixed(status: StatusCode, body: &'static str) -> Result<SocketAddr> {
        let router = Router::new().route("/check-role", post(move || async move { (status, body) }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });
        Ok(addr)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

fn check_role(token: &str, roles: &Value) -> (StatusCode, Json<Value>) {
    let asked: Vec<&str> = roles
        .as_array()
        .map(|a| a.iter().filter_map(|r| r["name"].as_str()).collect())
        .unwrap_or_default();

    match token {
        GOOD_TOKEN => (StatusCode::OK, Json(Value::from("ok"))),
        VIEWER_TOKEN if asked.contains(&"viewer") => (StatusCode::OK, Json(Value::from("ok"))),
        VIEWER_TOKEN => (
            StatusCode::OK,
            Json(Value::from("User does not have the required roles")),
        ),
        _ => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "token not found" })),
        ),
    }
}

/// The service binary running against the in-memory store.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    pub async fn start(role_service_url: &str) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let child = Command::new(env!("CARGO_BIN_EXE_sheet-crud"))
            .env("PORT", port.to_string())
            .env("STORAGE_BACKEND", "memory")
            .env("JWT_TOKEN_DECODER", role_service_url)
            .env("LOG_LEVEL", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        let server = Self { port, base_url, child };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            let url = format!("{}/ping", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
