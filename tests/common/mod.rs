//! Common test utilities for gitdesk integration tests
//!
//! This module provides:
//! - TestServer: an HTTP server over a temporary settings file and a scripted git runner
//! - make_request: JSON requests against the running server

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

use gitdesk::operations::{AppContext, create_registry};
use gitdesk::router::create_http_router;
use gitdesk::testing::ScriptedRunner;
use gitdesk::Config;

/// Test server managing lifecycle of the HTTP server and its temporary state
pub struct TestServer {
    port: u16,
    temp_dir: TempDir,
    context: Arc<AppContext>,
    runner: Arc<ScriptedRunner>,
    _shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

impl TestServer {
    /// Start a server whose commands all succeed with empty output
    pub async fn start() -> Result<Self, Box<dyn std::error::Error>> {
        Self::start_with_runner(ScriptedRunner::new()).await
    }

    /// Start a server that answers commands from `runner`
    pub async fn start_with_runner(runner: ScriptedRunner) -> Result<Self, Box<dyn std::error::Error>> {
        let temp_dir = TempDir::new()?;
        let config = Config::with_settings_path(temp_dir.path().join("data").join("settings.yaml"));

        let runner = Arc::new(runner);
        let context = Arc::new(AppContext::with_runner(&config, runner.clone()));
        let registry = Arc::new(create_registry(context.clone()));

        // Find an available port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();

        let router = create_http_router(registry);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            let server = axum::serve(listener, router.into_make_service()).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = server.await {
                eprintln!("Server error: {}", e);
            }
        });

        // Wait for server to be ready
        tokio::time::sleep(Duration::from_millis(100)).await;

        Ok(Self {
            port,
            temp_dir,
            context,
            runner,
            _shutdown_tx: shutdown_tx,
        })
    }

    /// Get the base URL for API requests
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Scratch directory owned by this server
    pub fn dir(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    /// Create a directory that looks like a git working tree
    pub fn make_repo(&self, name: &str) -> PathBuf {
        let repo = self.temp_dir.path().join(name);
        std::fs::create_dir_all(repo.join(".git")).expect("Failed to create repo dir");
        repo
    }

    pub fn context(&self) -> &Arc<AppContext> {
        &self.context
    }

    pub fn runner(&self) -> &ScriptedRunner {
        &self.runner
    }
}

/// Helper function to make HTTP requests
pub async fn make_request(
    method: &str,
    url: &str,
    body: Option<serde_json::Value>,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();

    let request = match method {
        "GET" => client.get(url),
        "POST" => {
            let mut req = client.post(url);
            if let Some(json_body) = body {
                req = req.json(&json_body);
            }
            req
        }
        _ => panic!("Unsupported HTTP method: {}", method),
    };

    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(format!("HTTP error {}: {}", status, text).into());
    }

    let json: serde_json::Value = serde_json::from_str(&text)?;
    Ok(json)
}

// Re-export commonly used types for tests
pub use serde_json::json;
