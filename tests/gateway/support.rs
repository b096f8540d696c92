use linkshelf::auth::SessionManager;
use linkshelf::config::Config;
use linkshelf::gateway::run_gateway_with_listener;
use linkshelf::store::SqliteBookmarkStore;
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const EMAIL: &str = "reader@example.com";
pub const PASSWORD: &str = "correct horse battery";

pub struct GatewayTestServer {
    port: u16,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
    _workspace: TempDir,
}

impl GatewayTestServer {
    /// Start a gateway on an ephemeral port with one registered user.
    pub async fn start(reader_url: &str) -> Self {
        let workspace = TempDir::new().expect("temp workspace should be created");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral gateway listener should bind");
        let port = listener
            .local_addr()
            .expect("ephemeral gateway listener should expose local address")
            .port();

        let mut config = Config::default();
        config.workspace_dir = workspace.path().to_path_buf();
        config.config_path = workspace.path().join("config.toml");
        config.database_path = Some(workspace.path().join("linkshelf.db"));
        config.reader.base_url = reader_url.to_string();
        // Mock pages live on 127.0.0.1.
        config.fetch.block_private_hosts = false;

        let store = SqliteBookmarkStore::open(&config.database_path())
            .await
            .expect("database should open");
        SessionManager::new(Arc::new(store), config.auth.token_ttl_secs)
            .register(EMAIL, PASSWORD)
            .await
            .expect("test user should be created");

        let host = "127.0.0.1".to_string();
        let handle =
            tokio::spawn(async move { run_gateway_with_listener(&host, listener, config).await });

        wait_until_gateway_ready(port).await;

        Self {
            port,
            handle,
            _workspace: workspace,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }

    /// Log the test user in and return the bearer token.
    pub async fn login(&self, client: &reqwest::Client) -> String {
        let response = client
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({"email": EMAIL, "password": PASSWORD}))
            .send()
            .await
            .expect("login request should complete");
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.expect("login response should be json");
        body["token"]
            .as_str()
            .expect("login response should carry a token")
            .to_string()
    }
}

impl Drop for GatewayTestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn wait_until_gateway_ready(port: u16) {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .expect("reqwest client should be built");

    for _ in 0..200 {
        let health = client
            .get(format!("http://127.0.0.1:{port}/health"))
            .send()
            .await;
        if matches!(health, Ok(resp) if resp.status() == StatusCode::OK) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    panic!("gateway did not become ready on port {port}");
}
