//! Test server management.
//!
//! Spawns and manages orbd instances for integration testing.

use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

/// Applications and channels every test server starts with.
const FIXTURE: &str = r#"
[[apps]]
name = "Red Button"
app_id = 1
org_id = 999
base_url = "http://apps.example.tv/red/"
initial_path = "index.html"
origin = "http://apps.example.tv"

[[apps]]
name = "Portal"
app_id = 2
org_id = 999
base_url = "http://portal.example.tv/"
initial_path = "start.html"
origin = "http://portal.example.tv"
broadcast_related = false

[[apps]]
name = "Test Runner"
app_id = 3
org_id = 1
base_url = "http://127.0.0.1/"
initial_path = "runner.html"
origin = "http://127.0.0.1"
trusted = true

[[channels]]
ccid = "ccid:dvbt.1"
name = "One"
onid = 9018
tsid = 4100
sid = 4164
applications = [1]

[[channels]]
ccid = "ccid:dvbt.2"
name = "Two"
onid = 9018
tsid = 4100
sid = 4228

[terminal]
country_id = "GBR"
"#;

/// A test server instance.
pub struct TestServer {
    child: Child,
    port: u16,
    _dir: TempDir,
}

impl TestServer {
    /// Spawn a server with test reports enabled.
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_with(true).await
    }

    /// Spawn a server, choosing whether the `Debug.*` methods exist.
    pub async fn spawn_with(test_reports: bool) -> anyhow::Result<Self> {
        let port = free_port()?;
        let dir = tempfile::tempdir()?;
        let config_path = dir.path().join("config.toml");
        let config_content = format!(
            r#"
[bridge]
name = "test.bridge"
listen = "127.0.0.1:{port}"
metrics_port = 0
test_reports = {test_reports}
initial_channel = "ccid:dvbt.1"
{FIXTURE}"#
        );
        std::fs::write(&config_path, config_content)?;

        let child = Command::new(env!("CARGO_BIN_EXE_orbd"))
            .arg(&config_path)
            .env("RUST_LOG", "warn")
            .stdout(Stdio::null())
            .spawn()?;

        let server = Self {
            child,
            port,
            _dir: dir,
        };
        server.wait_until_ready().await?;
        Ok(server)
    }

    /// Wait until the server is accepting connections.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..50 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Server failed to start within 5 seconds")
    }

    /// Get the server address.
    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// Create a new test client connected to this server.
    pub async fn connect(&self) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::connect(&self.address()).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn free_port() -> anyhow::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}
