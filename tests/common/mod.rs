use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/marketplace-api");
        cmd.env("MARKETPLACE_API_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server can see DATABASE_URL and JWT_SECRET from .env (loaded by the server)
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            match client.get(&url).send().await {
                Ok(resp) => {
                    // Consider server ready on any non-404 response
                    if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                        return Ok(());
                    }
                }
                Err(_) => {}
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// True when the backing database is reachable. Tests that exercise data
/// paths skip themselves when it is not, so the suite stays runnable on
/// machines without Postgres.
pub async fn db_ready(server: &TestServer) -> bool {
    let client = reqwest::Client::new();
    match client.get(format!("{}/health", server.base_url)).send().await {
        Ok(resp) => resp.status() == StatusCode::OK,
        Err(_) => false,
    }
}

/// Unique email per call so repeated test runs never collide on the
/// users_email_key constraint
pub fn unique_email(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before unix epoch")
        .as_nanos();
    format!("{}+{}@test.example.com", prefix, nanos)
}

/// Register an account and return (token, user) from the auth response
pub async fn register_user(
    server: &TestServer,
    name: &str,
    email: &str,
    role: &str,
) -> Result<(String, serde_json::Value)> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/api/auth/register", server.base_url))
        .json(&serde_json::json!({
            "name": name,
            "email": email,
            "password": "test-password-123",
            "role": role,
        }))
        .send()
        .await?;

    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "registration failed with status {}",
        res.status()
    );

    let body: serde_json::Value = res.json().await?;
    let token = body["data"]["token"]
        .as_str()
        .context("auth response missing token")?
        .to_string();
    let user = body["data"]["user"].clone();
    Ok((token, user))
}
