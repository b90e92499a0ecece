use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// End-to-end tests need a reachable Postgres (DATABASE_URL) and are opted
/// into explicitly; without the env var every test is a silent skip.
pub fn enabled() -> bool {
    std::env::var("INKCASE_TEST_SERVER").is_ok()
}

/// A throwaway email/username per test run
pub fn unique_handle(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

/// Create a throwaway account and return its bearer token.
#[allow(dead_code)]
pub async fn signup_token(server: &TestServer, prefix: &str) -> Result<String> {
    let handle = unique_handle(prefix);
    let res = reqwest::Client::new()
        .post(format!("{}/signup", server.base_url))
        .json(&serde_json::json!({
            "username": handle,
            "email": format!("{}@example.com", handle),
            "password": "secret1",
        }))
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    body["user"]["token"]
        .as_str()
        .map(str::to_string)
        .context("signup response had no token")
}

pub struct TestServer {
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
        let mut cmd = Command::new("target/debug/inkcase-api");
        cmd.env("INKCASE_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server sees DATABASE_URL and JWT_SECRET
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}
