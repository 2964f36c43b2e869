use log::{debug, info, warn};
use std::net::TcpListener;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};

use crate::error::{HarnessError, HarnessResult};
use crate::runner::target::Browser;
use crate::utils::binary_resolver::find_binary;

const STARTUP_TIMEOUT: Duration = Duration::from_secs(20);
const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A driver binary (chromedriver, geckodriver, msedgedriver) listening on a local port
pub struct LocalDriverService {
    child: Child,
    url: String,
}

impl LocalDriverService {
    /// Start the driver for `browser` and wait until it answers `/status`
    pub async fn start(browser: Browser) -> HarnessResult<Self> {
        let binary = find_binary(browser.driver_binary())
            .map_err(|e| HarnessError::SessionUnavailable(e.to_string()))?;
        let port = free_port()?;

        info!(
            "Starting {} on port {} ({})",
            browser.driver_binary(),
            port,
            binary.display()
        );

        let child = Command::new(&binary)
            .arg(format!("--port={}", port))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                HarnessError::SessionUnavailable(format!(
                    "failed to launch {}: {}",
                    binary.display(),
                    e
                ))
            })?;

        let mut service = Self {
            child,
            url: format!("http://127.0.0.1:{}", port),
        };

        if let Err(e) = service.wait_until_ready().await {
            service.stop().await;
            return Err(e);
        }
        Ok(service)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn wait_until_ready(&mut self) -> HarnessResult<()> {
        let client = crate::driver::webdriver::http_client()?;
        let status_url = format!("{}/status", self.url);
        let deadline = Instant::now() + STARTUP_TIMEOUT;

        loop {
            if let Ok(Some(exit)) = self.child.try_wait() {
                return Err(HarnessError::SessionUnavailable(format!(
                    "driver exited during startup ({})",
                    exit
                )));
            }

            match client.get(&status_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    debug!("Driver ready at {}", self.url);
                    return Ok(());
                }
                Ok(resp) => debug!("Driver not ready yet: HTTP {}", resp.status()),
                Err(e) => debug!("Driver not reachable yet: {}", e),
            }

            if Instant::now() >= deadline {
                return Err(HarnessError::SessionUnavailable(format!(
                    "driver at {} not ready after {:?}",
                    self.url, STARTUP_TIMEOUT
                )));
            }
            tokio::time::sleep(STATUS_POLL_INTERVAL).await;
        }
    }

    /// Kill the driver process
    pub async fn stop(&mut self) {
        if let Err(e) = self.child.kill().await {
            warn!("Failed to stop driver at {}: {}", self.url, e);
        }
    }
}

/// Ask the OS for an unused local port
fn free_port() -> HarnessResult<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}
