//! W3C WebDriver client
//!
//! Speaks the WebDriver wire protocol over HTTP, against either a local driver binary
//! (chromedriver, geckodriver, msedgedriver) or a Selenium grid hub.

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::driver::local::LocalDriverService;
use crate::driver::traits::{Locator, Session};
use crate::error::{HarnessError, HarnessResult};

/// W3C web element identifier key
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Upper bound for a single command, including implicit element waits
const COMMAND_TIMEOUT: Duration = Duration::from_secs(120);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Capability descriptor sent when opening a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub browser_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_name: Option<String>,
}

impl Capabilities {
    /// New Session payload, with the legacy `desiredCapabilities` mirror for older hubs
    pub fn to_payload(&self) -> Value {
        json!({
            "capabilities": { "alwaysMatch": self },
            "desiredCapabilities": self,
        })
    }
}

/// A live WebDriver session
pub struct WebDriverSession {
    client: Client,
    endpoint: String,
    session_id: String,
    /// Local driver process backing this session, if any
    service: Mutex<Option<LocalDriverService>>,
}

impl WebDriverSession {
    /// Open a new session on `endpoint`
    pub async fn create(
        endpoint: &str,
        capabilities: &Capabilities,
        service: Option<LocalDriverService>,
    ) -> HarnessResult<Self> {
        let client = http_client()?;
        let endpoint = endpoint.trim_end_matches('/').to_string();
        let url = format!("{}/session", endpoint);

        let body = send(&client, Method::POST, &url, Some(capabilities.to_payload()))
            .await
            .map_err(|e| {
                HarnessError::SessionUnavailable(format!("cannot open session at {}: {}", url, e))
            })?;

        // W3C puts the id under `value`; legacy JSON-wire hubs put it at the top level
        let session_id = body
            .pointer("/value/sessionId")
            .or_else(|| body.get("sessionId"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                HarnessError::SessionUnavailable(format!("no sessionId in response from {}", url))
            })?
            .to_string();

        debug!("Opened WebDriver session {} at {}", session_id, endpoint);

        Ok(Self {
            client,
            endpoint,
            session_id,
            service: Mutex::new(service),
        })
    }

    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> HarnessResult<Value> {
        let url = format!("{}/session/{}{}", self.endpoint, self.session_id, path);
        let response = send(&self.client, method, &url, body).await?;
        Ok(response.get("value").cloned().unwrap_or(Value::Null))
    }

    async fn find_element(&self, locator: &Locator) -> HarnessResult<String> {
        let (using, value) = locator.strategy();
        let found = self
            .command(
                Method::POST,
                "/element",
                Some(json!({ "using": using, "value": value })),
            )
            .await?;

        found
            .get(ELEMENT_KEY)
            .or_else(|| found.get("ELEMENT"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| HarnessError::WebDriver {
                error: "invalid response".into(),
                message: format!("no element reference for {:?}", locator),
            })
    }
}

#[async_trait]
impl Session for WebDriverSession {
    fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await
            .with_context(|| format!("Failed to navigate to {}", url))?;
        Ok(())
    }

    async fn delete_all_cookies(&self) -> Result<()> {
        self.command(Method::DELETE, "/cookie", None).await?;
        Ok(())
    }

    async fn set_implicit_wait(&self, timeout: Duration) -> Result<()> {
        self.command(
            Method::POST,
            "/timeouts",
            Some(json!({ "implicit": timeout.as_millis() as u64 })),
        )
        .await?;
        Ok(())
    }

    async fn maximize_window(&self) -> Result<()> {
        self.command(Method::POST, "/window/maximize", Some(json!({})))
            .await?;
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        let id = self.find_element(locator).await?;
        self.command(Method::POST, &format!("/element/{}/click", id), Some(json!({})))
            .await
            .with_context(|| format!("Failed to click {:?}", locator))?;
        Ok(())
    }

    async fn send_keys(&self, locator: &Locator, text: &str) -> Result<()> {
        let id = self.find_element(locator).await?;
        self.command(
            Method::POST,
            &format!("/element/{}/value", id),
            Some(json!({ "text": text })),
        )
        .await
        .with_context(|| format!("Failed to type into {:?}", locator))?;
        Ok(())
    }

    async fn text(&self, locator: &Locator) -> Result<String> {
        let id = self.find_element(locator).await?;
        let value = self
            .command(Method::GET, &format!("/element/{}/text", id), None)
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn try_locate(&self, locator: &Locator) -> Result<bool> {
        let id = match self.find_element(locator).await {
            Ok(id) => id,
            Err(HarnessError::WebDriver { ref error, .. }) if is_absence(error) => {
                return Ok(false)
            }
            Err(e) => return Err(e.into()),
        };

        match self
            .command(Method::GET, &format!("/element/{}/displayed", id), None)
            .await
        {
            Ok(value) => Ok(value.as_bool().unwrap_or(false)),
            Err(HarnessError::WebDriver { ref error, .. }) if is_absence(error) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn take_screenshot(&self, path: &Path) -> Result<()> {
        let value = self.command(Method::GET, "/screenshot", None).await?;
        let encoded = value
            .as_str()
            .context("Screenshot response is not a base64 string")?;
        let bytes = STANDARD
            .decode(encoded)
            .context("Screenshot is not valid base64")?;
        tokio::fs::write(path, bytes)
            .await
            .with_context(|| format!("Failed to write screenshot {}", path.display()))?;
        Ok(())
    }

    async fn quit(&self) -> Result<()> {
        let result = self.command(Method::DELETE, "", None).await;

        if let Some(mut service) = self.service.lock().await.take() {
            service.stop().await;
        }

        result.with_context(|| format!("Failed to close session {}", self.session_id))?;
        Ok(())
    }
}

fn is_absence(error: &str) -> bool {
    error == "no such element" || error == "stale element reference"
}

pub(crate) fn http_client() -> HarnessResult<Client> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(COMMAND_TIMEOUT)
        .build()
        .map_err(|e| HarnessError::SessionUnavailable(format!("cannot build HTTP client: {}", e)))
}

/// Send one wire-protocol request and return the full response body
async fn send(client: &Client, method: Method, url: &str, body: Option<Value>) -> HarnessResult<Value> {
    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await.map_err(|e| HarnessError::WebDriver {
        error: "transport".into(),
        message: e.to_string(),
    })?;

    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if let Some(error) = body.pointer("/value/error").and_then(Value::as_str) {
        return Err(HarnessError::WebDriver {
            error: error.to_string(),
            message: body
                .pointer("/value/message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        });
    }

    if !status.is_success() {
        return Err(HarnessError::WebDriver {
            error: format!("http {}", status.as_u16()),
            message: body.to_string(),
        });
    }

    Ok(body)
}
