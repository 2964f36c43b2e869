//! In-memory session used by unit tests

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::launcher::SessionLauncher;
use super::traits::{Locator, Session};
use super::webdriver::Capabilities;
use crate::error::{HarnessError, HarnessResult};
use crate::runner::target::Browser;

/// Records every call; elements listed in `present` are visible
#[derive(Clone, Default)]
pub struct MockSession {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub present: Arc<Mutex<HashSet<String>>>,
    pub texts: Arc<Mutex<Vec<(String, String)>>>,
    pub fail_on: Arc<Mutex<HashSet<String>>>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make an element visible (and, optionally, give it text)
    pub fn show(&self, locator: &Locator, text: Option<&str>) {
        let key = key(locator);
        self.present.lock().unwrap().insert(key.clone());
        if let Some(text) = text {
            self.texts.lock().unwrap().push((key, text.to_string()));
        }
    }

    pub fn hide(&self, locator: &Locator) {
        self.present.lock().unwrap().remove(&key(locator));
    }

    /// Make the named operation fail ("navigate", "screenshot", "quit", ...), or one exact
    /// call such as `click <xpath>`
    pub fn fail(&self, operation: &str) {
        self.fail_on.lock().unwrap().insert(operation.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String, operation: &str) -> Result<()> {
        let fail = {
            let fail_on = self.fail_on.lock().unwrap();
            fail_on.contains(operation) || fail_on.contains(&call)
        };
        self.calls.lock().unwrap().push(call);
        if fail {
            anyhow::bail!("mock {} failure", operation);
        }
        Ok(())
    }
}

fn key(locator: &Locator) -> String {
    locator.strategy().1.to_string()
}

#[async_trait]
impl Session for MockSession {
    fn session_id(&self) -> &str {
        "mock-session"
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        self.record(format!("navigate {}", url), "navigate")
    }

    async fn delete_all_cookies(&self) -> Result<()> {
        self.record("delete_all_cookies".into(), "delete_all_cookies")
    }

    async fn set_implicit_wait(&self, timeout: Duration) -> Result<()> {
        self.record(format!("implicit_wait {}", timeout.as_secs()), "implicit_wait")
    }

    async fn maximize_window(&self) -> Result<()> {
        self.record("maximize".into(), "maximize")
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        self.record(format!("click {}", key(locator)), "click")
    }

    async fn send_keys(&self, locator: &Locator, text: &str) -> Result<()> {
        self.record(format!("type {} {}", key(locator), text), "type")
    }

    async fn text(&self, locator: &Locator) -> Result<String> {
        self.record(format!("text {}", key(locator)), "text")?;
        let k = key(locator);
        self.texts
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(loc, _)| *loc == k)
            .map(|(_, text)| text.clone())
            .ok_or_else(|| anyhow::anyhow!("no such element: {}", k))
    }

    async fn try_locate(&self, locator: &Locator) -> Result<bool> {
        self.record(format!("locate {}", key(locator)), "locate")?;
        Ok(self.present.lock().unwrap().contains(&key(locator)))
    }

    async fn take_screenshot(&self, path: &Path) -> Result<()> {
        self.record(format!("screenshot {}", path.display()), "screenshot")?;
        std::fs::write(path, b"\x89PNG mock")?;
        Ok(())
    }

    async fn quit(&self) -> Result<()> {
        self.record("quit".into(), "quit")
    }
}

/// Launcher returning a shared `MockSession`, or a scripted error
#[derive(Clone, Default)]
pub struct MockLauncher {
    pub session: MockSession,
    pub unreachable: bool,
    pub opened: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl SessionLauncher for MockLauncher {
    async fn launch_local(&self, browser: Browser) -> HarnessResult<Box<dyn Session>> {
        self.opened.lock().unwrap().push(format!("local {}", browser));
        if self.unreachable {
            return Err(HarnessError::SessionUnavailable("mock driver down".into()));
        }
        Ok(Box::new(self.session.clone()))
    }

    async fn connect_remote(
        &self,
        hub_url: &str,
        capabilities: &Capabilities,
    ) -> HarnessResult<Box<dyn Session>> {
        self.opened.lock().unwrap().push(format!(
            "remote {} {} {}",
            hub_url,
            capabilities.browser_name,
            capabilities.platform_name.as_deref().unwrap_or("-")
        ));
        if self.unreachable {
            return Err(HarnessError::SessionUnavailable("mock hub down".into()));
        }
        Ok(Box::new(self.session.clone()))
    }
}
