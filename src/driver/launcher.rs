use async_trait::async_trait;

use crate::driver::local::LocalDriverService;
use crate::driver::traits::Session;
use crate::driver::webdriver::{Capabilities, WebDriverSession};
use crate::error::HarnessResult;
use crate::runner::target::Browser;

/// Opens raw browser sessions; the session manager layers setup and teardown on top
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    /// Start a browser through a local driver binary
    async fn launch_local(&self, browser: Browser) -> HarnessResult<Box<dyn Session>>;

    /// Open a session on a remote grid hub
    async fn connect_remote(
        &self,
        hub_url: &str,
        capabilities: &Capabilities,
    ) -> HarnessResult<Box<dyn Session>>;
}

/// Launcher backed by the W3C WebDriver client
#[derive(Debug, Default, Clone, Copy)]
pub struct WebDriverLauncher;

#[async_trait]
impl SessionLauncher for WebDriverLauncher {
    async fn launch_local(&self, browser: Browser) -> HarnessResult<Box<dyn Session>> {
        let service = LocalDriverService::start(browser).await?;
        let endpoint = service.url().to_string();
        let capabilities = Capabilities {
            browser_name: browser.local_name().to_string(),
            platform_name: None,
        };

        // The session owns the driver process; if opening fails it is dropped and killed
        let session = WebDriverSession::create(&endpoint, &capabilities, Some(service)).await?;
        Ok(Box::new(session))
    }

    async fn connect_remote(
        &self,
        hub_url: &str,
        capabilities: &Capabilities,
    ) -> HarnessResult<Box<dyn Session>> {
        let session = WebDriverSession::create(hub_url, capabilities, None).await?;
        Ok(Box::new(session))
    }
}
