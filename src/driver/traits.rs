use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Element locator for page objects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Select by XPath expression
    XPath(String),
    /// Select by CSS selector
    Css(String),
}

impl Locator {
    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    /// (strategy, value) pair of the W3C "Find Element" command
    pub fn strategy(&self) -> (&'static str, &str) {
        match self {
            Locator::XPath(expr) => ("xpath", expr),
            Locator::Css(selector) => ("css selector", selector),
        }
    }
}

/// An active browser automation context bound to one test class
///
/// Page objects only ever talk to the browser through this trait, so a session can be a
/// local driver, a remote grid node, or a test double.
#[async_trait]
pub trait Session: Send + Sync {
    /// Identifier assigned by the driver
    fn session_id(&self) -> &str;

    /// Navigate to a URL
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Remove all cookies of the current browsing context
    async fn delete_all_cookies(&self) -> Result<()>;

    /// Bound element resolution by an implicit wait
    async fn set_implicit_wait(&self, timeout: Duration) -> Result<()>;

    /// Maximize the browser window
    async fn maximize_window(&self) -> Result<()>;

    /// Click an element
    async fn click(&self, locator: &Locator) -> Result<()>;

    /// Type text into an element
    async fn send_keys(&self, locator: &Locator, text: &str) -> Result<()>;

    /// Visible text of an element
    async fn text(&self, locator: &Locator) -> Result<String>;

    /// Whether the element exists and is displayed.
    ///
    /// Absence is an answer, not an error; `Err` is reserved for transport failures.
    async fn try_locate(&self, locator: &Locator) -> Result<bool>;

    /// Save a PNG screenshot of the viewport to `path`
    async fn take_screenshot(&self, path: &Path) -> Result<()>;

    /// End the session and close the browser
    async fn quit(&self) -> Result<()>;
}
