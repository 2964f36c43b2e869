//! Session lifecycle: one browser session per test class.
//!
//! `acquire` resolves (target, environment) into a fully prepared session: cookies
//! cleared, implicit wait set, base URL loaded, window maximized. `release` never fails.

use log::{debug, error, info, warn};
use std::time::Duration;

use crate::driver::launcher::{SessionLauncher, WebDriverLauncher};
use crate::driver::traits::Session;
use crate::driver::webdriver::Capabilities;
use crate::error::{HarnessError, HarnessResult};
use crate::runner::target::{ExecutionEnvironment, Target};
use crate::utils::config::HarnessConfig;

/// Setup postconditions applied to every new session
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub hub_url: String,
    pub app_url: String,
    pub implicit_wait: Duration,
}

impl From<&HarnessConfig> for SessionSettings {
    fn from(config: &HarnessConfig) -> Self {
        Self {
            hub_url: config.hub_url.clone(),
            app_url: config.app_url.clone(),
            implicit_wait: config.implicit_wait,
        }
    }
}

pub struct SessionManager<L: SessionLauncher = WebDriverLauncher> {
    launcher: L,
    settings: SessionSettings,
}

impl SessionManager<WebDriverLauncher> {
    pub fn new(settings: SessionSettings) -> Self {
        Self::with_launcher(WebDriverLauncher, settings)
    }
}

impl<L: SessionLauncher> SessionManager<L> {
    pub fn with_launcher(launcher: L, settings: SessionSettings) -> Self {
        Self { launcher, settings }
    }

    /// Remote capability descriptor for a target
    pub fn remote_capabilities(target: &Target) -> Capabilities {
        Capabilities {
            browser_name: target.browser.remote_name().to_string(),
            platform_name: Some(target.operating_system.platform_name().to_string()),
        }
    }

    /// Open and prepare a session for `target`
    pub async fn acquire(
        &self,
        target: &Target,
        env: ExecutionEnvironment,
    ) -> HarnessResult<Box<dyn Session>> {
        info!("Acquiring {} session for {}", env, target);

        let session = match env {
            ExecutionEnvironment::Remote => {
                let capabilities = Self::remote_capabilities(target);
                self.launcher
                    .connect_remote(&self.settings.hub_url, &capabilities)
                    .await?
            }
            // Local drivers run on this machine; the requested OS does not apply
            ExecutionEnvironment::Local => self.launcher.launch_local(target.browser).await?,
        };

        if let Err(e) = self.prepare(session.as_ref()).await {
            error!("Session setup failed, closing it: {:#}", e);
            self.release(Some(session)).await;
            return Err(HarnessError::SessionUnavailable(format!(
                "session setup failed: {:#}",
                e
            )));
        }

        debug!("Session {} ready", session.session_id());
        Ok(session)
    }

    async fn prepare(&self, session: &dyn Session) -> anyhow::Result<()> {
        session.delete_all_cookies().await?;
        session.set_implicit_wait(self.settings.implicit_wait).await?;
        session.navigate(&self.settings.app_url).await?;
        session.maximize_window().await?;
        Ok(())
    }

    /// Close the session if there is one. Failures are logged and swallowed.
    pub async fn release(&self, session: Option<Box<dyn Session>>) {
        let Some(session) = session else {
            debug!("No session to release");
            return;
        };

        let id = session.session_id().to_string();
        match session.quit().await {
            Ok(()) => info!("Session {} closed", id),
            Err(e) => warn!("Failed to close session {} cleanly: {:#}", id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::MockLauncher;
    use crate::runner::target::{Browser, OperatingSystem};

    fn settings() -> SessionSettings {
        SessionSettings {
            hub_url: "http://grid:4444/wd/hub".into(),
            app_url: "https://shop.test/".into(),
            implicit_wait: Duration::from_secs(10),
        }
    }

    fn target(os: OperatingSystem, browser: Browser) -> Target {
        Target {
            operating_system: os,
            browser,
        }
    }

    #[tokio::test]
    async fn test_acquire_applies_postconditions_in_order() {
        let launcher = MockLauncher::default();
        let mock = launcher.session.clone();
        let manager = SessionManager::with_launcher(launcher, settings());

        let session = manager
            .acquire(
                &target(OperatingSystem::Linux, Browser::Firefox),
                ExecutionEnvironment::Local,
            )
            .await
            .unwrap();

        assert_eq!(
            mock.calls(),
            vec![
                "delete_all_cookies",
                "implicit_wait 10",
                "navigate https://shop.test/",
                "maximize"
            ]
        );
        manager.release(Some(session)).await;
        assert_eq!(mock.calls().last().map(String::as_str), Some("quit"));
    }

    #[tokio::test]
    async fn test_remote_uses_os_and_browser_capabilities() {
        let launcher = MockLauncher::default();
        let opened = launcher.opened.clone();
        let manager = SessionManager::with_launcher(launcher, settings());

        manager
            .acquire(
                &target(OperatingSystem::Windows, Browser::Edge),
                ExecutionEnvironment::Remote,
            )
            .await
            .unwrap();

        assert_eq!(
            opened.lock().unwrap().clone(),
            vec!["remote http://grid:4444/wd/hub msedge windows"]
        );
    }

    #[tokio::test]
    async fn test_local_ignores_operating_system() {
        let launcher = MockLauncher::default();
        let opened = launcher.opened.clone();
        let manager = SessionManager::with_launcher(launcher, settings());

        manager
            .acquire(
                &target(OperatingSystem::Mac, Browser::Chrome),
                ExecutionEnvironment::Local,
            )
            .await
            .unwrap();

        assert_eq!(opened.lock().unwrap().clone(), vec!["local chrome"]);
    }

    #[tokio::test]
    async fn test_unreachable_hub_is_session_unavailable() {
        let launcher = MockLauncher {
            unreachable: true,
            ..Default::default()
        };
        let manager = SessionManager::with_launcher(launcher, settings());

        let result = manager
            .acquire(
                &target(OperatingSystem::Windows, Browser::Chrome),
                ExecutionEnvironment::Remote,
            )
            .await;
        assert!(matches!(result, Err(HarnessError::SessionUnavailable(_))));
    }

    #[tokio::test]
    async fn test_failed_setup_closes_half_configured_session() {
        let launcher = MockLauncher::default();
        let mock = launcher.session.clone();
        mock.fail("navigate");
        let manager = SessionManager::with_launcher(launcher, settings());

        let result = manager
            .acquire(
                &target(OperatingSystem::Linux, Browser::Chrome),
                ExecutionEnvironment::Local,
            )
            .await;

        assert!(matches!(result, Err(HarnessError::SessionUnavailable(_))));
        assert_eq!(mock.calls().last().map(String::as_str), Some("quit"));
        assert!(!mock.calls().contains(&"maximize".to_string()));
    }

    #[tokio::test]
    async fn test_release_swallows_quit_failure_and_accepts_none() {
        let launcher = MockLauncher::default();
        let mock = launcher.session.clone();
        mock.fail("quit");
        let manager = SessionManager::with_launcher(launcher, settings());

        manager.release(None).await;
        manager.release(Some(Box::new(mock.clone()))).await;
        assert_eq!(mock.calls(), vec!["quit"]);
    }

    #[tokio::test]
    async fn test_real_launcher_against_unreachable_hub() {
        let manager = SessionManager::new(SessionSettings {
            hub_url: "http://127.0.0.1:1/wd/hub".into(),
            ..settings()
        });
        let result = manager
            .acquire(
                &target(OperatingSystem::Windows, Browser::Chrome),
                ExecutionEnvironment::Remote,
            )
            .await;
        assert!(matches!(result, Err(HarnessError::SessionUnavailable(_))));
    }
}
