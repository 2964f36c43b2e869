use anyhow::Result;
use async_trait::async_trait;
use log::{debug, error, info};

use super::{TestContext, TestMethod};
use crate::data::DataRow;
use crate::pages::{HomePage, LoginPage, MyAccountPage};

pub const CLASS_NAME: &str = "TC002_LoginTest";

pub struct VerifyLogin;

#[async_trait]
impl TestMethod for VerifyLogin {
    fn name(&self) -> &'static str {
        "verify_login"
    }

    fn description(&self) -> &'static str {
        "Verify user can successfully login"
    }

    fn groups(&self) -> &'static [&'static str] {
        &["Sanity", "Master"]
    }

    async fn run(&self, ctx: &TestContext<'_>, _row: Option<&DataRow>) -> Result<()> {
        let target = ctx.class_name;
        info!(target: target, "========== START LOGIN ==========");

        let (email, password) = ctx.config.credentials()?;
        debug!(target: target, "Email: {}", email);

        let home = HomePage::new(ctx.session);
        home.click_my_account().await?;
        home.click_login().await?;

        info!(target: target, "Filling the login form");
        LoginPage::new(ctx.session).login(email, password).await?;

        if !MyAccountPage::new(ctx.session).is_my_account_page_exist().await? {
            error!(target: target, "Login failed for {}", email);
            anyhow::bail!("My Account page not shown after login");
        }

        info!(target: target, "========== END LOGIN ==========");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cases::fixtures;
    use crate::driver::mock::MockSession;

    #[tokio::test]
    async fn test_logs_in_with_configured_credentials() {
        let session = MockSession::new();
        session.show(&MyAccountPage::heading(), None);
        let config = fixtures::config();
        let ctx = TestContext {
            session: &session,
            config: &config,
            class_name: CLASS_NAME,
        };

        VerifyLogin.run(&ctx, None).await.unwrap();

        let calls = session.calls();
        assert!(calls.contains(&"type //input[@id='input-email'] user@shop.test".to_string()));
        assert!(calls.contains(&"type //input[@id='input-password'] secret".to_string()));
    }

    #[tokio::test]
    async fn test_missing_heading_fails() {
        let session = MockSession::new();
        let config = fixtures::config();
        let ctx = TestContext {
            session: &session,
            config: &config,
            class_name: CLASS_NAME,
        };
        assert!(VerifyLogin.run(&ctx, None).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_browsing() {
        let session = MockSession::new();
        let mut config = fixtures::config();
        config.password = None;
        let ctx = TestContext {
            session: &session,
            config: &config,
            class_name: CLASS_NAME,
        };

        assert!(VerifyLogin.run(&ctx, None).await.is_err());
        assert!(session.calls().is_empty());
    }
}
