use anyhow::Result;
use async_trait::async_trait;
use log::{debug, error, info};

use super::{TestContext, TestMethod};
use crate::data::generator::AccountData;
use crate::data::DataRow;
use crate::pages::registration::CONFIRMATION_MESSAGE;
use crate::pages::{HomePage, RegistrationPage};

pub const CLASS_NAME: &str = "TC001_AccountRegistrationTest";

pub struct VerifyAccountRegistration;

#[async_trait]
impl TestMethod for VerifyAccountRegistration {
    fn name(&self) -> &'static str {
        "verify_account_registration"
    }

    fn description(&self) -> &'static str {
        "Verify user can successfully register a new account"
    }

    fn groups(&self) -> &'static [&'static str] {
        &["Regression", "Master"]
    }

    async fn run(&self, ctx: &TestContext<'_>, _row: Option<&DataRow>) -> Result<()> {
        let target = ctx.class_name;
        info!(target: target, "========== START REGISTRATION ==========");

        let account = AccountData::generate();
        debug!(
            target: target,
            "Generated account: {} {} <{}>",
            account.first_name, account.last_name, account.email
        );

        let home = HomePage::new(ctx.session);
        info!(target: target, "Navigating to Registration page");
        home.click_my_account().await?;
        home.click_register().await?;

        let page = RegistrationPage::new(ctx.session);
        info!(target: target, "Filling the registration form");
        page.register(&account).await?;

        match page.confirmation_message().await? {
            Some(message) if message.trim() == CONFIRMATION_MESSAGE => {
                info!(target: target, "Account successfully created");
                info!(target: target, "========== END REGISTRATION ==========");
                Ok(())
            }
            other => {
                // Most often the generated email is already registered
                error!(target: target, "No confirmation after registering {}", account.email);
                anyhow::bail!(
                    "Expected '{}' but found {}",
                    CONFIRMATION_MESSAGE,
                    other.map(|m| format!("'{}'", m)).unwrap_or_else(|| "no confirmation".into())
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cases::fixtures;
    use crate::driver::mock::MockSession;
    use crate::pages::registration::RegistrationPage as Page;

    #[tokio::test]
    async fn test_confirmation_passes() {
        let session = MockSession::new();
        session.show(&Page::confirmation(), Some(CONFIRMATION_MESSAGE));
        let config = fixtures::config();
        let ctx = TestContext {
            session: &session,
            config: &config,
            class_name: CLASS_NAME,
        };

        VerifyAccountRegistration.run(&ctx, None).await.unwrap();

        let calls = session.calls();
        assert!(calls.iter().any(|c| c.starts_with("type //input[@id='input-firstname']")));
        assert!(calls.contains(&"click //input[@name='agree']".to_string()));
    }

    #[tokio::test]
    async fn test_missing_confirmation_fails() {
        let session = MockSession::new();
        let config = fixtures::config();
        let ctx = TestContext {
            session: &session,
            config: &config,
            class_name: CLASS_NAME,
        };

        let err = VerifyAccountRegistration.run(&ctx, None).await.unwrap_err();
        assert!(err.to_string().contains("no confirmation"));
    }
}
