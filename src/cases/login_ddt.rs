use anyhow::Result;
use async_trait::async_trait;
use log::{error, info};
use std::path::PathBuf;

use super::{TestContext, TestMethod};
use crate::data::DataRow;
use crate::pages::{HomePage, LoginPage, MyAccountPage};
use crate::runner::outcome::{evaluate, Verdict};
use crate::utils::config::HarnessConfig;

pub const CLASS_NAME: &str = "TC003_LoginDDT";

/// Data-driven login: one invocation per credential row
pub struct VerifyLoginDdt;

#[async_trait]
impl TestMethod for VerifyLoginDdt {
    fn name(&self) -> &'static str {
        "verify_login_ddt"
    }

    fn description(&self) -> &'static str {
        "Verify login outcome for each credential row"
    }

    fn groups(&self) -> &'static [&'static str] {
        &["Datadriven"]
    }

    fn data_source(&self, config: &HarnessConfig) -> Option<PathBuf> {
        Some(config.login_data.clone())
    }

    async fn run(&self, ctx: &TestContext<'_>, row: Option<&DataRow>) -> Result<()> {
        let target = ctx.class_name;
        let row = row.ok_or_else(|| anyhow::anyhow!("verify_login_ddt needs a data row"))?;
        info!(
            target: target,
            "Testing with - Email: {}, Expected: {}", row.email, row.expected
        );

        let home = HomePage::new(ctx.session);
        home.click_my_account().await?;
        home.click_login().await?;
        LoginPage::new(ctx.session)
            .login(&row.email, &row.password)
            .await?;

        let account = MyAccountPage::new(ctx.session);
        let logged_in = account.is_my_account_page_exist().await?;
        let outcome = evaluate(row.expected, logged_in);

        // Log out before reporting so the next row starts anonymous
        let cleanup = if outcome.requires_cleanup {
            account.logout().await.map(|()| info!(target: target, "Logged out"))
        } else {
            Ok(())
        };

        match outcome.verdict {
            Verdict::Pass => {
                cleanup?;
                info!(target: target, "PASS: {} data behaved as expected", row.expected);
                Ok(())
            }
            Verdict::Fail => {
                let reason = outcome.failure_reason().unwrap_or("Unexpected login result");
                error!(target: target, "FAIL: {}", reason);
                match cleanup {
                    Ok(()) => anyhow::bail!("{}", reason),
                    Err(e) => anyhow::bail!("{} (logout failed: {:#})", reason, e),
                }
            }
        }
    }
}
