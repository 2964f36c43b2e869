use anyhow::Result;

use crate::data::generator::AccountData;
use crate::driver::traits::{Locator, Session};

pub const CONFIRMATION_MESSAGE: &str = "Your Account Has Been Created!";

pub struct RegistrationPage<'a> {
    session: &'a dyn Session,
}

impl<'a> RegistrationPage<'a> {
    pub fn new(session: &'a dyn Session) -> Self {
        Self { session }
    }

    fn first_name() -> Locator {
        Locator::xpath("//input[@id='input-firstname']")
    }

    fn last_name() -> Locator {
        Locator::xpath("//input[@id='input-lastname']")
    }

    fn email() -> Locator {
        Locator::xpath("//input[@id='input-email']")
    }

    fn password() -> Locator {
        Locator::xpath("//input[@id='input-password']")
    }

    fn agree() -> Locator {
        Locator::xpath("//input[@name='agree']")
    }

    fn continue_button() -> Locator {
        Locator::xpath("//button[normalize-space()='Continue']")
    }

    pub(crate) fn confirmation() -> Locator {
        Locator::xpath(format!("//h1[normalize-space()='{}']", CONFIRMATION_MESSAGE))
    }

    pub async fn set_first_name(&self, value: &str) -> Result<()> {
        self.session.send_keys(&Self::first_name(), value).await
    }

    pub async fn set_last_name(&self, value: &str) -> Result<()> {
        self.session.send_keys(&Self::last_name(), value).await
    }

    pub async fn set_email(&self, value: &str) -> Result<()> {
        self.session.send_keys(&Self::email(), value).await
    }

    pub async fn set_password(&self, value: &str) -> Result<()> {
        self.session.send_keys(&Self::password(), value).await
    }

    pub async fn click_agree(&self) -> Result<()> {
        self.session.click(&Self::agree()).await
    }

    pub async fn click_continue(&self) -> Result<()> {
        self.session.click(&Self::continue_button()).await
    }

    /// Fill every field, accept the policy and submit
    pub async fn register(&self, account: &AccountData) -> Result<()> {
        self.set_first_name(&account.first_name).await?;
        self.set_last_name(&account.last_name).await?;
        self.set_email(&account.email).await?;
        self.set_password(&account.password).await?;
        self.click_agree().await?;
        self.click_continue().await
    }

    /// Confirmation heading text, or `None` when it is not shown
    pub async fn confirmation_message(&self) -> Result<Option<String>> {
        let locator = Self::confirmation();
        if !self.session.try_locate(&locator).await? {
            return Ok(None);
        }
        Ok(Some(self.session.text(&locator).await?))
    }
}
