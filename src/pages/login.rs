use anyhow::Result;

use crate::driver::traits::{Locator, Session};

pub struct LoginPage<'a> {
    session: &'a dyn Session,
}

impl<'a> LoginPage<'a> {
    pub fn new(session: &'a dyn Session) -> Self {
        Self { session }
    }

    pub(crate) fn email_field() -> Locator {
        Locator::xpath("//input[@id='input-email']")
    }

    pub(crate) fn password_field() -> Locator {
        Locator::xpath("//input[@id='input-password']")
    }

    pub(crate) fn login_button() -> Locator {
        Locator::xpath("//button[normalize-space()='Login']")
    }

    pub async fn set_email(&self, email: &str) -> Result<()> {
        self.session.send_keys(&Self::email_field(), email).await
    }

    pub async fn set_password(&self, password: &str) -> Result<()> {
        self.session.send_keys(&Self::password_field(), password).await
    }

    pub async fn click_login(&self) -> Result<()> {
        self.session.click(&Self::login_button()).await
    }

    /// Fill both fields and submit
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        self.set_email(email).await?;
        self.set_password(password).await?;
        self.click_login().await
    }
}
