use anyhow::Result;

use crate::driver::traits::{Locator, Session};

/// Landing page of an authenticated customer
pub struct MyAccountPage<'a> {
    session: &'a dyn Session,
}

impl<'a> MyAccountPage<'a> {
    pub fn new(session: &'a dyn Session) -> Self {
        Self { session }
    }

    pub(crate) fn heading() -> Locator {
        Locator::xpath("//h1[normalize-space()='My Account']")
    }

    fn account_menu() -> Locator {
        Locator::xpath("//span[normalize-space()='My Account']")
    }

    fn logout_link() -> Locator {
        Locator::xpath("//a[@class='dropdown-item'][normalize-space()='Logout']")
    }

    /// Whether the "My Account" heading is displayed, i.e. the customer is logged in
    pub async fn is_my_account_page_exist(&self) -> Result<bool> {
        self.session.try_locate(&Self::heading()).await
    }

    pub async fn click_my_account(&self) -> Result<()> {
        self.session.click(&Self::account_menu()).await
    }

    pub async fn click_logout(&self) -> Result<()> {
        self.session.click(&Self::logout_link()).await
    }

    /// Open the account menu and log out
    pub async fn logout(&self) -> Result<()> {
        self.click_my_account().await?;
        self.click_logout().await
    }
}
