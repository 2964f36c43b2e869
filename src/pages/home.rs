use anyhow::Result;

use crate::driver::traits::{Locator, Session};

/// Storefront header navigation
pub struct HomePage<'a> {
    session: &'a dyn Session,
}

impl<'a> HomePage<'a> {
    pub fn new(session: &'a dyn Session) -> Self {
        Self { session }
    }

    fn my_account() -> Locator {
        Locator::xpath("//span[normalize-space()='My Account']")
    }

    fn register() -> Locator {
        Locator::xpath("//a[normalize-space()='Register']")
    }

    fn login() -> Locator {
        Locator::xpath("//a[normalize-space()='Login']")
    }

    pub async fn click_my_account(&self) -> Result<()> {
        self.session.click(&Self::my_account()).await
    }

    pub async fn click_register(&self) -> Result<()> {
        self.session.click(&Self::register()).await
    }

    pub async fn click_login(&self) -> Result<()> {
        self.session.click(&Self::login()).await
    }
}
