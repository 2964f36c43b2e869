pub mod launcher;
pub mod local;
pub mod traits;
pub mod webdriver;

#[cfg(test)]
pub(crate) mod mock;

pub use launcher::{SessionLauncher, WebDriverLauncher};
pub use traits::{Locator, Session};
