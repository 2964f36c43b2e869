//! Page objects for the storefront under test.
//!
//! Every page borrows the class's [`Session`](crate::driver::traits::Session) and exposes
//! user-level actions; locators never leak out of this module.

pub mod home;
pub mod login;
pub mod my_account;
pub mod registration;

pub use home::HomePage;
pub use login::LoginPage;
pub use my_account::MyAccountPage;
pub use registration::RegistrationPage;
