//! Registered test classes.
//!
//! A test class is a named list of [`TestMethod`]s sharing one browser session. Suites
//! refer to classes by name; [`lookup`] builds a fresh instance for each run.

pub mod login;
pub mod login_ddt;
pub mod registration;

use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;

use crate::data::DataRow;
use crate::driver::traits::Session;
use crate::utils::config::HarnessConfig;

/// What a test method sees while it runs
pub struct TestContext<'a> {
    pub session: &'a dyn Session,
    pub config: &'a HarnessConfig,
    /// Used as the log target inside test bodies
    pub class_name: &'a str,
}

#[async_trait]
pub trait TestMethod: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str {
        ""
    }

    fn groups(&self) -> &'static [&'static str];

    /// Data file feeding this method, one invocation per row. `None` runs it once.
    fn data_source(&self, _config: &HarnessConfig) -> Option<PathBuf> {
        None
    }

    /// `Err` marks the invocation failed with the error as cause
    async fn run(&self, ctx: &TestContext<'_>, row: Option<&DataRow>) -> Result<()>;
}

pub struct TestClass {
    pub name: &'static str,
    pub methods: Vec<Box<dyn TestMethod>>,
}

/// Names accepted in suite files
pub const CLASS_NAMES: &[&str] = &[
    registration::CLASS_NAME,
    login::CLASS_NAME,
    login_ddt::CLASS_NAME,
];

pub fn lookup(name: &str) -> Option<TestClass> {
    let methods: Vec<Box<dyn TestMethod>> = match name {
        registration::CLASS_NAME => vec![Box::new(registration::VerifyAccountRegistration)],
        login::CLASS_NAME => vec![Box::new(login::VerifyLogin)],
        login_ddt::CLASS_NAME => vec![Box::new(login_ddt::VerifyLoginDdt)],
        _ => return None,
    };
    CLASS_NAMES
        .iter()
        .find(|n| **n == name)
        .map(|n| TestClass { name: n, methods })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_registered_name_resolves() {
        for name in CLASS_NAMES {
            let class = lookup(name).unwrap();
            assert_eq!(class.name, *name);
            assert!(!class.methods.is_empty());
        }
        assert!(lookup("TC999_Unknown").is_none());
    }

    #[test]
    fn test_declared_groups() {
        let groups = |name: &str| lookup(name).unwrap().methods[0].groups().to_vec();
        assert_eq!(groups("TC001_AccountRegistrationTest"), vec!["Regression", "Master"]);
        assert_eq!(groups("TC002_LoginTest"), vec!["Sanity", "Master"]);
        assert_eq!(groups("TC003_LoginDDT"), vec!["Datadriven"]);
    }
}
