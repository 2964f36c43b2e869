use crate::error::{HarnessError, HarnessResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operating system requested from a remote grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingSystem {
    Windows,
    Linux,
    Mac,
}

impl OperatingSystem {
    /// Value sent as `platformName` in remote capabilities
    pub fn platform_name(&self) -> &'static str {
        match self {
            OperatingSystem::Windows => "windows",
            OperatingSystem::Linux => "linux",
            OperatingSystem::Mac => "mac",
        }
    }
}

impl FromStr for OperatingSystem {
    type Err = HarnessError;

    fn from_str(s: &str) -> HarnessResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "windows" => Ok(OperatingSystem::Windows),
            "linux" => Ok(OperatingSystem::Linux),
            "mac" => Ok(OperatingSystem::Mac),
            _ => Err(HarnessError::UnsupportedTarget {
                kind: "operating system",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.platform_name())
    }
}

/// Browser a test context runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    Chrome,
    Firefox,
    Edge,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
            Browser::Edge => "edge",
        }
    }

    /// `browserName` capability understood by a Selenium grid hub
    pub fn remote_name(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
            Browser::Edge => "msedge",
        }
    }

    /// `browserName` capability understood by the local driver binary
    pub fn local_name(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
            Browser::Edge => "MicrosoftEdge",
        }
    }

    /// Executable name of the matching local driver
    pub fn driver_binary(&self) -> &'static str {
        match self {
            Browser::Chrome => "chromedriver",
            Browser::Firefox => "geckodriver",
            Browser::Edge => "msedgedriver",
        }
    }
}

impl FromStr for Browser {
    type Err = HarnessError;

    fn from_str(s: &str) -> HarnessResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "chrome" => Ok(Browser::Chrome),
            "firefox" => Ok(Browser::Firefox),
            "edge" => Ok(Browser::Edge),
            _ => Err(HarnessError::UnsupportedTarget {
                kind: "browser",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The (operating system, browser) pair a test class runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub operating_system: OperatingSystem,
    pub browser: Browser,
}

impl Target {
    /// Parse raw suite parameters, failing fast on unknown names
    pub fn parse(os: &str, browser: &str) -> HarnessResult<Self> {
        Ok(Self {
            operating_system: os.parse()?,
            browser: browser.parse()?,
        })
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.operating_system, self.browser)
    }
}

/// Where browser sessions are created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionEnvironment {
    Local,
    Remote,
}

impl FromStr for ExecutionEnvironment {
    type Err = HarnessError;

    fn from_str(s: &str) -> HarnessResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(ExecutionEnvironment::Local),
            "remote" => Ok(ExecutionEnvironment::Remote),
            other => Err(HarnessError::Configuration(format!(
                "execution_env must be 'local' or 'remote', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ExecutionEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionEnvironment::Local => f.write_str("local"),
            ExecutionEnvironment::Remote => f.write_str("remote"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_parse_is_case_insensitive() {
        let target = Target::parse("Windows", "CHROME").unwrap();
        assert_eq!(target.operating_system, OperatingSystem::Windows);
        assert_eq!(target.browser, Browser::Chrome);
        assert_eq!(target.to_string(), "windows/chrome");
    }

    #[test]
    fn test_target_rejects_unknown_names() {
        match Target::parse("solaris", "chrome") {
            Err(HarnessError::UnsupportedTarget { kind, value }) => {
                assert_eq!(kind, "operating system");
                assert_eq!(value, "solaris");
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(
            Target::parse("linux", "safari"),
            Err(HarnessError::UnsupportedTarget { kind: "browser", .. })
        ));
    }

    #[test]
    fn test_edge_capability_names() {
        assert_eq!(Browser::Edge.remote_name(), "msedge");
        assert_eq!(Browser::Edge.local_name(), "MicrosoftEdge");
        assert_eq!(Browser::Firefox.driver_binary(), "geckodriver");
    }

    #[test]
    fn test_execution_environment_parse() {
        assert_eq!(
            "Remote".parse::<ExecutionEnvironment>().unwrap(),
            ExecutionEnvironment::Remote
        );
        assert!(matches!(
            "cloud".parse::<ExecutionEnvironment>(),
            Err(HarnessError::Configuration(_))
        ));
    }
}
