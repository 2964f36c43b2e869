use crate::error::{HarnessError, HarnessResult};
use crate::runner::target::ExecutionEnvironment;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_HUB_URL: &str = "http://localhost:4444/wd/hub";
pub const DEFAULT_IMPLICIT_WAIT_SECS: u64 = 10;
pub const DEFAULT_LOGIN_DATA: &str = "./testData/Opencart_LoginData.csv";
pub const DEFAULT_SCREENSHOTS_DIR: &str = "./screenshots";

/// Harness configuration, loaded once per test class setup
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub execution_env: ExecutionEnvironment,
    pub app_url: String,
    pub hub_url: String,
    pub email: Option<String>,
    pub password: Option<String>,
    pub implicit_wait: Duration,
    pub login_data: PathBuf,
    pub screenshots_dir: PathBuf,
}

/// On-disk shape of the config file, before validation
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    #[serde(alias = "execution_env")]
    execution_env: Option<String>,
    #[serde(alias = "app_url")]
    app_url: Option<String>,
    #[serde(alias = "hub_url")]
    hub_url: Option<String>,
    email: Option<String>,
    password: Option<String>,
    #[serde(alias = "implicit_wait_secs")]
    implicit_wait_secs: Option<u64>,
    #[serde(alias = "login_data")]
    login_data: Option<String>,
    #[serde(alias = "screenshots_dir")]
    screenshots_dir: Option<String>,
}

impl HarnessConfig {
    /// Load and validate a YAML config file, resolving `${NAME}` from the process environment
    pub fn load(path: &Path) -> HarnessResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content, |name| std::env::var(name).ok())
    }

    pub fn from_yaml_str<F>(content: &str, lookup: F) -> HarnessResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw: RawConfig = serde_yaml::from_str(content)
            .map_err(|e| HarnessError::Configuration(format!("invalid config: {}", e)))?;

        let resolve = |value: Option<String>| -> HarnessResult<Option<String>> {
            value.map(|v| substitute_env(&v, &lookup)).transpose()
        };

        let execution_env = resolve(raw.execution_env)?
            .ok_or_else(|| HarnessError::Configuration("missing 'execution_env'".into()))?
            .parse::<ExecutionEnvironment>()?;

        let app_url = resolve(raw.app_url)?
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| HarnessError::Configuration("missing 'appUrl'".into()))?;
        validate_url("appUrl", &app_url)?;

        let hub_url = resolve(raw.hub_url)?.unwrap_or_else(|| DEFAULT_HUB_URL.to_string());
        validate_url("hubUrl", &hub_url)?;

        Ok(Self {
            execution_env,
            app_url,
            hub_url,
            email: resolve(raw.email)?,
            password: resolve(raw.password)?,
            implicit_wait: Duration::from_secs(
                raw.implicit_wait_secs.unwrap_or(DEFAULT_IMPLICIT_WAIT_SECS),
            ),
            login_data: PathBuf::from(
                resolve(raw.login_data)?.unwrap_or_else(|| DEFAULT_LOGIN_DATA.to_string()),
            ),
            screenshots_dir: PathBuf::from(
                resolve(raw.screenshots_dir)?
                    .unwrap_or_else(|| DEFAULT_SCREENSHOTS_DIR.to_string()),
            ),
        })
    }

    /// Login credentials for the account used by the plain login test
    pub fn credentials(&self) -> HarnessResult<(&str, &str)> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => Err(HarnessError::Configuration(
                "'email' and 'password' must be set for login tests".into(),
            )),
        }
    }
}

fn validate_url(key: &str, url: &str) -> HarnessResult<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(HarnessError::Configuration(format!(
            "'{}' must be an http(s) URL, got '{}'",
            key, url
        )))
    }
}

/// Replace every `${NAME}` in `text`; an unresolved name is a configuration error
fn substitute_env<F>(text: &str, lookup: &F) -> HarnessResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    let re = Regex::new(r"\$\{([A-Za-z0-9_]+)\}").expect("static regex");
    let mut missing = Vec::new();
    let result = re
        .replace_all(text, |caps: &regex::Captures| match lookup(&caps[1]) {
            Some(value) => value,
            None => {
                missing.push(caps[1].to_string());
                String::new()
            }
        })
        .to_string();

    if missing.is_empty() {
        Ok(result)
    } else {
        Err(HarnessError::Configuration(format!(
            "unresolved environment variable(s): {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = HarnessConfig::from_yaml_str(
            "execution_env: local\nappUrl: https://demo.opencart.com/\n",
            no_env,
        )
        .unwrap();
        assert_eq!(config.execution_env, ExecutionEnvironment::Local);
        assert_eq!(config.hub_url, DEFAULT_HUB_URL);
        assert_eq!(config.implicit_wait, Duration::from_secs(10));
        assert_eq!(config.login_data, PathBuf::from(DEFAULT_LOGIN_DATA));
        assert!(config.credentials().is_err());
    }

    #[test]
    fn test_env_substitution() {
        let yaml = "execution_env: remote\napp_url: https://shop.test/\nemail: ${SHOP_EMAIL}\npassword: p-${SHOP_PASS}\n";
        let config = HarnessConfig::from_yaml_str(yaml, |name| match name {
            "SHOP_EMAIL" => Some("qa@shop.test".to_string()),
            "SHOP_PASS" => Some("secret".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.execution_env, ExecutionEnvironment::Remote);
        assert_eq!(config.credentials().unwrap(), ("qa@shop.test", "p-secret"));
    }

    #[test]
    fn test_unresolved_env_is_configuration_error() {
        let yaml = "execution_env: local\nappUrl: https://shop.test/\npassword: ${MISSING}\n";
        match HarnessConfig::from_yaml_str(yaml, no_env) {
            Err(HarnessError::Configuration(msg)) => assert!(msg.contains("MISSING")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_missing_or_invalid_required_values() {
        assert!(matches!(
            HarnessConfig::from_yaml_str("appUrl: https://shop.test/\n", no_env),
            Err(HarnessError::Configuration(_))
        ));
        assert!(matches!(
            HarnessConfig::from_yaml_str("execution_env: local\n", no_env),
            Err(HarnessError::Configuration(_))
        ));
        assert!(matches!(
            HarnessConfig::from_yaml_str("execution_env: grid\nappUrl: https://x/\n", no_env),
            Err(HarnessError::Configuration(_))
        ));
        assert!(matches!(
            HarnessConfig::from_yaml_str("execution_env: local\nappUrl: shop.test\n", no_env),
            Err(HarnessError::Configuration(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = HarnessConfig::load(Path::new("/nonexistent/config.yaml")).unwrap_err();
        assert!(matches!(err, HarnessError::Configuration(_)));
    }
}
