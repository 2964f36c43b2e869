use super::types::Suite;
use crate::cases::CLASS_NAMES;
use crate::error::HarnessError;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

/// Parse and validate a YAML suite file
pub fn parse_suite_file(path: &Path) -> Result<Suite> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read suite: {}", path.display()))?;

    parse_suite_content(&content)
        .with_context(|| format!("Invalid suite: {}", path.display()))
}

pub fn parse_suite_content(content: &str) -> Result<Suite> {
    let suite: Suite = serde_yaml::from_str(content)?;
    validate(&suite)?;
    Ok(suite)
}

fn validate(suite: &Suite) -> Result<(), HarnessError> {
    let invalid = |msg: String| Err(HarnessError::Configuration(msg));

    if suite.tests.is_empty() {
        return invalid(format!("suite '{}' has no tests", suite.name));
    }
    if suite.thread_count == 0 {
        return invalid("threadCount must be at least 1".into());
    }

    let mut names = HashSet::new();
    for context in &suite.tests {
        if !names.insert(context.name.as_str()) {
            return invalid(format!("duplicate test name '{}'", context.name));
        }
        if context.classes.is_empty() {
            return invalid(format!("test '{}' lists no classes", context.name));
        }
        for class in &context.classes {
            if !CLASS_NAMES.contains(&class.as_str()) {
                return invalid(format!(
                    "unknown class '{}' in test '{}' (known: {})",
                    class,
                    context.name,
                    CLASS_NAMES.join(", ")
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::types::ParallelMode;

    const MASTER: &str = r#"
name: Master Suite
parallel: tests
threadCount: 3
report:
  reportName: Nightly
  metadata:
    Environment: Staging
tests:
  - name: chrome-tests
    os: windows
    browser: chrome
    groups:
      include: [Master]
    classes:
      - TC001_AccountRegistrationTest
      - TC002_LoginTest
  - name: ddt
    os: linux
    browser: firefox
    classes: [TC003_LoginDDT]
"#;

    #[test]
    fn test_parse_suite() {
        let suite = parse_suite_content(MASTER).unwrap();
        assert_eq!(suite.name, "Master Suite");
        assert_eq!(suite.parallel, ParallelMode::Tests);
        assert_eq!(suite.thread_count, 3);
        assert_eq!(suite.report.report_name.as_deref(), Some("Nightly"));
        assert_eq!(suite.report.metadata["Environment"], "Staging");
        assert_eq!(suite.tests.len(), 2);
        assert_eq!(suite.tests[0].groups.include, vec!["Master".to_string()]);
        assert_eq!(suite.tests[1].browser.as_deref(), Some("firefox"));
        assert!(suite.tests[1].groups.include.is_empty());
    }

    #[test]
    fn test_defaults() {
        let suite = parse_suite_content(
            "name: s\ntests:\n  - name: t\n    classes: [TC002_LoginTest]\n",
        )
        .unwrap();
        assert_eq!(suite.parallel, ParallelMode::None);
        assert_eq!(suite.thread_count, 5);
        assert!(suite.tests[0].os.is_none());
    }

    #[test]
    fn test_unknown_class_is_rejected() {
        let err = parse_suite_content(
            "name: s\ntests:\n  - name: t\n    classes: [TC404_Missing]\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown class 'TC404_Missing'"));
    }

    #[test]
    fn test_empty_and_duplicate_contexts_are_rejected() {
        assert!(parse_suite_content("name: s\ntests: []\n").is_err());
        assert!(parse_suite_content(
            "name: s\ntests:\n  - name: t\n    classes: [TC002_LoginTest]\n  - name: t\n    classes: [TC002_LoginTest]\n"
        )
        .is_err());
        assert!(parse_suite_content("name: s\ntests:\n  - name: t\n").is_err());
    }
}
