use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A parsed suite file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suite {
    pub name: String,

    #[serde(default)]
    pub parallel: ParallelMode,

    #[serde(default = "default_thread_count", alias = "thread-count")]
    pub thread_count: usize,

    /// Overrides for the report header and environment table
    #[serde(default)]
    pub report: ReportOverrides,

    #[serde(default)]
    pub tests: Vec<SuiteContext>,
}

fn default_thread_count() -> usize {
    5
}

/// Unit of concurrency within a suite
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParallelMode {
    /// Everything runs one class after another
    #[default]
    None,
    /// Contexts run concurrently; classes within a context run in order
    Tests,
    /// Every class runs concurrently
    Classes,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOverrides {
    #[serde(default)]
    pub document_title: Option<String>,
    #[serde(default)]
    pub report_name: Option<String>,
    /// Extra environment rows; replaces a default row with the same name
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// One test context: a target environment plus the classes to run in it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteContext {
    pub name: String,

    #[serde(default)]
    pub os: Option<String>,

    #[serde(default)]
    pub browser: Option<String>,

    #[serde(default)]
    pub groups: GroupFilter,

    #[serde(default)]
    pub classes: Vec<String>,
}

/// Include/exclude selection by test group
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupFilter {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl GroupFilter {
    /// Selected when `include` is empty or shares a group, and `exclude` shares none
    pub fn matches(&self, groups: &[&str]) -> bool {
        let has = |list: &[String]| groups.iter().any(|g| list.iter().any(|l| l == g));
        (self.include.is_empty() || has(&self.include)) && !has(&self.exclude)
    }

    /// Same filter with `include` replaced
    pub fn with_include(&self, include: Vec<String>) -> Self {
        Self {
            include,
            exclude: self.exclude.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(include: &[&str], exclude: &[&str]) -> GroupFilter {
        GroupFilter {
            include: include.iter().map(|s| s.to_string()).collect(),
            exclude: exclude.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_empty_filter_selects_everything() {
        assert!(GroupFilter::default().matches(&["Sanity"]));
        assert!(GroupFilter::default().matches(&[]));
    }

    #[test]
    fn test_include_and_exclude() {
        let master = filter(&["Master"], &[]);
        assert!(master.matches(&["Sanity", "Master"]));
        assert!(!master.matches(&["Datadriven"]));

        let no_regression = filter(&["Master"], &["Regression"]);
        assert!(no_regression.matches(&["Sanity", "Master"]));
        assert!(!no_regression.matches(&["Regression", "Master"]));
    }

    #[test]
    fn test_include_override_keeps_exclude() {
        let base = filter(&["Master"], &["Regression"]);
        let overridden = base.with_include(vec!["Datadriven".into()]);
        assert!(overridden.matches(&["Datadriven"]));
        assert!(!overridden.matches(&["Sanity", "Master"]));
        assert_eq!(overridden.exclude, vec!["Regression".to_string()]);
    }
}
