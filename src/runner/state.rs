use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Final status of one test method invocation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pass,
    Fail,
    Skip,
}

impl TestStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TestStatus::Pass => "PASS",
            TestStatus::Fail => "FAIL",
            TestStatus::Skip => "SKIP",
        }
    }
}

/// Immutable record of one test method's outcome
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestEvent {
    pub test_identifier: String,
    /// Short method name used in log lines and screenshot names
    pub test_name: String,
    /// Suite context the method ran in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub groups: BTreeSet<String>,
    pub status: TestStatus,
    pub message: Option<String>,
    pub screenshot_path: Option<String>,
    pub duration_ms: Option<u64>,
    pub timestamp: DateTime<Local>,
}

impl TestEvent {
    pub fn builder(test_identifier: &str, test_name: &str, status: TestStatus) -> TestEventBuilder {
        TestEventBuilder {
            test_identifier: test_identifier.to_string(),
            test_name: test_name.to_string(),
            context: None,
            description: None,
            groups: BTreeSet::new(),
            status,
            message: None,
            screenshot_path: None,
            duration_ms: None,
        }
    }

    /// One-line summary as shown in the report body
    pub fn headline(&self) -> String {
        match self.status {
            TestStatus::Pass => format!("{} executed successfully", self.test_name),
            TestStatus::Fail => format!("{} failed", self.test_name),
            TestStatus::Skip => format!("{} was skipped", self.test_name),
        }
    }
}

/// Accumulates event fields during result handling; `build` stamps the time
#[derive(Debug, Clone)]
pub struct TestEventBuilder {
    test_identifier: String,
    test_name: String,
    context: Option<String>,
    description: Option<String>,
    groups: BTreeSet<String>,
    status: TestStatus,
    message: Option<String>,
    screenshot_path: Option<String>,
    duration_ms: Option<u64>,
}

impl TestEventBuilder {
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Empty descriptions are dropped
    pub fn description(mut self, description: &str) -> Self {
        if !description.is_empty() {
            self.description = Some(description.to_string());
        }
        self
    }

    pub fn groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.extend(groups.into_iter().map(Into::into));
        self
    }

    pub fn message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    pub fn screenshot_path(mut self, path: String) -> Self {
        self.screenshot_path = Some(path);
        self
    }

    pub fn duration_ms(mut self, duration_ms: Option<u64>) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    pub fn build(self) -> TestEvent {
        TestEvent {
            test_identifier: self.test_identifier,
            test_name: self.test_name,
            context: self.context,
            description: self.description,
            groups: self.groups,
            status: self.status,
            message: self.message,
            screenshot_path: self.screenshot_path,
            duration_ms: self.duration_ms,
            timestamp: Local::now(),
        }
    }
}

/// Raw completion of a test method, as reported by a class runner
#[derive(Debug, Clone)]
pub struct TestResult {
    pub context_name: String,
    pub class_name: String,
    /// Method name, with an invocation suffix for data-driven rows
    pub method_name: String,
    pub description: &'static str,
    pub groups: Vec<String>,
    pub outcome: ResultOutcome,
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultOutcome {
    Success,
    Failure(String),
    Skipped(Option<String>),
}

impl TestResult {
    /// `<class> :: <method> [<context>]`
    pub fn identifier(&self) -> String {
        format!(
            "{} :: {} [{}]",
            self.class_name, self.method_name, self.context_name
        )
    }

    /// Screenshot base name, unique across contexts running the same class
    pub fn screenshot_name(&self) -> String {
        let context: String = self
            .context_name
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
                _ => '_',
            })
            .collect();
        format!("{}-{}", context, self.method_name)
    }
}

/// Aggregate counts of a sealed run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub total_duration_ms: Option<u64>,
}

impl RunSummary {
    pub fn from_events(events: &[TestEvent]) -> Self {
        let mut summary = RunSummary::default();
        for event in events {
            summary.total += 1;
            match event.status {
                TestStatus::Pass => summary.passed += 1,
                TestStatus::Fail => summary.failed += 1,
                TestStatus::Skip => summary.skipped += 1,
            }
        }
        summary
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }
}
