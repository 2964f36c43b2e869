use crate::runner::state::{RunSummary, TestEvent};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Name/value pair shown in the report's environment table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemInfo {
    pub name: String,
    pub value: String,
}

/// Environment of one test context (os, browser, active groups)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContextInfo {
    pub name: String,
    pub operating_system: Option<String>,
    pub browser: Option<String>,
    pub groups: Vec<String>,
}

/// Sealed, serializable content of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub run_id: String,
    pub document_title: String,
    pub report_name: String,
    pub system_info: Vec<SystemInfo>,
    pub contexts: Vec<ContextInfo>,
    pub events: Vec<TestEvent>,
    pub summary: RunSummary,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl RunReport {
    /// Distinct groups across all events with (passed, failed, skipped) counts
    pub fn categories(&self) -> Vec<(String, RunSummary)> {
        let mut categories: std::collections::BTreeMap<String, Vec<TestEvent>> =
            std::collections::BTreeMap::new();
        for event in &self.events {
            for group in &event.groups {
                categories
                    .entry(group.clone())
                    .or_default()
                    .push(event.clone());
            }
        }
        categories
            .into_iter()
            .map(|(name, events)| (name, RunSummary::from_events(&events)))
            .collect()
    }
}
