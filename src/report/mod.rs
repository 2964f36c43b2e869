//! Run-wide reporting.
//!
//! A [`RunReporter`] lives for a whole run: it is started once before any test class
//! runs, collects a [`TestEvent`] from every test method of every class (from any
//! thread), and is sealed once after the last class has been joined. Sealing writes the
//! HTML artifact plus JSON and JUnit siblings and then opens the HTML in a browser.

pub mod html;
pub mod json;
pub mod junit;
pub mod types;

use anyhow::Result;
use chrono::{DateTime, Local};
use log::{error, info, warn};
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::error::{HarnessError, HarnessResult};
use crate::runner::state::{RunSummary, TestEvent};
use types::{ContextInfo, RunReport, SystemInfo};

/// Static settings for a run's report
#[derive(Debug, Clone)]
pub struct ReporterSettings {
    pub reports_dir: PathBuf,
    pub document_title: String,
    pub report_name: String,
    /// Open the HTML artifact once the run is sealed
    pub open_on_finish: bool,
    /// Static run metadata (Application, Module, ...)
    pub metadata: Vec<(String, String)>,
}

impl Default for ReporterSettings {
    fn default() -> Self {
        Self {
            reports_dir: PathBuf::from("./reports"),
            document_title: "Opencart Automation Report".to_string(),
            report_name: "Opencart Functional Testing".to_string(),
            open_on_finish: true,
            metadata: vec![
                ("Application".to_string(), "Opencart".to_string()),
                ("Module".to_string(), "Admin".to_string()),
                ("Sub Module".to_string(), "Customers".to_string()),
                ("Environment".to_string(), "QA".to_string()),
            ],
        }
    }
}

/// Lifecycle phase of a reporter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReporterPhase {
    Uninitialized,
    Active,
    Sealed,
}

enum ReporterState {
    Uninitialized,
    Active(Box<ActiveRun>),
    Sealed(PathBuf),
}

struct ActiveRun {
    run_id: String,
    report_path: PathBuf,
    started_at: DateTime<Local>,
    system_info: Vec<SystemInfo>,
    contexts: Vec<ContextInfo>,
    events: Vec<TestEvent>,
}

impl ActiveRun {
    fn into_report(self, settings: &ReporterSettings) -> RunReport {
        let finished_at = Local::now();
        let mut summary = RunSummary::from_events(&self.events);
        summary.total_duration_ms = Some(
            (finished_at - self.started_at)
                .num_milliseconds()
                .max(0) as u64,
        );

        RunReport {
            run_id: self.run_id,
            document_title: settings.document_title.clone(),
            report_name: settings.report_name.clone(),
            system_info: self.system_info,
            contexts: self.contexts,
            events: self.events,
            summary,
            started_at: self.started_at,
            finished_at,
        }
    }
}

/// Result of sealing a run
#[derive(Debug, Clone)]
pub struct FinishedRun {
    pub report_path: PathBuf,
    pub report: RunReport,
}

/// Thread-safe, run-wide report aggregate
pub struct RunReporter {
    settings: ReporterSettings,
    state: Mutex<ReporterState>,
}

impl RunReporter {
    pub fn new(settings: ReporterSettings) -> Self {
        Self {
            settings,
            state: Mutex::new(ReporterState::Uninitialized),
        }
    }

    // A panic on another thread must not take the reporter down with it
    fn lock(&self) -> MutexGuard<'_, ReporterState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn phase(&self) -> ReporterPhase {
        match *self.lock() {
            ReporterState::Uninitialized => ReporterPhase::Uninitialized,
            ReporterState::Active(_) => ReporterPhase::Active,
            ReporterState::Sealed(_) => ReporterPhase::Sealed,
        }
    }

    /// Path of the run's artifact, once allocated
    pub fn report_path(&self) -> Option<PathBuf> {
        match &*self.lock() {
            ReporterState::Uninitialized => None,
            ReporterState::Active(run) => Some(run.report_path.clone()),
            ReporterState::Sealed(path) => Some(path.clone()),
        }
    }

    /// Start the run: allocate the artifact and register static metadata.
    ///
    /// Only the first call has an effect; later calls log a warning and return `None`.
    pub fn on_run_start(&self) -> Option<PathBuf> {
        let mut state = self.lock();
        if !matches!(*state, ReporterState::Uninitialized) {
            warn!("Run reporter already started; ignoring repeated run start");
            return None;
        }

        let started_at = Local::now();
        let report_path = match reserve_artifact(&self.settings.reports_dir, &started_at) {
            Ok(path) => path,
            Err(e) => {
                // Keep collecting; flushing will try to create the file again
                error!("{}", e);
                self.settings
                    .reports_dir
                    .join(artifact_name(&started_at, 1))
            }
        };

        let mut system_info: Vec<SystemInfo> = self
            .settings
            .metadata
            .iter()
            .map(|(name, value)| SystemInfo {
                name: name.clone(),
                value: value.clone(),
            })
            .collect();
        system_info.push(SystemInfo {
            name: "User Name".to_string(),
            value: current_user(),
        });

        info!("Report initialized: {}", report_path.display());
        *state = ReporterState::Active(Box::new(ActiveRun {
            run_id: Uuid::new_v4().to_string(),
            report_path: report_path.clone(),
            started_at,
            system_info,
            contexts: Vec::new(),
            events: Vec::new(),
        }));
        Some(report_path)
    }

    /// Attach the environment of a test context (os, browser, groups)
    pub fn on_context_start(&self, context: ContextInfo) {
        match &mut *self.lock() {
            ReporterState::Active(run) => run.contexts.push(context),
            _ => warn!("Ignoring context '{}': reporter is not active", context.name),
        }
    }

    /// Append one event. Returns false if the reporter is not active.
    pub fn record_event(&self, event: TestEvent) -> bool {
        match &mut *self.lock() {
            ReporterState::Active(run) => {
                run.events.push(event);
                true
            }
            _ => {
                warn!(
                    "Dropping event for '{}': reporter is not active",
                    event.test_identifier
                );
                false
            }
        }
    }

    /// Events recorded so far
    pub fn events(&self) -> Vec<TestEvent> {
        match &*self.lock() {
            ReporterState::Active(run) => run.events.clone(),
            _ => Vec::new(),
        }
    }

    /// Seal the run, write the artifacts and open the HTML report.
    ///
    /// Write failures are logged, never returned. Returns `None` unless the reporter
    /// was active.
    pub fn on_run_finish(&self) -> Option<FinishedRun> {
        let run = {
            let mut state = self.lock();
            match std::mem::replace(&mut *state, ReporterState::Uninitialized) {
                ReporterState::Active(run) => {
                    *state = ReporterState::Sealed(run.report_path.clone());
                    run
                }
                other => {
                    *state = other;
                    warn!("Run reporter is not active; nothing to finish");
                    return None;
                }
            }
        };

        let report_path = run.report_path.clone();
        let report = run.into_report(&self.settings);

        for result in write_artifacts(&report, &report_path) {
            if let Err(e) = result {
                error!("{}", e);
            }
        }

        if self.settings.open_on_finish {
            match crate::utils::system::open_in_browser(&report_path) {
                Ok(()) => info!("Report opened: {}", report_path.display()),
                Err(e) => warn!("Could not open report {}: {:#}", report_path.display(), e),
            }
        }

        Some(FinishedRun {
            report_path,
            report,
        })
    }
}

/// `Test-Report-<yyyy.MM.dd.HH.mm.ss>[-n].html`
fn artifact_name(started_at: &DateTime<Local>, attempt: u32) -> String {
    let stamp = started_at.format("%Y.%m.%d.%H.%M.%S");
    if attempt <= 1 {
        format!("Test-Report-{}.html", stamp)
    } else {
        format!("Test-Report-{}-{}.html", stamp, attempt)
    }
}

/// Create the artifact file exclusively so two runs never share a file
fn reserve_artifact(dir: &Path, started_at: &DateTime<Local>) -> HarnessResult<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|source| HarnessError::ArtifactWrite {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut attempt = 1;
    loop {
        let path = dir.join(artifact_name(started_at, attempt));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => return Ok(path),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(source) => return Err(HarnessError::ArtifactWrite { path, source }),
        }
    }
}

fn write_artifacts(report: &RunReport, html_path: &Path) -> Vec<HarnessResult<()>> {
    let write = |path: PathBuf, content: Result<String>| -> HarnessResult<()> {
        let content = content.map_err(|e| HarnessError::ArtifactWrite {
            path: path.clone(),
            source: std::io::Error::new(ErrorKind::InvalidData, e.to_string()),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| HarnessError::ArtifactWrite {
                path: path.clone(),
                source,
            })?;
        }
        std::fs::write(&path, content).map_err(|source| HarnessError::ArtifactWrite {
            path: path.clone(),
            source,
        })?;
        info!("Saved {}", path.display());
        Ok(())
    };

    vec![
        write(html_path.to_path_buf(), Ok(html::render(report))),
        write(html_path.with_extension("json"), json::render(report)),
        write(html_path.with_extension("xml"), junit::generate_junit_xml(report)),
    ]
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Re-render a saved JSON run into another format
pub async fn generate_report(
    results_path: &Path,
    format: &str,
    output: Option<&Path>,
) -> Result<()> {
    let content = std::fs::read_to_string(results_path)?;
    let report: RunReport = serde_json::from_str(&content)?;

    match format {
        "json" => json::generate(&report, output).await,
        "html" => html::generate(&report, output).await,
        "junit" => junit::generate(&report, output).await,
        _ => anyhow::bail!("Unknown format: {}", format),
    }
}
