//! Routes test method results into the run reporter.

use anyhow::{Context, Result};
use chrono::Local;
use log::{error, info, warn};
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use super::state::{ResultOutcome, TestEvent, TestEventBuilder, TestResult, TestStatus};
use crate::driver::traits::Session;
use crate::report::RunReporter;

/// Writes failure screenshots as `<dir>/<name>_<yyyyMMddHHmmss>.png`
#[derive(Debug, Clone)]
pub struct ScreenshotSink {
    dir: PathBuf,
}

impl ScreenshotSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Capture the session's viewport; returns the absolute path of the image.
    ///
    /// The image is written to a temporary name first so a half-written file never
    /// carries a final name.
    pub async fn capture(&self, session: &dyn Session, name: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let staging = self.dir.join(format!(".{}-{}.png.part", name, Uuid::new_v4()));
        if let Err(e) = session.take_screenshot(&staging).await {
            let _ = std::fs::remove_file(&staging);
            return Err(e.context(format!("Screenshot of '{}' failed", name)));
        }

        let target = match self.reserve(name) {
            Ok(target) => target,
            Err(e) => {
                let _ = std::fs::remove_file(&staging);
                return Err(e);
            }
        };
        std::fs::rename(&staging, &target)
            .with_context(|| format!("Failed to move screenshot to {}", target.display()))?;

        Ok(target.canonicalize().unwrap_or(target))
    }

    /// Claim `<name>_<ts>.png`, or `<name>_<ts>-N.png` if another capture got there first
    fn reserve(&self, name: &str) -> Result<PathBuf> {
        let stamp = Local::now().format("%Y%m%d%H%M%S").to_string();
        let mut n = 1;
        loop {
            let file_name = if n == 1 {
                format!("{}_{}.png", name, stamp)
            } else {
                format!("{}_{}-{}.png", name, stamp, n)
            };
            let candidate = self.dir.join(file_name);
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
            {
                Ok(_) => return Ok(candidate),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to create {}", candidate.display()))
                }
            }
        }
    }
}

/// Turns each completed test method into exactly one report event
pub struct TestEventRouter {
    reporter: Arc<RunReporter>,
    screenshots: ScreenshotSink,
}

impl TestEventRouter {
    pub fn new(reporter: Arc<RunReporter>, screenshots: ScreenshotSink) -> Self {
        Self {
            reporter,
            screenshots,
        }
    }

    /// Dispatch by outcome; `session` is only used to capture failure evidence
    pub async fn route(&self, result: &TestResult, session: Option<&dyn Session>) -> bool {
        match &result.outcome {
            ResultOutcome::Success => self.on_test_success(result),
            ResultOutcome::Failure(_) => self.on_test_failure(result, session).await,
            ResultOutcome::Skipped(_) => self.on_test_skipped(result),
        }
    }

    pub fn on_test_success(&self, result: &TestResult) -> bool {
        let builder = Self::builder(result, TestStatus::Pass);
        info!("{} executed successfully", builder.test_name());
        self.record(builder.build())
    }

    pub async fn on_test_failure(&self, result: &TestResult, session: Option<&dyn Session>) -> bool {
        let cause = match &result.outcome {
            ResultOutcome::Failure(cause) => Some(cause.clone()),
            _ => None,
        };
        let mut builder = Self::builder(result, TestStatus::Fail).message(cause.clone());
        error!(
            "{} failed: {}",
            builder.test_name(),
            cause.as_deref().unwrap_or("unknown error")
        );

        match session {
            Some(session) => match self
                .screenshots
                .capture(session, &result.screenshot_name())
                .await {
                Ok(path) => {
                    info!("Screenshot saved: {}", path.display());
                    builder = builder.screenshot_path(path.display().to_string());
                }
                Err(e) => warn!("No screenshot for {}: {:#}", result.identifier(), e),
            },
            None => warn!("No session to screenshot for {}", result.identifier()),
        }

        self.record(builder.build())
    }

    pub fn on_test_skipped(&self, result: &TestResult) -> bool {
        let cause = match &result.outcome {
            ResultOutcome::Skipped(cause) => cause.clone(),
            _ => None,
        };
        let builder = Self::builder(result, TestStatus::Skip).message(cause);
        warn!("{} was skipped", builder.test_name());
        self.record(builder.build())
    }

    fn builder(result: &TestResult, status: TestStatus) -> TestEventBuilder {
        TestEvent::builder(&result.identifier(), &result.method_name, status)
            .context(result.context_name.as_str())
            .description(result.description)
            .groups(result.groups.iter().cloned())
            .duration_ms(result.duration_ms)
    }

    fn record(&self, event: TestEvent) -> bool {
        self.reporter.record_event(event)
    }
}
