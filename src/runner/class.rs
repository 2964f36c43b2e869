//! Runs one test class: setup, its selected methods in order, teardown.

use futures::FutureExt;
use log::{error, info, warn};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use super::events::{EventEmitter, ProgressEvent};
use super::router::{ScreenshotSink, TestEventRouter};
use super::session::{SessionManager, SessionSettings};
use super::state::{ResultOutcome, TestResult, TestStatus};
use super::target::Target;
use crate::cases::{TestClass, TestContext, TestMethod};
use crate::data::{CsvRecordSource, DataRow};
use crate::driver::launcher::SessionLauncher;
use crate::driver::traits::Session;
use crate::error::HarnessResult;
use crate::parser::types::{GroupFilter, SuiteContext};
use crate::report::RunReporter;
use crate::utils::config::{HarnessConfig, DEFAULT_SCREENSHOTS_DIR};

/// Shared by every class task of a run
pub struct ClassRunner<L: SessionLauncher + Clone> {
    config_path: PathBuf,
    reporter: Arc<RunReporter>,
    emitter: Arc<EventEmitter>,
    launcher: L,
}

/// Everything a class setup produced
struct Prepared<L: SessionLauncher> {
    config: HarnessConfig,
    manager: SessionManager<L>,
    session: Box<dyn Session>,
}

impl<L: SessionLauncher + Clone> ClassRunner<L> {
    pub fn new(
        config_path: impl Into<PathBuf>,
        reporter: Arc<RunReporter>,
        emitter: Arc<EventEmitter>,
        launcher: L,
    ) -> Self {
        Self {
            config_path: config_path.into(),
            reporter,
            emitter,
            launcher,
        }
    }

    /// Run `class` inside `context`. Every selected method ends up as at least one event.
    pub async fn run(&self, class: TestClass, context: &SuiteContext, groups: &GroupFilter) {
        let methods: Vec<&dyn TestMethod> = class
            .methods
            .iter()
            .map(|m| m.as_ref())
            .filter(|m| groups.matches(m.groups()))
            .collect();

        if methods.is_empty() {
            info!("{}: no methods selected by groups, skipping class", class.name);
            return;
        }

        self.emitter.emit(ProgressEvent::ClassStarted {
            context: context.name.clone(),
            class_name: class.name.to_string(),
            method_count: methods.len(),
        });

        match self.setup(context).await {
            Ok(prepared) => {
                let router = TestEventRouter::new(
                    Arc::clone(&self.reporter),
                    ScreenshotSink::new(&prepared.config.screenshots_dir),
                );
                for method in &methods {
                    self.run_method(&context.name, class.name, *method, &prepared, &router)
                        .await;
                }
                // Teardown runs no matter how the methods ended
                prepared.manager.release(Some(prepared.session)).await;
            }
            Err(e) => {
                error!("{}: setup failed: {}", class.name, e);
                self.emitter.emit(ProgressEvent::ClassSetupFailed {
                    context: context.name.clone(),
                    class_name: class.name.to_string(),
                    error: e.to_string(),
                });
                let router = TestEventRouter::new(
                    Arc::clone(&self.reporter),
                    ScreenshotSink::new(DEFAULT_SCREENSHOTS_DIR),
                );
                for method in &methods {
                    let result = TestResult {
                        context_name: context.name.clone(),
                        class_name: class.name.to_string(),
                        method_name: method.name().to_string(),
                        description: method.description(),
                        groups: groups_of(*method),
                        outcome: ResultOutcome::Skipped(Some(e.to_string())),
                        duration_ms: None,
                    };
                    router.route(&result, None).await;
                    self.finished(&result, 0);
                }
            }
        }

        self.emitter.emit(ProgressEvent::ClassFinished {
            context: context.name.clone(),
            class_name: class.name.to_string(),
        });
    }

    async fn setup(&self, context: &SuiteContext) -> HarnessResult<Prepared<L>> {
        let config = HarnessConfig::load(&self.config_path)?;
        let target = Target::parse(
            context.os.as_deref().unwrap_or_default(),
            context.browser.as_deref().unwrap_or_default(),
        )?;

        let manager =
            SessionManager::with_launcher(self.launcher.clone(), SessionSettings::from(&config));
        let session = manager.acquire(&target, config.execution_env).await?;

        Ok(Prepared {
            config,
            manager,
            session,
        })
    }

    async fn run_method(
        &self,
        context_name: &str,
        class_name: &str,
        method: &dyn TestMethod,
        prepared: &Prepared<L>,
        router: &TestEventRouter,
    ) {
        let invocations: Vec<(String, Option<DataRow>)> =
            match method.data_source(&prepared.config) {
                None => vec![(method.name().to_string(), None)],
                Some(path) => {
                    let rows = CsvRecordSource::new(path).rows();
                    if rows.is_empty() {
                        warn!("{}: no data rows for {}", class_name, method.name());
                    }
                    rows.into_iter()
                        .enumerate()
                        .map(|(i, row)| (format!("{}-{}", method.name(), i + 1), Some(row)))
                        .collect()
                }
            };

        let ctx = TestContext {
            session: prepared.session.as_ref(),
            config: &prepared.config,
            class_name,
        };

        for (name, row) in invocations {
            self.emitter.emit(ProgressEvent::MethodStarted {
                context: context_name.to_string(),
                class_name: class_name.to_string(),
                method_name: name.clone(),
            });

            let started = Instant::now();
            let outcome = match AssertUnwindSafe(method.run(&ctx, row.as_ref()))
                .catch_unwind()
                .await
            {
                Ok(Ok(())) => ResultOutcome::Success,
                Ok(Err(e)) => ResultOutcome::Failure(format!("{:#}", e)),
                Err(panic) => ResultOutcome::Failure(format!("panicked: {}", panic_message(panic))),
            };
            let elapsed = started.elapsed().as_millis() as u64;

            let result = TestResult {
                context_name: context_name.to_string(),
                class_name: class_name.to_string(),
                method_name: name,
                description: method.description(),
                groups: groups_of(method),
                outcome,
                duration_ms: Some(elapsed),
            };
            router.route(&result, Some(prepared.session.as_ref())).await;
            self.finished(&result, elapsed);
        }
    }

    fn finished(&self, result: &TestResult, duration_ms: u64) {
        let (status, message) = match &result.outcome {
            ResultOutcome::Success => (TestStatus::Pass, None),
            ResultOutcome::Failure(cause) => (TestStatus::Fail, Some(cause.clone())),
            ResultOutcome::Skipped(cause) => (TestStatus::Skip, cause.clone()),
        };
        self.emitter.emit(ProgressEvent::MethodFinished {
            context: result.context_name.clone(),
            class_name: result.class_name.clone(),
            method_name: result.method_name.clone(),
            status,
            duration_ms,
            message,
        });
    }
}

fn groups_of(method: &dyn TestMethod) -> Vec<String> {
    method.groups().iter().map(|g| g.to_string()).collect()
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::MockLauncher;
    use crate::pages::MyAccountPage;
    use crate::report::{ReporterSettings, RunReporter};
    use crate::runner::state::TestEvent;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::path::Path;

    struct Panics;

    #[async_trait]
    impl TestMethod for Panics {
        fn name(&self) -> &'static str {
            "explodes"
        }

        fn groups(&self) -> &'static [&'static str] {
            &["Sanity"]
        }

        async fn run(&self, _ctx: &TestContext<'_>, _row: Option<&DataRow>) -> Result<()> {
            panic!("kaboom");
        }
    }

    struct Passes;

    #[async_trait]
    impl TestMethod for Passes {
        fn name(&self) -> &'static str {
            "passes"
        }

        fn groups(&self) -> &'static [&'static str] {
            &["Sanity"]
        }

        async fn run(&self, _ctx: &TestContext<'_>, _row: Option<&DataRow>) -> Result<()> {
            Ok(())
        }
    }

    struct Fixture {
        dir: tempfile::TempDir,
        reporter: Arc<RunReporter>,
        launcher: MockLauncher,
    }

    impl Fixture {
        fn new(config: &str) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let config = config.replace("DIR", &dir.path().display().to_string());
            std::fs::write(dir.path().join("config.yaml"), config).unwrap();
            let reporter = Arc::new(RunReporter::new(ReporterSettings {
                reports_dir: dir.path().join("reports"),
                open_on_finish: false,
                ..Default::default()
            }));
            reporter.on_run_start();
            Self {
                dir,
                reporter,
                launcher: MockLauncher::default(),
            }
        }

        fn runner(&self) -> ClassRunner<MockLauncher> {
            ClassRunner::new(
                self.dir.path().join("config.yaml"),
                Arc::clone(&self.reporter),
                Arc::new(EventEmitter::default()),
                self.launcher.clone(),
            )
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        fn events(&self) -> Vec<TestEvent> {
            self.reporter.events()
        }
    }

    const LOCAL: &str = "execution_env: local\n\
                         appUrl: http://shop.test/\n\
                         email: user@shop.test\n\
                         password: secret\n\
                         loginData: DIR/login.csv\n\
                         screenshotsDir: DIR/screenshots\n";

    fn context(os: &str, browser: &str) -> SuiteContext {
        SuiteContext {
            name: "ctx".into(),
            os: Some(os.into()),
            browser: Some(browser.into()),
            groups: GroupFilter::default(),
            classes: vec![],
        }
    }

    fn class(methods: Vec<Box<dyn TestMethod>>) -> TestClass {
        TestClass {
            name: "Sample",
            methods,
        }
    }

    #[tokio::test]
    async fn test_panic_is_a_failure_and_session_is_released() {
        let fx = Fixture::new(LOCAL);
        fx.runner()
            .run(
                class(vec![Box::new(Panics), Box::new(Passes)]),
                &context("linux", "chrome"),
                &GroupFilter::default(),
            )
            .await;

        let events = fx.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].status, TestStatus::Fail);
        assert!(events[0].message.as_deref().unwrap().contains("kaboom"));
        assert!(events[0].screenshot_path.is_some());
        assert_eq!(events[1].status, TestStatus::Pass);
        assert_eq!(fx.launcher.session.calls().last().unwrap(), "quit");
    }

    #[tokio::test]
    async fn test_unsupported_target_skips_every_method() {
        let fx = Fixture::new(LOCAL);
        fx.runner()
            .run(
                class(vec![Box::new(Passes), Box::new(Panics)]),
                &context("beos", "chrome"),
                &GroupFilter::default(),
            )
            .await;

        let events = fx.events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.status == TestStatus::Skip));
        assert!(events[0].message.as_deref().unwrap().contains("beos"));
        assert!(fx.launcher.opened.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bad_config_skips_class() {
        let fx = Fixture::new("appUrl: http://shop.test/\n");
        fx.runner()
            .run(
                class(vec![Box::new(Passes)]),
                &context("linux", "chrome"),
                &GroupFilter::default(),
            )
            .await;

        let events = fx.events();
        assert_eq!(events[0].status, TestStatus::Skip);
        assert!(events[0].message.as_deref().unwrap().contains("execution_env"));
    }

    #[tokio::test]
    async fn test_group_filter_drops_unselected_methods() {
        let fx = Fixture::new(LOCAL);
        let only_master = GroupFilter {
            include: vec!["Master".into()],
            exclude: vec![],
        };
        fx.runner()
            .run(
                class(vec![Box::new(Passes)]),
                &context("linux", "chrome"),
                &only_master,
            )
            .await;

        assert!(fx.events().is_empty());
        assert!(fx.launcher.opened.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_data_driven_runs_once_per_row() {
        let fx = Fixture::new(LOCAL);
        std::fs::write(
            fx.path("login.csv"),
            "username,password,res\nok@shop.test,pw,Valid\nbad@shop.test,pw,Invalid\n",
        )
        .unwrap();
        // Nobody gets in: the valid row fails, the invalid row passes
        fx.launcher.session.hide(&MyAccountPage::heading());

        fx.runner()
            .run(
                crate::cases::lookup("TC003_LoginDDT").unwrap(),
                &context("linux", "chrome"),
                &GroupFilter::default(),
            )
            .await;

        let events = fx.events();
        let ids: Vec<_> = events.iter().map(|e| e.test_identifier.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "TC003_LoginDDT :: verify_login_ddt-1 [ctx]",
                "TC003_LoginDDT :: verify_login_ddt-2 [ctx]"
            ]
        );
        assert_eq!(events[0].status, TestStatus::Fail);
        assert_eq!(events[1].status, TestStatus::Pass);
        let shot = events[0].screenshot_path.as_deref().unwrap();
        assert!(Path::new(shot)
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("ctx-verify_login_ddt-1_"));
    }

    #[tokio::test]
    async fn test_empty_data_file_means_no_invocations() {
        let fx = Fixture::new(LOCAL);
        std::fs::write(fx.path("login.csv"), "username,password,res\n").unwrap();

        fx.runner()
            .run(
                crate::cases::lookup("TC003_LoginDDT").unwrap(),
                &context("linux", "chrome"),
                &GroupFilter::default(),
            )
            .await;

        assert!(fx.events().is_empty());
        assert_eq!(fx.launcher.session.calls().last().unwrap(), "quit");
    }
}
