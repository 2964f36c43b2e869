pub mod class;
pub mod events;
pub mod outcome;
pub mod router;
pub mod session;
pub mod state;
pub mod target;

use anyhow::Result;
use colored::Colorize;
use log::error;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub use events::*;
pub use state::*;

use crate::cases;
use crate::driver::launcher::{SessionLauncher, WebDriverLauncher};
use crate::parser::{parse_suite_file, GroupFilter, ParallelMode, Suite, SuiteContext};
use crate::report::types::ContextInfo;
use crate::report::{FinishedRun, ReporterSettings, RunReporter};
use class::ClassRunner;

/// Inputs of one `run` invocation
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub suites: Vec<PathBuf>,
    pub config_path: PathBuf,
    pub reports_dir: PathBuf,
    /// Replaces every context's `groups.include` when set
    pub groups: Option<Vec<String>>,
    pub open_report: bool,
}

/// Run suite files against real browsers
pub async fn run_suites(options: &RunOptions) -> Result<Option<FinishedRun>> {
    run_suites_with(options, WebDriverLauncher).await
}

/// Run suite files, opening sessions through `launcher`.
///
/// Suites are validated before the run starts; once it has started the run always ends
/// sealed, with a report artifact.
pub async fn run_suites_with<L>(options: &RunOptions, launcher: L) -> Result<Option<FinishedRun>>
where
    L: SessionLauncher + Clone + 'static,
{
    let suites = options
        .suites
        .iter()
        .map(|path| parse_suite_file(path))
        .collect::<Result<Vec<Suite>>>()?;

    let reporter = Arc::new(RunReporter::new(reporter_settings(options, &suites)));
    let (emitter, receiver) = EventEmitter::new();
    let emitter = Arc::new(emitter);
    let listener = tokio::spawn(ConsoleEventListener::listen(receiver));

    let report_path = reporter.on_run_start();
    emitter.emit(ProgressEvent::RunStarted {
        report_path: report_path.map(|p| p.display().to_string()),
    });

    let runner = Arc::new(ClassRunner::new(
        options.config_path.clone(),
        Arc::clone(&reporter),
        Arc::clone(&emitter),
        launcher,
    ));

    for suite in &suites {
        println!("\n{} Suite: {}", "▶".blue().bold(), suite.name.white().bold());
        run_suite(suite, options, &reporter, &emitter, &runner).await;
    }

    // Every class task has been joined at this point
    let finished = reporter.on_run_finish();
    emitter.emit(ProgressEvent::RunFinished {
        summary: finished
            .as_ref()
            .map(|f| f.report.summary.clone())
            .unwrap_or_default(),
        report_path: finished
            .as_ref()
            .map(|f| f.report_path.display().to_string()),
    });
    drop(runner);
    drop(emitter);
    if let Err(e) = listener.await {
        error!("Console listener stopped abnormally: {}", e);
    }

    Ok(finished)
}

async fn run_suite<L>(
    suite: &Suite,
    options: &RunOptions,
    reporter: &RunReporter,
    emitter: &EventEmitter,
    runner: &Arc<ClassRunner<L>>,
) where
    L: SessionLauncher + Clone + 'static,
{
    let permits = Arc::new(Semaphore::new(suite.thread_count));
    let mut tasks = JoinSet::new();

    for context in &suite.tests {
        let groups = match &options.groups {
            Some(include) => context.groups.with_include(include.clone()),
            None => context.groups.clone(),
        };

        reporter.on_context_start(ContextInfo {
            name: context.name.clone(),
            operating_system: context.os.clone(),
            browser: context.browser.clone(),
            groups: groups.include.clone(),
        });
        emitter.emit(ProgressEvent::ContextStarted {
            name: context.name.clone(),
            target: format!(
                "{}/{}",
                context.os.as_deref().unwrap_or("-"),
                context.browser.as_deref().unwrap_or("-")
            ),
        });

        match suite.parallel {
            ParallelMode::None => {
                run_context(Arc::clone(runner), context.clone(), groups).await;
            }
            ParallelMode::Tests => {
                let runner = Arc::clone(runner);
                let permits = Arc::clone(&permits);
                let context = context.clone();
                tasks.spawn(async move {
                    let _permit = permits.acquire_owned().await;
                    run_context(runner, context, groups).await;
                });
            }
            ParallelMode::Classes => {
                for class_name in &context.classes {
                    let Some(class) = cases::lookup(class_name) else {
                        error!("Unknown class '{}' in '{}'", class_name, context.name);
                        continue;
                    };
                    let runner = Arc::clone(runner);
                    let permits = Arc::clone(&permits);
                    let context = context.clone();
                    let groups = groups.clone();
                    tasks.spawn(async move {
                        let _permit = permits.acquire_owned().await;
                        runner.run(class, &context, &groups).await;
                    });
                }
            }
        }
    }

    // Join barrier: the run is only finished once every spawned task is
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            error!("Test task aborted: {}", e);
        }
    }
}

async fn run_context<L>(runner: Arc<ClassRunner<L>>, context: SuiteContext, groups: GroupFilter)
where
    L: SessionLauncher + Clone + 'static,
{
    for class_name in &context.classes {
        match cases::lookup(class_name) {
            Some(class) => runner.run(class, &context, &groups).await,
            None => error!("Unknown class '{}' in '{}'", class_name, context.name),
        }
    }
}

fn reporter_settings(options: &RunOptions, suites: &[Suite]) -> ReporterSettings {
    let mut settings = ReporterSettings {
        reports_dir: options.reports_dir.clone(),
        open_on_finish: options.open_report,
        ..Default::default()
    };

    for suite in suites {
        let overrides = &suite.report;
        if let Some(title) = &overrides.document_title {
            settings.document_title = title.clone();
        }
        if let Some(name) = &overrides.report_name {
            settings.report_name = name.clone();
        }
        for (name, value) in &overrides.metadata {
            match settings.metadata.iter_mut().find(|(n, _)| n == name) {
                Some(entry) => entry.1 = value.clone(),
                None => settings.metadata.push((name.clone(), value.clone())),
            }
        }
    }
    settings
}
