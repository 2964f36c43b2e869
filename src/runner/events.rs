use super::state::{RunSummary, TestStatus};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::time::Duration as StdDuration;
use tokio::sync::broadcast;

/// Run progress events for real-time console output
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    RunStarted {
        report_path: Option<String>,
    },
    RunFinished {
        summary: RunSummary,
        report_path: Option<String>,
    },

    ContextStarted {
        name: String,
        target: String,
    },

    ClassStarted {
        context: String,
        class_name: String,
        method_count: usize,
    },
    ClassSetupFailed {
        context: String,
        class_name: String,
        error: String,
    },
    ClassFinished {
        context: String,
        class_name: String,
    },

    MethodStarted {
        context: String,
        class_name: String,
        method_name: String,
    },
    MethodFinished {
        context: String,
        class_name: String,
        method_name: String,
        status: TestStatus,
        duration_ms: u64,
        message: Option<String>,
    },
}

/// Event emitter for broadcasting progress events
pub struct EventEmitter {
    sender: broadcast::Sender<ProgressEvent>,
}

impl EventEmitter {
    pub fn new() -> (Self, broadcast::Receiver<ProgressEvent>) {
        let (sender, receiver) = broadcast::channel(256);
        (Self { sender }, receiver)
    }

    pub fn emit(&self, event: ProgressEvent) {
        let _ = self.sender.send(event);
    }

}

impl Default for EventEmitter {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }
}

/// Live spinners, one per (context, class) pair
#[derive(Default)]
struct ClassSpinners {
    bars: HashMap<(String, String), ProgressBar>,
}

impl ClassSpinners {
    fn start(&mut self, context: String, class_name: String, pb: ProgressBar) {
        if let Some(previous) = self.bars.insert((context, class_name), pb) {
            previous.finish_and_clear();
        }
    }

    fn get(&self, context: &str, class_name: &str) -> Option<&ProgressBar> {
        self.bars.get(&(context.to_string(), class_name.to_string()))
    }

    fn finish(&mut self, context: &str, class_name: &str) {
        if let Some(pb) = self
            .bars
            .remove(&(context.to_string(), class_name.to_string()))
        {
            pb.finish_and_clear();
        }
    }

    fn clear(&mut self) {
        for (_, pb) in self.bars.drain() {
            pb.finish_and_clear();
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.bars.len()
    }
}

/// Console event listener printing one spinner per running test class
pub struct ConsoleEventListener;

impl ConsoleEventListener {
    pub async fn listen(mut receiver: broadcast::Receiver<ProgressEvent>) {
        use colored::Colorize;
        use indicatif::ProgressDrawTarget;
        use std::io::IsTerminal;

        // Piped output gets plain lines, no escape codes
        let multi = if std::io::stdout().is_terminal() {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };

        let mut spinners = ClassSpinners::default();

        loop {
            let event = match receiver.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            };

            match event {
                ProgressEvent::RunStarted { report_path } => {
                    multi
                        .println(format!(
                            "\n{} Test run started{}",
                            "▶".green().bold(),
                            report_path
                                .map(|p| format!(": {}", p.cyan()))
                                .unwrap_or_default()
                        ))
                        .ok();
                }

                ProgressEvent::RunFinished {
                    summary,
                    report_path,
                } => {
                    spinners.clear();

                    println!("\n{} Test run finished", "■".blue().bold());
                    println!("  Total tests: {}", summary.total);
                    println!(
                        "  {} passed, {} failed, {} skipped",
                        summary.passed.to_string().green(),
                        summary.failed.to_string().red(),
                        summary.skipped.to_string().yellow()
                    );
                    if let Some(duration) = summary.total_duration_ms {
                        println!("  Duration: {}ms", duration);
                    }
                    if let Some(path) = report_path {
                        println!("  Report: {}", path);
                    }
                    break;
                }

                ProgressEvent::ContextStarted { name, target } => {
                    multi
                        .println(format!(
                            "\n  {} Context: {} ({})",
                            "→".blue(),
                            name.white().bold(),
                            target
                        ))
                        .ok();
                }

                ProgressEvent::ClassStarted {
                    context,
                    class_name,
                    method_count,
                } => {
                    let pb = multi.add(ProgressBar::new_spinner());
                    if let Ok(style) = ProgressStyle::default_spinner()
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                        .template("    {spinner} {msg}")
                    {
                        pb.set_style(style);
                    }
                    pb.set_message(format!(
                        "{} [{}] ({} tests)",
                        class_name, context, method_count
                    ));
                    pb.enable_steady_tick(StdDuration::from_millis(100));
                    spinners.start(context, class_name, pb);
                }

                ProgressEvent::ClassSetupFailed {
                    context,
                    class_name,
                    error,
                } => {
                    multi
                        .println(format!(
                            "    {} {} [{}] setup failed: {}",
                            "✗".red(),
                            class_name,
                            context,
                            error.dimmed()
                        ))
                        .ok();
                }

                ProgressEvent::ClassFinished {
                    context,
                    class_name,
                } => {
                    spinners.finish(&context, &class_name);
                }

                ProgressEvent::MethodStarted {
                    context,
                    class_name,
                    method_name,
                } => {
                    let message = format!(
                        "{} [{}] :: {}...",
                        class_name,
                        context,
                        method_name.dimmed()
                    );
                    if let Some(pb) = spinners.get(&context, &class_name) {
                        pb.set_message(message);
                    }
                }

                ProgressEvent::MethodFinished {
                    context,
                    class_name,
                    method_name,
                    status,
                    duration_ms,
                    message,
                } => {
                    let icon = match status {
                        TestStatus::Pass => "✓".green(),
                        TestStatus::Fail => "✗".red(),
                        TestStatus::Skip => "○".yellow(),
                    };
                    let detail = message
                        .map(|m| format!(" - {}", m.dimmed()))
                        .unwrap_or_default();
                    multi
                        .println(format!(
                            "    {} {} [{}] :: {} ({}ms){}",
                            icon, class_name, context, method_name, duration_ms, detail
                        ))
                        .ok();
                }
            }
        }
    }
}
