use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use cartflow_tester::{report, runner, utils};

#[derive(Parser)]
#[command(name = "cartflow-tester")]
#[command(version = "0.1.0")]
#[command(about = "Storefront UI test harness with a consolidated run report", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one or more suite files
    Run {
        /// Suite YAML file(s)
        #[arg(required = true)]
        suites: Vec<PathBuf>,

        /// Harness configuration file
        #[arg(short, long, default_value = "./config.yaml")]
        config: PathBuf,

        /// Directory for the HTML/JSON/JUnit report artifacts
        #[arg(short, long, default_value = "./reports")]
        reports_dir: PathBuf,

        /// Only run methods in these groups (comma-separated); overrides suite includes
        #[arg(short, long, value_delimiter = ',')]
        groups: Option<Vec<String>>,

        /// Do not open the report in a browser when the run ends
        #[arg(long, default_value = "false")]
        no_open: bool,
    },

    /// Re-render a saved JSON run
    Report {
        /// Path to the run's JSON results
        results: PathBuf,

        /// Output format (html, json, junit)
        #[arg(short, long, default_value = "html")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage system components
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

#[derive(Subcommand)]
enum SystemCommands {
    /// Check that browser drivers can be found
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            suites,
            config,
            reports_dir,
            groups,
            no_open,
        } => {
            println!(
                "{} Running {} suite(s)",
                "▶".green().bold(),
                suites.len()
            );
            println!("  Config: {}", config.display().to_string().cyan());
            println!("  Reports: {}", reports_dir.display().to_string().cyan());
            if let Some(ref groups_list) = groups {
                println!("  Groups: {}", groups_list.join(", ").yellow());
            }

            let options = runner::RunOptions {
                suites,
                config_path: config,
                reports_dir,
                groups,
                open_report: !no_open,
            };

            let finished = runner::run_suites(&options).await?;
            let success = finished
                .as_ref()
                .map(|f| f.report.summary.is_success())
                .unwrap_or(false);
            if !success {
                std::process::exit(1);
            }
        }

        Commands::Report {
            results,
            format,
            output,
        } => {
            println!(
                "{} Generating {} report from: {}",
                "📊".to_string().blue(),
                format.cyan(),
                results.display()
            );
            report::generate_report(&results, &format, output.as_deref()).await?;
        }

        Commands::System { command } => match command {
            SystemCommands::Check => {
                utils::system::handle_system_command(utils::system::SystemCommand::Check).await?;
            }
        },
    }

    Ok(())
}
