use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;

use schedule_analyzer::config::AnalyzerConfig;
use schedule_analyzer::display::{print_analysis, print_fix_outcome, write_report_to_file};
use schedule_analyzer::parser::{load_matches, load_slots};
use schedule_analyzer::schedule::{Analyzer, NoSlots, OpenSlots, SlotProvider};
use schedule_analyzer::web;

#[derive(Parser)]
#[command(name = "schedule-analyzer", version, about = "Find conflicts in a tournament schedule")]
struct Cli {
    /// TOML file with analyzer settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a CSV or JSON match file
    Analyze {
        file: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        /// Date used for the past-date check (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Also write the text report to this file
        #[arg(long)]
        output: Option<String>,
    },
    /// Suggest a fix for one issue, numbered as in the report
    Fix {
        file: PathBuf,
        issue: usize,
        /// JSON file of open slots for venue and overlap fixes
        #[arg(long)]
        slots: Option<PathBuf>,
        #[arg(long)]
        today: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
    },
    /// Serve the HTTP API
    Serve {
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
}

fn build_analyzer(config: AnalyzerConfig, today: Option<NaiveDate>) -> Analyzer {
    let analyzer = Analyzer::new(config);
    match today {
        Some(date) => analyzer.as_of(date),
        None => analyzer,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    let config = AnalyzerConfig::load_or_default(cli.config.as_deref())
        .context("failed to load analyzer config")?;

    match cli.command {
        Command::Analyze {
            file,
            json,
            today,
            output,
        } => {
            let matches = load_matches(&file)
                .with_context(|| format!("failed to load matches from {}", file.display()))?;
            info!(count = matches.len(), "loaded matches");

            let result = build_analyzer(config, today).analyze(&matches);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_analysis(&result);
            }

            if let Some(output) = output {
                write_report_to_file(&result, &output)
                    .with_context(|| format!("failed to write report to {}", output))?;
                println!("Report saved to {}", output);
            }
        }
        Command::Fix {
            file,
            issue,
            slots,
            today,
            json,
        } => {
            let matches = load_matches(&file)
                .with_context(|| format!("failed to load matches from {}", file.display()))?;
            let provider: Box<dyn SlotProvider> = match slots {
                Some(path) => Box::new(OpenSlots(load_slots(&path).with_context(|| {
                    format!("failed to load slots from {}", path.display())
                })?)),
                None => Box::new(NoSlots),
            };

            let analyzer = build_analyzer(config, today);
            let result = analyzer.analyze(&matches);
            let Some(target) = issue.checked_sub(1).and_then(|i| result.issues.get(i)) else {
                bail!(
                    "issue {} does not exist; the schedule has {} issues",
                    issue,
                    result.issues.len()
                );
            };

            let outcome = analyzer.suggest_fix_with(&matches, target, provider.as_ref());
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{}", target.description);
                print_fix_outcome(&outcome);
            }
        }
        Command::Serve { port } => {
            info!(port, "starting web server");
            println!("Access the API at http://localhost:{}/api/analysis", port);
            web::start_server(port, config).await?;
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays clean for reports and JSON
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("schedule_analyzer=info,actix_web=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to set tracing subscriber")?;

    Ok(())
}
