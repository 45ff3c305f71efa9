use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

use commands::{handle_check_command, handle_probe_command, handle_run_command};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "rotapilot")]
#[command(version = VERSION)]
#[command(about = "Rotapilot - automated shift-schedule entry for web scheduling portals")]
#[command(long_about = r#"
Rotapilot drives a browser through a WebDriver endpoint to enter employee
shift schedules into a web-based scheduling portal that has no API. It
locates employee rows and day cells heuristically, fills and saves each
shift form, and reports anything a human has to finish by hand.

Use 'rotapilot check' to validate a schedule file offline, 'rotapilot probe'
to inspect what the browser is currently showing, and 'rotapilot run' to
enter the schedule.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Enter a schedule file into the portal")]
    Run {
        #[arg(help = "Path to a JSON schedule file")]
        file: String,

        #[arg(long, env = "ROTAPILOT_SESSION", help = "Attach to an existing WebDriver session id")]
        session: Option<String>,

        #[arg(long, help = "WebDriver endpoint URL (overrides config)")]
        webdriver_url: Option<String>,
    },

    #[command(about = "Report what the browser is currently showing")]
    Probe {
        #[arg(long, env = "ROTAPILOT_SESSION", help = "Attach to an existing WebDriver session id")]
        session: Option<String>,

        #[arg(long, help = "WebDriver endpoint URL (overrides config)")]
        webdriver_url: Option<String>,
    },

    #[command(about = "Validate a schedule file without touching the portal")]
    Check {
        #[arg(help = "Path to a JSON schedule file")]
        file: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run(cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run {
            file,
            session,
            webdriver_url,
        } => handle_run_command(&file, session, webdriver_url).await,
        Commands::Probe {
            session,
            webdriver_url,
        } => handle_probe_command(session, webdriver_url).await,
        Commands::Check { file } => handle_check_command(&file).await,
    }
}
