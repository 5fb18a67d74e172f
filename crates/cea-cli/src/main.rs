use anyhow::{Context, Result};
use cea_application::Workbench;
use cea_infrastructure::{CeaPaths, ConfigService, DownloadDirReportSink, TomlCredentialRepository};
use cea_interaction::HttpAnalysisApi;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

mod commands;
mod logging;
mod render;

#[derive(Parser)]
#[command(name = "cea")]
#[command(about = "CEA - Chemical Equipment Analyzer client", long_about = None)]
struct Cli {
    /// Analysis service base URL (overrides config.toml and CEA_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CEA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CEA_PASSWORD", hide_env_values = true)]
        password: String,
        /// Derived from the email when omitted
        #[arg(long)]
        username: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the session state and where each view would lead
    Status,
    /// Upload a CSV file and show its analysis
    Upload { path: PathBuf },
    /// List the five most recent datasets
    History {
        /// Show details of one dataset
        #[arg(long, value_name = "ID")]
        show: Option<String>,
    },
    /// Download the PDF report of a dataset
    Report {
        id: String,
        /// Target directory (defaults to download_dir or the system downloads folder)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let paths = CeaPaths::default();
    let _log_guard = logging::init(&paths, cli.verbose);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(run(cli, paths))
}

async fn run(cli: Cli, paths: CeaPaths) -> Result<ExitCode> {
    let mut config = ConfigService::new(&paths)?.load()?;
    if let Some(url) = cli.api_url {
        config = config.with_api_base_url(url);
        config.validate()?;
    }
    tracing::debug!("[Cli] Using service at {}", config.api_base_url);

    let download_dir = match &cli.command {
        Commands::Report { out: Some(dir), .. } => dir.clone(),
        _ => config
            .download_dir
            .clone()
            .unwrap_or_else(|| paths.default_download_dir()),
    };

    let api = Arc::new(HttpAnalysisApi::new(&config)?);
    let credentials = Arc::new(TomlCredentialRepository::new(&paths)?);
    let sink = Arc::new(DownloadDirReportSink::new(download_dir));
    let workbench = Workbench::new(credentials, api, sink);
    workbench.start();

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&workbench, &email, &password).await
        }
        Commands::Register {
            email,
            password,
            username,
        } => commands::auth::register(&workbench, &email, &password, username.as_deref()).await,
        Commands::Logout => commands::auth::logout(&workbench).await,
        Commands::Status => commands::auth::status(&workbench),
        Commands::Upload { path } => commands::upload::run(&workbench, &path).await,
        Commands::History { show } => commands::history::list(&workbench, show.as_deref()).await,
        Commands::Report { id, .. } => commands::history::report(&workbench, &id).await,
    }
}
