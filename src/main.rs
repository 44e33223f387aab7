//! Audit Agent command line client
//!
//! Drives the same interaction a browser user would go through: pick a
//! file, optionally give a recipient email, submit, and read the report.
//!
//! # Usage
//!
//! ```bash
//! # Analyze a document against the default service
//! audit-agent analyze expenses.pdf
//!
//! # Email the report and print fragments as JSON
//! audit-agent analyze invoice.docx --email auditor@example.com -o json
//!
//! # Only run the intake checks
//! audit-agent check notes.txt
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use audit_agent_client::config::{DEFAULT_REMOTE_ORIGIN, DEFAULT_SERVICE_HOST};
use audit_agent_client::view::{
    ErrorView, LoadingView, ResultsView, StepStatus, UploadView, ViewFragments,
};
use audit_agent_client::{
    AppEvent, AppState, CandidateFile, ClientConfig, HttpAnalysisService, Session,
};

#[derive(Parser)]
#[command(name = "audit-agent")]
#[command(version)]
#[command(about = "Submit financial documents to the Audit Agent service for fraud analysis")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "pretty", value_enum)]
    format: OutputFormat,

    /// Service origin used when not served from the service host
    #[arg(long, global = true, env = "AUDIT_AGENT_REMOTE_ORIGIN", default_value = DEFAULT_REMOTE_ORIGIN)]
    remote_origin: String,

    /// Host (with port) the service serves its own pages from
    #[arg(long, global = true, env = "AUDIT_AGENT_SERVICE_HOST", default_value = DEFAULT_SERVICE_HOST)]
    service_host: String,

    /// Origin of the page hosting this client, if any
    #[arg(long, global = true, env = "AUDIT_AGENT_PAGE_ORIGIN")]
    page_origin: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "AUDIT_AGENT_TIMEOUT_SECS", default_value_t = 120)]
    timeout_secs: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a document and print the analysis report
    Analyze {
        /// PDF, DOCX or TXT file, at most 10 MB
        file: PathBuf,

        /// Also email the report to this address
        #[arg(long, env = "AUDIT_AGENT_RECIPIENT_EMAIL")]
        email: Option<String>,
    },

    /// Run the intake checks without contacting the service
    Check {
        file: PathBuf,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = ClientConfig::for_page(
        cli.page_origin.as_deref(),
        &cli.remote_origin,
        &cli.service_host,
    )?
    .with_timeout(Duration::from_secs(cli.timeout_secs));

    let fragments = match &cli.command {
        Commands::Analyze { file, email } => analyze(&config, file, email.as_deref()).await?,
        Commands::Check { file } => check(&config, file).await?,
    };

    print_fragments(&fragments, cli.format)?;

    Ok(match fragments {
        ViewFragments::Error(_) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

async fn analyze(config: &ClientConfig, file: &Path, email: Option<&str>) -> Result<ViewFragments> {
    let candidate = read_candidate(file).await?;
    let service = HttpAnalysisService::new(config)?;
    let mut session = Session::new(config, service);

    session.dispatch(AppEvent::FilePicked(Some(candidate)));
    if let Some(email) = email {
        session.dispatch(AppEvent::EmailChanged(email.to_string()));
    }
    session.dispatch(AppEvent::Submit);

    Ok(session.run_until_settled().await)
}

async fn check(config: &ClientConfig, file: &Path) -> Result<ViewFragments> {
    let candidate = read_candidate(file).await?;
    let mut state = AppState::new(config);
    state.handle_event(AppEvent::FilePicked(Some(candidate)));
    Ok(audit_agent_client::render(&state))
}

async fn read_candidate(path: &Path) -> Result<CandidateFile> {
    CandidateFile::from_path(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

// =============================================================================
// OUTPUT
// =============================================================================

fn print_fragments(fragments: &ViewFragments, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(fragments)?);
        }
        OutputFormat::Pretty => match fragments {
            ViewFragments::Upload(view) => print_upload(view),
            ViewFragments::Loading(view) => print_loading(view),
            ViewFragments::Results(view) => print_results(view),
            ViewFragments::Error(view) => print_error(view),
        },
    }
    Ok(())
}

fn print_upload(view: &UploadView) {
    match &view.selected {
        Some(file) => println!(
            "{} {} ({})",
            "Ready:".green().bold(),
            file.name,
            file.size
        ),
        None => println!("{}", "No file selected".dimmed()),
    }
}

fn print_loading(view: &LoadingView) {
    println!("{}", "Analysis still in progress".yellow());
    for step in &view.steps {
        let marker = match step.status {
            StepStatus::Done => "✓".green(),
            StepStatus::Active => "›".yellow(),
            StepStatus::Pending => "·".dimmed(),
        };
        println!("  {} {}", marker, step.label);
    }
}

fn print_error(view: &ErrorView) {
    eprintln!("{} {}", "ERROR:".red().bold(), view.message);
}

fn print_results(view: &ResultsView) {
    let badge = match view.risk_badge.label {
        "High" => view.risk_badge.label.red().bold(),
        "Low" => view.risk_badge.label.green().bold(),
        _ => view.risk_badge.label.yellow().bold(),
    };
    println!("\n{} {}", "Risk level:".cyan().bold(), badge);
    if let Some(doc) = &view.document {
        let name = doc.file_name.as_deref().unwrap_or("document");
        let size = doc.size.as_deref().unwrap_or("?");
        println!("{} {} ({})", "Document:".cyan(), name, size);
    }
    if let Some(at) = &view.analyzed_at {
        println!("{} {}", "Analyzed:".cyan(), at);
    }
    println!(
        "{} {}   {} {}",
        "Flags:".cyan(),
        view.stats.flag_count,
        "Flagged amount:".cyan(),
        view.stats.flagged_amount
    );

    println!("\n{}", "Summary".bold());
    println!("  {}", view.summary);

    if let Some(flags) = &view.flags {
        println!("\n{}", "Fraud indicators".bold());
        for (i, flag) in flags.iter().enumerate() {
            let amount = flag
                .amount
                .as_deref()
                .map(|a| format!(" - {}", a))
                .unwrap_or_default();
            println!(
                "  {}. {} [{}] {}%{}",
                i + 1,
                flag.category.bold(),
                flag.severity.label,
                flag.confidence_percent,
                amount
            );
            println!("     {}", flag.description);
            if !flag.evidence.is_empty() {
                println!("     {} {}", "Evidence:".dimmed(), flag.evidence);
            }
        }
    }

    if let Some(tiles) = &view.visualizations {
        println!("\n{}", "Visualizations".bold());
        for tile in tiles {
            println!("  {}: {}", tile.title, tile.src);
        }
    }

    if let Some(recommendations) = &view.recommendations {
        println!("\n{}", "Recommendations".bold());
        for (i, rec) in recommendations.iter().enumerate() {
            println!("  {}. {}", i + 1, rec);
        }
    }

    if let Some(notice) = &view.email_notice {
        println!("\n{} {}", "✉".green(), notice);
    }
}
