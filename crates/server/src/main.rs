//! Loadsmith Server
//!
//! Axum server exposing the load-test pipeline over HTTP, plus CLI
//! subcommands that drive the same pipeline without a server.

mod api;

use clap::{Parser, Subcommand};
use loadsmith_core::config::LoadsmithConfig;
use loadsmith_core::prompts::AnalysisMode;
use loadsmith_core::state::io::RUNTIME_DIR_NAME;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::AppState;

const DEFAULT_PORT: u16 = 3000;

#[derive(Parser, Clone)]
#[command(author, version, about = "Loadsmith - k6 load tests from plain language")]
struct Args {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Clone)]
enum CliCommand {
    /// Start the Loadsmith server (default)
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Generate, run and analyze a load test (CLI mode, no server)
    Run {
        /// Plain-language description of the test
        prompt: String,
        /// Use the comprehensive analysis
        #[arg(long)]
        comprehensive: bool,
    },
    /// Analyze the latest published results
    Analyze {
        /// Use the comprehensive analysis
        #[arg(long)]
        comprehensive: bool,
    },
}

fn analysis_mode(comprehensive: bool) -> AnalysisMode {
    if comprehensive {
        AnalysisMode::Comprehensive
    } else {
        AnalysisMode::Quick
    }
}

pub async fn run_server(config: &LoadsmithConfig, host: &str, port: u16) -> anyhow::Result<()> {
    config.runtime().ensure().await?;
    let state = AppState::new(config.coordinator());
    let app = api::router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!(
        provider = config.model.provider.display_name(),
        model = %config.model.model,
        k6 = %config.k6_binary.display(),
        runtime = %config.runtime_path.display(),
        "Configuration loaded"
    );
    println!("🚀 Loadsmith Server running at http://{}", addr);
    println!("   Pipeline:  /generate-script, /run-script, /generate-and-run-test");
    println!("   Analysis:  /analyze-results, /comprehensive-results-analysis");
    println!("   System:    /health, /events (SSE), /openapi.json");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn run_cli(config: &LoadsmithConfig, prompt: &str, mode: AnalysisMode) -> anyhow::Result<()> {
    println!("🚀 Running load test: {}", prompt);
    let coordinator = config.coordinator();
    match coordinator.generate_and_run(prompt, mode).await {
        Ok(report) => {
            println!("\n=== Script ===\n{}", report.script.as_str());
            println!("\n=== k6 Output ===\n{}", report.execution.summary);
            println!("\n=== Analysis ===\n{}", report.analysis);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            if let Some(details) = e.details() {
                eprintln!("   {}", details);
            }
            Err(e.into())
        }
    }
}

async fn analyze_cli(config: &LoadsmithConfig, mode: AnalysisMode) -> anyhow::Result<()> {
    let coordinator = config.coordinator();
    match coordinator.analyze_latest(mode).await {
        Ok(analysis) => {
            println!("{}", analysis);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            if let Some(details) = e.details() {
                eprintln!("   {}", details);
            }
            Err(e.into())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Process environment wins over both files
    dotenvy::dotenv().ok();
    dotenvy::from_path(std::path::Path::new(RUNTIME_DIR_NAME).join(".env")).ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = LoadsmithConfig::from_env()?;

    match args.command {
        Some(CliCommand::Run {
            prompt,
            comprehensive,
        }) => run_cli(&config, &prompt, analysis_mode(comprehensive)).await,
        Some(CliCommand::Analyze { comprehensive }) => {
            analyze_cli(&config, analysis_mode(comprehensive)).await
        }
        Some(CliCommand::Serve { host, port }) => run_server(&config, &host, port).await,
        None => run_server(&config, "127.0.0.1", DEFAULT_PORT).await,
    }
}
