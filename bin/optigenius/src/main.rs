// SPDX-License-Identifier: AGPL-3.0-only
// Minimal bootstrap; runtime logic & handlers reside in library modules.
use anyhow::Result;
use clap::{Parser, Subcommand};
use optigenius::{http::build_router, AppState};
use optiflow::workflow::{SessionStatus, Workflow, WorkflowConfig, WorkflowInput};
use optiflow::{LlmManager, LlmManagerConfig};
use scenarios::Scenario;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "optigenius",
    about = "LLM-driven supply chain optimisation demo"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    Serve {
        #[arg(long)]
        addr: Option<String>,
    },

    Run {
        #[arg(long)]
        scenario: Option<String>,

        #[arg(long)]
        problem: Option<String>,

        #[arg(long, default_value_t = scenarios::DEFAULT_SEED)]
        seed: u64,

        #[arg(long, default_value = "ollama")]
        provider: String,

        #[arg(long)]
        model: Option<String>,
    },

    Scenarios,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();
    let cli = Cli::parse();
    match cli.cmd.unwrap_or(Command::Serve { addr: None }) {
        Command::Serve { addr } => run_server(addr).await,
        Command::Run {
            scenario,
            problem,
            seed,
            provider,
            model,
        } => run_once(scenario, problem, seed, &provider, model).await,
        Command::Scenarios => {
            for scenario in Scenario::all() {
                println!(
                    "{:32} {} - {}",
                    scenario.slug(),
                    scenario.title(),
                    scenario.description()
                );
            }
            Ok(())
        }
    }
}

fn default_model(provider: &str) -> &'static str {
    match provider {
        "anthropic" => "claude-3-5-haiku-latest",
        "openai" => "gpt-4o",
        _ => "llama3.1",
    }
}

fn resolve_model(provider: &str, model: Option<String>) -> String {
    let mut model = model.unwrap_or_else(|| default_model(provider).to_string());
    match provider {
        "anthropic" if model.starts_with("llama") => {
            warn!(
                "Model '{model}' is not compatible with the Anthropic provider, using '{}'",
                default_model(provider)
            );
            model = default_model(provider).to_string();
        }
        "ollama" if model.starts_with("claude") || model.starts_with("gpt") => {
            warn!(
                "Model '{model}' is not compatible with the Ollama provider, using '{}'",
                default_model(provider)
            );
            model = default_model(provider).to_string();
        }
        _ => {}
    }
    model
}

async fn run_server(addr_override: Option<String>) -> Result<()> {
    info!("optigenius starting");

    let provider = std::env::var("OPTIGENIUS_PROVIDER").unwrap_or_else(|_| "ollama".to_string());
    let model = std::env::var("OPTIGENIUS_MODEL")
        .unwrap_or_else(|_| default_model(&provider).to_string());
    let llm = Arc::new(LlmManager::new(LlmManagerConfig {
        primary_provider: provider,
        primary_model: model,
        ..LlmManagerConfig::default()
    })?);
    let state = AppState::new(llm, WorkflowConfig::default());
    let app = build_router(state);

    let addr: SocketAddr = addr_override
        .or_else(|| std::env::var("OPTIGENIUS_HTTP_ADDR").ok())
        .unwrap_or_else(|| "127.0.0.1:8080".to_string())
        .parse()?;
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            warn!(error=%e, %addr, "bind failed, using ephemeral");
            tokio::net::TcpListener::bind("127.0.0.1:0").await?
        }
    };
    let local = listener.local_addr()?;
    info!(%local, "dashboard listening");

    tokio::select! { _ = axum::serve(listener, app) => {} _ = tokio::signal::ctrl_c() => {} }
    info!("optigenius shutting down");
    Ok(())
}

async fn run_once(
    scenario: Option<String>,
    problem: Option<String>,
    seed: u64,
    provider: &str,
    model: Option<String>,
) -> Result<()> {
    let model = resolve_model(provider, model);
    let llm = Arc::new(LlmManager::simple(provider, &model)?);
    let workflow = Workflow::with_defaults(llm);

    let input = match (scenario, problem) {
        (Some(slug), None) => WorkflowInput::Scenario {
            scenario: Scenario::from_slug(&slug)?,
            seed,
        },
        (None, Some(problem_statement)) => WorkflowInput::Custom { problem_statement },
        _ => anyhow::bail!("provide exactly one of --scenario or --problem"),
    };

    let record = workflow.run(input).await;
    match record.status {
        SessionStatus::Completed => {
            println!("{}", record.report.unwrap_or_default());
            Ok(())
        }
        _ => anyhow::bail!(
            "workflow failed: {}",
            record.error.unwrap_or_else(|| "unknown error".to_string())
        ),
    }
}
