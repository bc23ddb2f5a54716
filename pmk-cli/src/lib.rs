//! # pmk-cli
//!
//! Command-line launcher for the PMK agents.
//!
//! - `pmk serve` - HTTP server (see `pmk-server`)
//! - `pmk run` - one full workflow, written out as JSON
//! - `pmk feedback` - route feedback on a saved run, or settle a pending decision
//! - `pmk linear teams` / `pmk pinecone indexes` - vendor key diagnostics
//!
//! Clients are built here from the environment (a `.env` file is loaded first) and an
//! optional `pmk.toml`, then injected into the workflow and the server.

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod remediation;
pub mod serve;
pub mod workflow;

use anyhow::{Result, bail};
use cli::{Cli, Commands, LinearCommand, PineconeCommand};
use pmk_agent::{AgentContext, ConversationalWorkflow};
use pmk_integrations::{Integrations, IntegrationsConfig};
use pmk_model::{GeminiClient, GeminiConfig};
use std::sync::Arc;

pub use config::PmkConfig;

/// Build the model client and every configured vendor adapter.
pub fn agent_context(config: &PmkConfig) -> Result<AgentContext> {
    let mut gemini = GeminiConfig::from_env()?;
    if let Some(model) = &config.model.name {
        gemini = gemini.with_model(model.clone());
    }
    let model = gemini.model.clone();
    let llm = Arc::new(GeminiClient::new(gemini)?);

    let vendors = IntegrationsConfig::from_env();
    tracing::info!(model = %model, vendors = ?vendors.configured(), "clients configured");
    let integrations = Integrations::from_config(&vendors)?;

    Ok(AgentContext::new(llm)
        .with_integrations(integrations)
        .with_settings(config.agent_settings()))
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = PmkConfig::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Serve { host, port } => {
            serve::run_serve(agent_context(&config)?, &config, host, port).await
        }
        Commands::Run(args) => {
            let flow = ConversationalWorkflow::new(agent_context(&config)?);
            let run = workflow::run_workflow(&flow, &args).await?;
            eprintln!("{}", workflow::summarize(&run));
            if let Some(failure) = &run.failure {
                if let Some(hint) = remediation::hint_for_failure(failure) {
                    eprintln!("hint: {hint}");
                }
                bail!("workflow stopped at the {} step", failure.step);
            }
            Ok(())
        }
        Commands::Feedback(args) => {
            let flow = ConversationalWorkflow::new(agent_context(&config)?);
            let outcome = workflow::apply_feedback(&flow, &args).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            eprintln!("{}", workflow::summarize(&workflow::read_run(&args.run)?));
            Ok(())
        }
        Commands::Linear(LinearCommand::Teams) => diagnostics::linear_teams().await,
        Commands::Pinecone(PineconeCommand::Indexes) => {
            let integrations = Integrations::from_config(&IntegrationsConfig::from_env())?;
            diagnostics::pinecone_indexes(&integrations).await
        }
    }
}
