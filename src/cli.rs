//! # AGWCTL CLI
//!
//! Command-line interface for the API Gateway Reconciler.
//!
//! Reads a declaration file describing the desired endpoints, converges the
//! remote gateway onto it, and records what it created in a local state file
//! so later runs know what they own.
//!
//! ## Usage
//!
//! ```bash
//! # Converge the gateway onto the declaration
//! agwctl apply --file gateway.yaml
//!
//! # Check a declaration without touching AWS
//! agwctl validate --file gateway.yaml
//!
//! # Show the endpoints recorded by the last apply
//! agwctl status
//!
//! # Tear down the API recorded in state
//! agwctl remove
//! ```

use anyhow::{Context, Result};
use api_gateway_reconciler::config::{self, Settings};
use api_gateway_reconciler::constants;
use api_gateway_reconciler::declaration::{Declaration, DeclarationFile, Overrides};
use api_gateway_reconciler::provider::AwsGatewayProvider;
use api_gateway_reconciler::reconciler::{validation, Reconciler};
use api_gateway_reconciler::state::State;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// API Gateway Reconciler CLI
#[derive(Parser)]
#[command(name = "agwctl")]
#[command(about = "API Gateway endpoint reconciler CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Declaration file (defaults to gateway.yaml)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// State file (defaults to agwctl.state.json)
    #[arg(short, long, global = true)]
    state: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Converge the gateway onto the declaration
    Apply {
        /// AWS region override
        #[arg(short, long)]
        region: Option<String>,

        /// Deployment stage override
        #[arg(long)]
        stage: Option<String>,
    },
    /// Check the declaration without touching the gateway
    Validate {
        /// AWS region override
        #[arg(short, long)]
        region: Option<String>,

        /// Deployment stage override
        #[arg(long)]
        stage: Option<String>,
    },
    /// Show the endpoints recorded by the last apply
    Status,
    /// Tear down the API recorded in state
    Remove {
        /// AWS region override
        #[arg(short, long)]
        region: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agwctl=info,api_gateway_reconciler=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env();
    let declaration_file = cli.file.unwrap_or(settings.declaration_file);
    let state_file = cli.state.unwrap_or(settings.state_file);

    match cli.command {
        Commands::Apply { region, stage } => {
            apply_command(&declaration_file, &state_file, region, stage).await
        }
        Commands::Validate { region, stage } => {
            validate_command(&declaration_file, region, stage)
        }
        Commands::Status => status_command(&state_file),
        Commands::Remove { region } => {
            remove_command(&declaration_file, &state_file, region).await
        }
    }
}

/// Load the declaration and fold in command-line overrides.
fn load_declaration(
    path: &Path,
    region: Option<String>,
    stage: Option<String>,
) -> Result<Declaration> {
    let file = DeclarationFile::load(path)?;
    file.resolve(&Overrides { region, stage })
        .with_context(|| format!("Failed to resolve declaration {}", path.display()))
}

/// Converge the gateway onto the declaration and persist the new state.
async fn apply_command(
    declaration_file: &Path,
    state_file: &Path,
    region: Option<String>,
    stage: Option<String>,
) -> Result<()> {
    let declaration = load_declaration(declaration_file, region, stage)?;
    let state = State::load(state_file)?;

    println!(
        "Applying '{}' in {} (stage {})...",
        declaration.name, declaration.region, declaration.stage
    );

    let provider = AwsGatewayProvider::new(&declaration.region).await;
    let reconciler = Reconciler::new(&provider, &provider);

    let outcome = reconciler
        .apply(&declaration, &state)
        .await
        .with_context(|| format!("Apply failed for declaration '{}'", declaration.name))?;

    println!("✅ Apply complete");
    println!("   API: {}", outcome.api_id);
    println!("   Deployment: {}", outcome.deployment_id);
    if outcome.created_api {
        println!("   Created a new REST API");
    }

    if !outcome.endpoints.is_empty() {
        println!("\n{:<8} {:<28} {}", "METHOD", "PATH", "URL");
        println!("{}", "-".repeat(100));
        for endpoint in &outcome.endpoints {
            println!(
                "{:<8} {:<28} {}",
                endpoint.method, endpoint.path, endpoint.url
            );
        }
    }

    let new_state = outcome.into_state();
    new_state.save(state_file)?;
    println!("\nState written to {}", state_file.display());

    Ok(())
}

/// Run the offline validation checks against every declared endpoint.
fn validate_command(
    declaration_file: &Path,
    region: Option<String>,
    stage: Option<String>,
) -> Result<()> {
    let declaration = load_declaration(declaration_file, region, stage)?;

    let mut failures = 0usize;
    for spec in &declaration.endpoints {
        match validation::validate_endpoint_object(
            spec,
            "validation",
            &declaration.region,
            &declaration.stage,
        ) {
            Ok(endpoint) => println!("✅ {} {}", endpoint.method, endpoint.path),
            Err(e) => {
                failures += 1;
                println!("❌ {e}");
            }
        }
    }

    if failures > 0 {
        anyhow::bail!(
            "{} invalid endpoint(s) in {}",
            failures,
            declaration_file.display()
        );
    }

    println!(
        "\nDeclaration valid: {} endpoint(s), region {}, stage {}",
        declaration.endpoints.len(),
        declaration.region,
        declaration.stage
    );
    Ok(())
}

/// Show what the last apply recorded.
fn status_command(state_file: &Path) -> Result<()> {
    let state = State::load(state_file)?;

    let Some(api_id) = &state.api_id else {
        println!("No API recorded. Run 'agwctl apply' first.");
        return Ok(());
    };
    println!("API: {api_id}");

    if state.endpoints.is_empty() {
        println!("No endpoints recorded.");
        return Ok(());
    }

    println!("\n{:<8} {:<28} {}", "METHOD", "PATH", "URL");
    println!("{}", "-".repeat(100));
    for endpoint in &state.endpoints {
        println!(
            "{:<8} {:<28} {}",
            endpoint.method, endpoint.path, endpoint.url
        );
    }

    Ok(())
}

/// Tear down the recorded API and clear the state file.
///
/// The region comes from the declaration file when it is still around,
/// otherwise from the override flag, environment, or default.
async fn remove_command(
    declaration_file: &Path,
    state_file: &Path,
    region: Option<String>,
) -> Result<()> {
    let region = match DeclarationFile::load(declaration_file) {
        Ok(file) => {
            file.resolve(&Overrides {
                region,
                stage: None,
            })?
            .region
        }
        Err(_) => region
            .or_else(|| config::env_var(constants::ENV_REGION))
            .unwrap_or_else(|| constants::DEFAULT_REGION.to_string()),
    };

    let state = State::load(state_file)?;
    match &state.api_id {
        Some(api_id) => println!("Removing REST API {api_id} in {region}..."),
        None => println!("No API recorded, clearing state."),
    }

    let provider = AwsGatewayProvider::new(&region).await;
    let reconciler = Reconciler::new(&provider, &provider);

    let cleared = reconciler.remove(&state).await;
    cleared.save(state_file)?;

    println!("✅ Removal complete, state cleared");
    Ok(())
}
