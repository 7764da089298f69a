mod commands;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use commands::{Cli, Commands, ConfigCommands, TokenArgs};
use log::{info, warn};
use solana_sdk::signature::Signer;
use std::path::Path;
use token_forge_core::models::OffchainTokenMetadata;
use token_forge_core::native::{load_wallet_keypair, KeypairWallet, NativeLedgerConnection};
use token_forge_core::{CoreError, CreateTokenService, Settings, SubmissionTracker};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match &cli.command {
        Commands::Create { token, keypair } => create(&cli, token, keypair.as_deref()).await,
        Commands::Metadata { token, image, output } => emit_metadata(token, image.clone(), output.as_deref()),
        Commands::Config { command } => handle_config_command(&cli, command),
    }
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let path = cli.config.to_string_lossy();
    let mut settings = Settings::from_file_or_default(&path)
        .with_context(|| format!("Failed to load config from {}", path))?;
    if let Some(rpc_url) = &cli.rpc_url {
        settings.rpc_url = rpc_url.clone();
    }
    settings.validate().context("Invalid configuration")?;
    Ok(settings)
}

fn describe(err: CoreError) -> anyhow::Error {
    anyhow!("{} [{:?}]: {}", err.user_message(), err.category(), err)
}

async fn create(cli: &Cli, token: &TokenArgs, keypair_path: Option<&Path>) -> Result<()> {
    let settings = load_settings(cli)?;
    let form = token.to_form();

    let keypair_path = keypair_path.map(|p| p.to_string_lossy().into_owned());
    let keypair = load_wallet_keypair(keypair_path.as_deref(), &settings).map_err(describe)?;
    let wallet = KeypairWallet::new(keypair);
    let connection = NativeLedgerConnection::from_settings(&settings).map_err(describe)?;
    info!(
        "Creating {} ({}) with wallet {} on {}",
        token.name,
        token.symbol,
        wallet.keypair().pubkey(),
        settings.rpc_url
    );

    let tracker = SubmissionTracker::new();
    let outcome = CreateTokenService::submit_form(&form, &tracker, &connection, &wallet, &settings)
        .await
        .map_err(describe)?;
    for warning in &outcome.report.warnings {
        warn!("{}", warning);
    }
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn emit_metadata(token: &TokenArgs, image: Option<String>, output: Option<&Path>) -> Result<()> {
    let config = token.to_form().validate().map_err(describe)?;
    let document = OffchainTokenMetadata::from_config(&config, image).to_json_pretty()?;
    match output {
        Some(path) => {
            std::fs::write(path, &document).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Off-chain metadata written to {}", path.display());
        }
        None => println!("{}", document),
    }
    Ok(())
}

fn handle_config_command(cli: &Cli, command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let mut settings = load_settings(cli)?;
            if settings.wallet_private_key_string.is_some() {
                settings.wallet_private_key_string = Some("<redacted>".to_string());
            }
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
        ConfigCommands::Validate => {
            load_settings(cli)?;
            println!("Configuration OK: {}", cli.config.display());
            Ok(())
        }
        ConfigCommands::Init { output } => write_default_config(output),
    }
}

fn write_default_config(output: &Path) -> Result<()> {
    if output.exists() {
        return Err(anyhow!("{} already exists", output.display()));
    }
    Settings::default()
        .save_to_file(&output.to_string_lossy())
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote default configuration to {}", output.display());
    Ok(())
}
