use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use token_forge_core::form::{FormField, FormState};

#[derive(Parser, Debug)]
#[command(name = "token_forge")]
#[command(about = "Create Token-2022 mints with embedded metadata")]
#[command(version)]
pub struct Cli {
    /// Configuration file path (missing file means defaults)
    #[arg(short, long, env = "TOKEN_FORGE_CONFIG_PATH", default_value = "config.toml")]
    pub config: PathBuf,

    /// Override the configured RPC endpoint
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new token mint and print the outcome as JSON
    Create {
        #[command(flatten)]
        token: TokenArgs,

        /// Wallet keypair file paying for and owning the mint
        #[arg(short, long, env = "TOKEN_FORGE_KEYPAIR")]
        keypair: Option<PathBuf>,
    },

    /// Print the off-chain metadata document for a token without creating it
    Metadata {
        #[command(flatten)]
        token: TokenArgs,

        /// Image URL to include in the document
        #[arg(long)]
        image: Option<String>,

        /// Write the document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Validate the configuration file
    Validate,

    /// Write a configuration file with default values
    Init {
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
}

/// Form inputs; social and creator groups switch on when any of their flags is given.
#[derive(Args, Debug, Clone, Default)]
pub struct TokenArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub symbol: String,
    #[arg(long, default_value = "6")]
    pub decimals: String,
    #[arg(long, default_value = "10")]
    pub supply: String,
    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub website: Option<String>,
    #[arg(long)]
    pub twitter: Option<String>,
    #[arg(long)]
    pub telegram: Option<String>,
    #[arg(long)]
    pub discord: Option<String>,

    #[arg(long)]
    pub creator_name: Option<String>,
    #[arg(long, requires = "creator_name")]
    pub creator_website: Option<String>,
}

impl TokenArgs {
    /// Fill a form the same way the browser page would.
    pub fn to_form(&self) -> FormState {
        let mut form = FormState::new();
        form.set_field(FormField::Name, self.name.as_str());
        form.set_field(FormField::Symbol, self.symbol.as_str());
        form.set_field(FormField::Decimals, self.decimals.as_str());
        form.set_field(FormField::Supply, self.supply.as_str());

        let optional = [
            (FormField::Description, &self.description),
            (FormField::Website, &self.website),
            (FormField::Twitter, &self.twitter),
            (FormField::Telegram, &self.telegram),
            (FormField::Discord, &self.discord),
            (FormField::CreatorName, &self.creator_name),
            (FormField::CreatorWebsite, &self.creator_website),
        ];
        for (field, value) in optional {
            if let Some(value) = value {
                form.set_field(field, value.as_str());
            }
        }

        let social = [&self.website, &self.twitter, &self.telegram, &self.discord];
        if social.iter().any(|v| v.is_some()) {
            form.toggle_social_links();
        }
        if self.creator_name.is_some() {
            form.toggle_advanced();
            form.toggle_modify_creator();
        }
        form
    }
}
