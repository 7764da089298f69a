use crate::error::CoreError;
use serde::{Deserialize, Serialize};

#[cfg(feature = "native")]
use base64::{engine::general_purpose::STANDARD as Base64Engine, Engine};

pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";
pub const DEFAULT_METADATA_URI: &str =
    "https://raw.githubusercontent.com/solana-developers/opos-asset/main/assets/DeveloperPortal/metadata.json";
pub const DEFAULT_METADATA_KEY: &str = "description";
pub const DEFAULT_METADATA_VALUE: &str = "Only Possible On Solana";

/// Extra key/value pair written into the token metadata after initialization.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct AdditionalField {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_commitment")]
    pub commitment: String,
    #[serde(default = "default_metadata_uri")]
    pub metadata_uri: String,
    #[serde(default = "default_additional_metadata")]
    pub additional_metadata: AdditionalField,
    #[serde(default = "default_confirm_timeout_secs")]
    pub confirm_timeout_secs: u64,
    #[serde(default)]
    pub wallet_keypair_path: Option<String>,
    #[serde(default)]
    pub wallet_private_key_string: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            commitment: default_commitment(),
            metadata_uri: default_metadata_uri(),
            additional_metadata: default_additional_metadata(),
            confirm_timeout_secs: default_confirm_timeout_secs(),
            wallet_keypair_path: None,
            wallet_private_key_string: None,
        }
    }
}

impl Settings {
    #[cfg(feature = "native")]
    pub fn from_file(path: &str) -> Result<Self, CoreError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(path));
        let cfg = builder.build()?;
        Ok(cfg.try_deserialize()?)
    }

    /// Load from `path` when it exists, otherwise fall back to defaults.
    #[cfg(feature = "native")]
    pub fn from_file_or_default(path: &str) -> Result<Self, CoreError> {
        if std::path::Path::new(path).exists() {
            Self::from_file(path)
        } else {
            log::debug!("No config at {}, using defaults", path);
            Ok(Self::default())
        }
    }

    #[cfg(feature = "native")]
    pub fn save_to_file(&self, path: &str) -> Result<(), CoreError> {
        let toml_string = toml::to_string(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    /// Confirmation deadline in milliseconds; huge values saturate.
    pub fn confirm_timeout_ms(&self) -> u64 {
        self.confirm_timeout_secs.saturating_mul(1000)
    }

    /// Validate settings ranges and constraints
    pub fn validate(&self) -> Result<(), CoreError> {
        let rpc = url::Url::parse(&self.rpc_url)
            .map_err(|e| CoreError::Validation(format!("rpc_url is not a URL: {}", e)))?;
        if rpc.scheme() != "http" && rpc.scheme() != "https" {
            return Err(CoreError::Validation("rpc_url must be http(s)".to_string()));
        }
        if url::Url::parse(&self.metadata_uri).is_err() {
            return Err(CoreError::Validation("metadata_uri must be a URL".to_string()));
        }
        if self.additional_metadata.key.trim().is_empty() {
            return Err(CoreError::Validation("additional metadata key must not be empty".to_string()));
        }
        if !matches!(self.commitment.as_str(), "processed" | "confirmed" | "finalized") {
            return Err(CoreError::Validation(format!(
                "commitment must be processed, confirmed or finalized (got {})",
                self.commitment
            )));
        }
        if self.confirm_timeout_secs == 0 {
            return Err(CoreError::Validation("confirm_timeout_secs must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Try to read a base64-encoded keypair from the given env var. Returns
/// the raw decoded bytes if present and valid, otherwise None.
#[cfg(feature = "native")]
pub fn load_keypair_from_env_var(var: &str) -> Option<Vec<u8>> {
    let s = std::env::var(var).ok()?;
    match Base64Engine.decode(&s) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            log::warn!("Failed to decode {}: {}", var, e);
            None
        }
    }
}

/// Parse a private key string in various formats:
/// - Base58 (standard Solana format, 88 chars)
/// - JSON array string like "[1,2,3,...]"
/// - Comma-separated bytes like "1,2,3,..."
pub fn parse_private_key_string(s: &str) -> Result<Vec<u8>, CoreError> {
    let trimmed = s.trim();

    if trimmed.len() >= 80 && !trimmed.starts_with('[') && !trimmed.contains(',') {
        return bs58::decode(trimmed)
            .into_vec()
            .map_err(|e| CoreError::InvalidKeypair(format!("Base58 decode failed: {}", e)));
    }

    if trimmed.starts_with('[') {
        return serde_json::from_str::<Vec<u8>>(trimmed)
            .map_err(|e| CoreError::InvalidKeypair(format!("JSON parse failed: {}", e)));
    }

    if trimmed.contains(',') {
        let parts: Result<Vec<u8>, _> = trimmed
            .split(',')
            .map(|s| s.trim().parse::<u8>())
            .collect();
        return parts.map_err(|e| CoreError::InvalidKeypair(format!("CSV parse failed: {}", e)));
    }

    Err(CoreError::InvalidKeypair(
        "Unrecognized private key format. Expected: base58, JSON array, or comma-separated bytes".to_string(),
    ))
}

fn default_rpc_url() -> String { DEFAULT_RPC_URL.to_string() }
fn default_commitment() -> String { "confirmed".to_string() }
fn default_metadata_uri() -> String { DEFAULT_METADATA_URI.to_string() }
fn default_additional_metadata() -> AdditionalField {
    AdditionalField {
        key: DEFAULT_METADATA_KEY.to_string(),
        value: DEFAULT_METADATA_VALUE.to_string(),
    }
}
fn default_confirm_timeout_secs() -> u64 { 60 }
