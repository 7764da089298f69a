use serde::Serialize;
use solana_sdk::instruction::InstructionError;
use solana_sdk::transaction::TransactionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[cfg(feature = "native")]
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Metadata too large: {size} bytes exceeds the {limit} byte limit")]
    MetadataTooLarge { size: usize, limit: usize },

    #[error("Invalid keypair: {0}")]
    InvalidKeypair(String),

    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("Wallet rejected the request: {0}")]
    WalletRejected(String),

    #[error("A token creation request is already in flight")]
    SubmissionInFlight,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Program error: {0}")]
    Program(String),

    #[cfg(feature = "native")]
    #[error("I/O error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialization(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Coarse grouping of failures, used to pick what the user sees and whether
/// the form is worth editing before a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Input,
    Wallet,
    Network,
    Program,
    Internal,
}

impl CoreError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CoreError::Validation(_)
            | CoreError::MissingField(_)
            | CoreError::InvalidInput(_)
            | CoreError::MetadataTooLarge { .. }
            | CoreError::SubmissionInFlight => ErrorCategory::Input,
            CoreError::WalletNotConnected
            | CoreError::WalletRejected(_)
            | CoreError::InvalidKeypair(_) => ErrorCategory::Wallet,
            CoreError::Network(_) | CoreError::Timeout(_) | CoreError::Rpc(_) => {
                ErrorCategory::Network
            }
            CoreError::InsufficientFunds(_) | CoreError::Program(_) => ErrorCategory::Program,
            _ => ErrorCategory::Internal,
        }
    }

    /// Short sentence suitable for a status line next to the submit control.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::MissingField(field) => format!("Please fill in the {} field.", field),
            CoreError::Validation(msg) | CoreError::InvalidInput(msg) => msg.clone(),
            CoreError::MetadataTooLarge { size, limit } => format!(
                "Name, symbol and metadata take {} bytes; the limit is {}. Shorten them and try again.",
                size, limit
            ),
            CoreError::WalletNotConnected => "Connect a wallet before creating a token.".to_string(),
            CoreError::WalletRejected(_) => "The wallet declined to sign the transaction.".to_string(),
            CoreError::SubmissionInFlight => "A token is already being created; wait for it to finish.".to_string(),
            CoreError::Network(_) | CoreError::Rpc(_) => {
                "Could not reach the network. Check the RPC endpoint and retry.".to_string()
            }
            CoreError::Timeout(_) => {
                "The transaction was not confirmed in time. Check the explorer before retrying.".to_string()
            }
            CoreError::InsufficientFunds(_) => {
                "The wallet does not hold enough SOL for rent and fees.".to_string()
            }
            CoreError::Program(msg) => format!("The token program rejected the transaction: {}", msg),
            other => other.to_string(),
        }
    }

    /// Map a ledger-side transaction failure onto the error taxonomy.
    pub fn from_transaction_error(err: &TransactionError) -> Self {
        match err {
            TransactionError::InsufficientFundsForFee
            | TransactionError::InsufficientFundsForRent { .. }
            | TransactionError::InstructionError(_, InstructionError::InsufficientFunds) => {
                CoreError::InsufficientFunds(err.to_string())
            }
            TransactionError::BlockhashNotFound => CoreError::Timeout(err.to_string()),
            _ => CoreError::Program(err.to_string()),
        }
    }
}

#[cfg(feature = "native")]
impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Io(err.to_string())
    }
}

#[cfg(feature = "native")]
impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for CoreError {
    fn from(err: toml::ser::Error) -> Self {
        CoreError::TomlSerialization(err.to_string())
    }
}
