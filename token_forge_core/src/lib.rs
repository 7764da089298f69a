// Token Forge Core Library
// Platform-agnostic Token-2022 mint creation with embedded metadata

pub mod error;
pub mod settings;
pub mod models;
pub mod form;
pub mod metadata;
pub mod connection;
pub mod wallet;
pub mod assembler;
pub mod submission;
pub mod reporter;
pub mod create_service;

#[cfg(test)]
mod testing;

#[cfg(feature = "native")]
pub mod native;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod wasm;

// Re-exports
pub use error::{CoreError, ErrorCategory};
pub use settings::{AdditionalField, Settings};
pub use models::*;
pub use form::{FormField, FormState, TokenFormData, UiToggles};
pub use metadata::{MetadataSummary, MintSummary};
pub use connection::LedgerConnection;
pub use wallet::WalletHandle;
pub use submission::{SubmissionStatus, SubmissionTracker};
pub use reporter::{CreationOutcome, CreationReport};
pub use create_service::CreateTokenService;
