// Native wallet backed by a local Solana keypair

use crate::connection::LedgerConnection;
use crate::error::CoreError;
use crate::settings::{load_keypair_from_env_var, parse_private_key_string, Settings};
use crate::wallet::{WalletHandle, WalletResult};
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{read_keypair_file, Keypair, Signature, Signer};
use solana_sdk::transaction::Transaction;

/// Env var holding a base64-encoded 64-byte keypair.
pub const KEYPAIR_ENV_VAR: &str = "TOKEN_FORGE_KEYPAIR_B64";

pub struct KeypairWallet {
    keypair: Keypair,
}

impl KeypairWallet {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

/// Resolve the wallet keypair: explicit path, then settings path, then the
/// base64 env var, then an inline private key string from settings.
pub fn load_wallet_keypair(path_override: Option<&str>, settings: &Settings) -> Result<Keypair, CoreError> {
    if let Some(path) = path_override.or(settings.wallet_keypair_path.as_deref()) {
        return read_keypair_file(path)
            .map_err(|e| CoreError::InvalidKeypair(format!("Failed to read keypair file {}: {}", path, e)));
    }
    if let Some(bytes) = load_keypair_from_env_var(KEYPAIR_ENV_VAR) {
        return keypair_from_bytes(&bytes);
    }
    if let Some(secret) = settings.wallet_private_key_string.as_deref() {
        return keypair_from_bytes(&parse_private_key_string(secret)?);
    }
    Err(CoreError::WalletNotConnected)
}

fn keypair_from_bytes(bytes: &[u8]) -> Result<Keypair, CoreError> {
    Keypair::try_from(bytes).map_err(|e| CoreError::InvalidKeypair(e.to_string()))
}

#[async_trait(?Send)]
impl WalletHandle for KeypairWallet {
    fn public_key(&self) -> Option<Pubkey> {
        Some(self.keypair.pubkey())
    }

    async fn send_transaction(
        &self,
        mut transaction: Transaction,
        connection: &dyn LedgerConnection,
    ) -> WalletResult<Signature> {
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[&self.keypair], blockhash)
            .map_err(|e| CoreError::WalletRejected(format!("Keypair could not sign: {}", e)))?;
        connection.send_and_confirm_transaction(&transaction).await
    }
}
