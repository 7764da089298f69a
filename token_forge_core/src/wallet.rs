// Platform-agnostic wallet abstraction
// Native wallets sign with a local keypair; WASM defers to the browser wallet

use crate::connection::LedgerConnection;
use crate::error::CoreError;
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;

pub type WalletResult<T> = Result<T, CoreError>;

/// Connected wallet as seen by the token creation flow.
/// Implementations exist for:
/// - Native: signs with a keypair loaded from disk or env
/// - WASM: hands the transaction to a browser wallet (e.g., Phantom, Solflare)
#[async_trait(?Send)]
pub trait WalletHandle {
    /// Active public key, `None` while disconnected
    fn public_key(&self) -> Option<Pubkey>;

    /// Add the wallet's signature to `transaction` (already partially signed
    /// by any extra signers) and submit it through `connection`.
    /// Fails with `WalletRejected` when the user declines.
    async fn send_transaction(
        &self,
        transaction: Transaction,
        connection: &dyn LedgerConnection,
    ) -> WalletResult<Signature>;
}

/// Accept a transaction handed back by an external signer only if it is
/// signed and carries the exact message that was sent out for signing.
pub fn check_signed_transaction(original: &Transaction, signed: &Transaction) -> WalletResult<()> {
    if signed.message != original.message {
        return Err(CoreError::WalletRejected(
            "Wallet returned a different transaction than the one requested".to_string(),
        ));
    }
    if !signed.is_signed() {
        return Err(CoreError::WalletRejected("Wallet did not sign the transaction".to_string()));
    }
    Ok(())
}
