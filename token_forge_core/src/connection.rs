// Ledger connection abstraction - allows both native and WASM implementations

use crate::error::CoreError;
use crate::metadata::{decode_mint_account, decode_token_metadata, MintSummary};
use async_trait::async_trait;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use spl_token_metadata_interface::state::TokenMetadata;

/// Result type for ledger operations
pub type ConnectionResult<T> = Result<T, CoreError>;

/// Read/write handle to a remote ledger endpoint
#[async_trait(?Send)]
pub trait LedgerConnection {
    /// Lamports an account of `size` bytes must hold to be rent exempt
    async fn get_minimum_balance_for_rent_exemption(&self, size: usize) -> ConnectionResult<u64>;

    async fn get_latest_blockhash(&self) -> ConnectionResult<Hash>;

    /// Raw account data, `None` when the account does not exist
    async fn get_account_data(&self, pubkey: &Pubkey) -> ConnectionResult<Option<Vec<u8>>>;

    /// Submit a fully signed transaction and wait for confirmation
    async fn send_and_confirm_transaction(&self, transaction: &Transaction) -> ConnectionResult<Signature>;

    /// Endpoint URL, for logs
    fn endpoint(&self) -> &str;
}

/// Fetch and decode a Token-2022 mint
pub async fn get_mint<C: LedgerConnection + ?Sized>(
    connection: &C,
    mint: &Pubkey,
) -> ConnectionResult<MintSummary> {
    let data = connection
        .get_account_data(mint)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Mint account not found: {}", mint)))?;
    decode_mint_account(mint, &data)
}

/// Fetch the metadata record embedded in a Token-2022 mint
pub async fn get_token_metadata<C: LedgerConnection + ?Sized>(
    connection: &C,
    mint: &Pubkey,
) -> ConnectionResult<TokenMetadata> {
    let data = connection
        .get_account_data(mint)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Mint account not found: {}", mint)))?;
    decode_token_metadata(&data)
}
