// Native ledger connection wrapping solana_client::RpcClient

use crate::connection::{ConnectionResult, LedgerConnection};
use crate::error::CoreError;
use crate::settings::Settings;
use async_trait::async_trait;
use log::debug;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::rpc_client::RpcClient as SolanaRpcClient;
use solana_client::rpc_request::RpcError;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Native ledger connection wrapping solana_client::RpcClient
pub struct NativeLedgerConnection {
    client: Arc<SolanaRpcClient>,
    endpoint: String,
}

impl NativeLedgerConnection {
    pub fn new(endpoint: String, commitment: CommitmentConfig, confirm_timeout: Duration) -> Self {
        let client = SolanaRpcClient::new_with_timeouts_and_commitment(
            endpoint.clone(),
            REQUEST_TIMEOUT,
            commitment,
            confirm_timeout,
        );
        Self {
            client: Arc::new(client),
            endpoint,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, CoreError> {
        let commitment = CommitmentConfig::from_str(&settings.commitment)
            .map_err(|e| CoreError::Validation(format!("Invalid commitment {}: {}", settings.commitment, e)))?;
        Ok(Self::new(
            settings.rpc_url.clone(),
            commitment,
            Duration::from_secs(settings.confirm_timeout_secs),
        ))
    }

    /// Get reference to underlying Solana RPC client
    pub fn inner(&self) -> &Arc<SolanaRpcClient> {
        &self.client
    }

    async fn run<T, F>(&self, call: F) -> ConnectionResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&SolanaRpcClient) -> Result<T, ClientError> + Send + 'static,
    {
        let client = self.client.clone();
        tokio::task::spawn_blocking(move || call(&client))
            .await
            .map_err(|e| CoreError::Rpc(format!("Task join error: {}", e)))?
            .map_err(classify_client_error)
    }
}

/// Sort an RPC client failure into the error taxonomy.
pub fn classify_client_error(err: ClientError) -> CoreError {
    if let Some(tx_err) = err.get_transaction_error() {
        return CoreError::from_transaction_error(&tx_err);
    }
    match err.kind() {
        ClientErrorKind::Reqwest(e) if e.is_timeout() => CoreError::Timeout(e.to_string()),
        ClientErrorKind::Reqwest(e) => CoreError::Network(e.to_string()),
        ClientErrorKind::Io(e) => CoreError::Network(e.to_string()),
        ClientErrorKind::RpcError(RpcError::ForUser(msg)) if msg.contains("unable to confirm") => {
            CoreError::Timeout(msg.clone())
        }
        _ => CoreError::Rpc(err.to_string()),
    }
}

#[async_trait(?Send)]
impl LedgerConnection for NativeLedgerConnection {
    async fn get_minimum_balance_for_rent_exemption(&self, size: usize) -> ConnectionResult<u64> {
        debug!("Native RPC: get_minimum_balance_for_rent_exemption({})", size);
        self.run(move |c| c.get_minimum_balance_for_rent_exemption(size)).await
    }

    async fn get_latest_blockhash(&self) -> ConnectionResult<Hash> {
        debug!("Native RPC: get_latest_blockhash");
        self.run(|c| c.get_latest_blockhash()).await
    }

    async fn get_account_data(&self, pubkey: &Pubkey) -> ConnectionResult<Option<Vec<u8>>> {
        debug!("Native RPC: get_account_data for {}", pubkey);
        let pubkey = *pubkey;
        let response = self
            .run(move |c| c.get_account_with_commitment(&pubkey, c.commitment()))
            .await?;
        Ok(response.value.map(|account| account.data))
    }

    async fn send_and_confirm_transaction(&self, transaction: &Transaction) -> ConnectionResult<Signature> {
        debug!("Native RPC: send_and_confirm_transaction");
        let tx = transaction.clone();
        self.run(move |c| c.send_and_confirm_transaction(&tx)).await
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
