// High-level token creation service
// Uses platform-agnostic traits for the ledger connection and the wallet

use crate::assembler::{build_create_token_instructions, build_create_token_transaction, MintPlan};
use crate::connection::LedgerConnection;
use crate::error::CoreError;
use crate::form::FormState;
use crate::models::TokenConfig;
use crate::reporter::{report_created_token, CreationOutcome};
use crate::settings::Settings;
use crate::submission::SubmissionTracker;
use crate::wallet::WalletHandle;
use log::{debug, info};
use solana_sdk::signature::{Keypair, Signer};

pub type CreateServiceResult<T> = Result<T, CoreError>;

pub struct CreateTokenService;

impl CreateTokenService {
    /// Create a Token-2022 mint with embedded metadata from a validated config.
    ///
    /// Every call generates a fresh mint keypair, so a retry after any failure
    /// targets a new account address.
    pub async fn create_token(
        config: &TokenConfig,
        connection: &dyn LedgerConnection,
        wallet: &dyn WalletHandle,
        settings: &Settings,
    ) -> CreateServiceResult<CreationOutcome> {
        // 1. Nothing is built for a disconnected wallet
        let authority = wallet.public_key().ok_or(CoreError::WalletNotConnected)?;

        // 2. Fresh mint account for this attempt
        let mint_keypair = Keypair::new();
        let mint = mint_keypair.pubkey();

        // 3. Metadata record and sizes (local; rejects oversized metadata)
        let plan = MintPlan::prepare(config, &authority, &mint, settings)?;
        debug!(
            "Mint {} sizing: mint_len={} metadata_len={} rent_space={}",
            mint,
            plan.sizing.mint_len,
            plan.sizing.metadata_len,
            plan.rent_space()
        );

        // 4. Rent for the account once metadata has been written into it
        let lamports = connection
            .get_minimum_balance_for_rent_exemption(plan.rent_space())
            .await?;

        // 5. Ordered instruction batch, one transaction
        let instructions = build_create_token_instructions(&plan, lamports)?;
        let blockhash = connection.get_latest_blockhash().await?;
        let transaction = build_create_token_transaction(&instructions, &authority, &mint_keypair, blockhash)?;

        // 6. Wallet signs and submits
        info!(
            "Submitting token creation for {} ({}) via {}",
            config.name,
            config.symbol,
            connection.endpoint()
        );
        let signature = wallet.send_transaction(transaction, connection).await?;
        info!("Token mint created at {} (signature {})", mint, signature);

        // 7. Best-effort read back
        let report = report_created_token(connection, &mint).await;

        Ok(CreationOutcome {
            mint: mint.to_string(),
            signature: signature.to_string(),
            lamports,
            rent_space: plan.rent_space(),
            created_at: chrono::Utc::now(),
            report,
        })
    }

    /// Validate the form and run one tracked creation attempt.
    pub async fn submit_form(
        form: &FormState,
        tracker: &SubmissionTracker,
        connection: &dyn LedgerConnection,
        wallet: &dyn WalletHandle,
        settings: &Settings,
    ) -> CreateServiceResult<CreationOutcome> {
        let ticket = tracker.begin()?;
        let result = match form.validate() {
            Ok(config) => Self::create_token(&config, connection, wallet, settings).await,
            Err(e) => Err(e),
        };
        match &result {
            Ok(outcome) => ticket.succeed(outcome.clone()),
            Err(e) => ticket.fail(e),
        }
        result
    }
}
