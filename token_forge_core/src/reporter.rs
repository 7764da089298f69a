// Post-confirmation reporting
// Reads the new mint back from the ledger; read failures never turn a
// confirmed creation into an error

use crate::connection::{get_mint, get_token_metadata, LedgerConnection};
use crate::metadata::{MetadataSummary, MintSummary};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationReport {
    pub mint: Option<MintSummary>,
    pub metadata: Option<MetadataSummary>,
    /// Reads that failed after the transaction was confirmed.
    pub warnings: Vec<String>,
}

/// What a successful submission hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationOutcome {
    pub mint: String,
    pub signature: String,
    /// Lamports moved into the mint account.
    pub lamports: u64,
    /// Bytes the rent figure was quoted for.
    pub rent_space: usize,
    pub created_at: DateTime<Utc>,
    pub report: CreationReport,
}

pub async fn report_created_token<C: LedgerConnection + ?Sized>(connection: &C, mint: &Pubkey) -> CreationReport {
    let mut report = CreationReport::default();

    match get_mint(connection, mint).await {
        Ok(summary) => {
            info!(
                "Mint {}: decimals={} supply={} authority={:?} pointer={:?}",
                summary.address, summary.decimals, summary.supply, summary.mint_authority, summary.metadata_pointer
            );
            report.mint = Some(summary);
        }
        Err(e) => {
            warn!("Could not read back mint {}: {}", mint, e);
            report.warnings.push(format!("mint read failed: {}", e));
        }
    }

    match get_token_metadata(connection, mint).await {
        Ok(metadata) => {
            let summary = MetadataSummary::from(&metadata);
            info!(
                "Metadata for {}: name={} symbol={} uri={} extra={:?}",
                mint, summary.name, summary.symbol, summary.uri, summary.additional_metadata
            );
            report.metadata = Some(summary);
        }
        Err(e) => {
            warn!("Could not read back metadata for {}: {}", mint, e);
            report.warnings.push(format!("metadata read failed: {}", e));
        }
    }

    report
}
