// Token-2022 metadata helpers
// Derives the embedded metadata record, sizes the mint account for it and
// decodes mint/metadata state read back from the ledger

use crate::error::CoreError;
use crate::models::TokenConfig;
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use solana_program::entrypoint::MAX_PERMITTED_DATA_INCREASE;
use solana_program::program_option::COption;
use solana_program::pubkey::Pubkey;
use spl_pod::optional_keys::OptionalNonZeroPubkey;
use spl_token_2022::extension::metadata_pointer::MetadataPointer;
use spl_token_2022::extension::{BaseStateWithExtensions, ExtensionType, StateWithExtensions};
use spl_token_2022::state::Mint;
use spl_token_metadata_interface::state::TokenMetadata;

/// Result type for metadata operations
pub type MetadataResult<T> = Result<T, CoreError>;

/// Token-2022 TLV entry header: u16 extension type followed by u16 length.
pub const EXTENSION_TYPE_SIZE: usize = 2;
pub const EXTENSION_LENGTH_SIZE: usize = 2;
pub const METADATA_EXTENSION_HEADER: usize = EXTENSION_TYPE_SIZE + EXTENSION_LENGTH_SIZE;

/// The metadata initialize instruction grows the mint account in place, so the
/// whole TLV entry has to fit in a single realloc.
pub const MAX_METADATA_TLV_LEN: usize = MAX_PERMITTED_DATA_INCREASE;

/// Compose the metadata record stored inside the mint.
pub fn build_metadata_record(
    config: &TokenConfig,
    mint: &Pubkey,
    update_authority: &Pubkey,
    settings: &Settings,
) -> MetadataResult<TokenMetadata> {
    let update_authority = OptionalNonZeroPubkey::try_from(Some(*update_authority))
        .map_err(|e| CoreError::InvalidInput(format!("Invalid update authority: {}", e)))?;
    let value = config
        .description
        .clone()
        .unwrap_or_else(|| settings.additional_metadata.value.clone());
    Ok(TokenMetadata {
        update_authority,
        mint: *mint,
        name: config.name.clone(),
        symbol: config.symbol.clone(),
        uri: settings.metadata_uri.clone(),
        additional_metadata: vec![(settings.additional_metadata.key.clone(), value)],
    })
}

/// Account sizes for a metadata-carrying mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MintSizing {
    /// Space allocated by `create_account`: base mint plus the pointer extension.
    pub mint_len: usize,
    /// Borsh-packed length of the metadata record.
    pub metadata_len: usize,
}

impl MintSizing {
    /// TLV entry the metadata initialize instruction appends to the mint.
    pub fn metadata_tlv_len(&self) -> usize {
        METADATA_EXTENSION_HEADER + self.metadata_len
    }

    /// Bytes the account is funded for once metadata has been written.
    pub fn rent_space(&self) -> usize {
        self.mint_len + self.metadata_tlv_len()
    }
}

pub fn packed_metadata_len(metadata: &TokenMetadata) -> MetadataResult<usize> {
    borsh::to_vec(metadata)
        .map(|bytes| bytes.len())
        .map_err(|e| CoreError::ParseError(format!("Failed to pack metadata: {}", e)))
}

/// Size the mint and reject metadata the program could never store.
/// Runs before any network call.
pub fn size_mint_for(metadata: &TokenMetadata) -> MetadataResult<MintSizing> {
    let mint_len = ExtensionType::try_calculate_account_len::<Mint>(&[ExtensionType::MetadataPointer])
        .map_err(|e| CoreError::Program(format!("Failed to compute mint size: {}", e)))?;
    let sizing = MintSizing {
        mint_len,
        metadata_len: packed_metadata_len(metadata)?,
    };
    if sizing.metadata_tlv_len() > MAX_METADATA_TLV_LEN {
        return Err(CoreError::MetadataTooLarge {
            size: sizing.metadata_tlv_len(),
            limit: MAX_METADATA_TLV_LEN,
        });
    }
    Ok(sizing)
}

/// Mint state as read back from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintSummary {
    pub address: String,
    pub decimals: u8,
    pub supply: u64,
    pub is_initialized: bool,
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
    pub metadata_pointer: Option<MetadataPointerSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataPointerSummary {
    pub authority: Option<String>,
    pub metadata_address: Option<String>,
}

/// Embedded metadata record as read back from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataSummary {
    pub update_authority: Option<String>,
    pub mint: String,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub additional_metadata: Vec<(String, String)>,
}

impl From<&TokenMetadata> for MetadataSummary {
    fn from(m: &TokenMetadata) -> Self {
        Self {
            update_authority: Option::<Pubkey>::from(m.update_authority).map(|k| k.to_string()),
            mint: m.mint.to_string(),
            name: m.name.clone(),
            symbol: m.symbol.clone(),
            uri: m.uri.clone(),
            additional_metadata: m.additional_metadata.clone(),
        }
    }
}

fn coption_to_string(key: COption<Pubkey>) -> Option<String> {
    Option::<Pubkey>::from(key).map(|k| k.to_string())
}

pub fn decode_mint_account(address: &Pubkey, data: &[u8]) -> MetadataResult<MintSummary> {
    let state = StateWithExtensions::<Mint>::unpack(data)
        .map_err(|e| CoreError::ParseError(format!("Failed to unpack mint: {}", e)))?;
    let metadata_pointer = state.get_extension::<MetadataPointer>().ok().map(|p| MetadataPointerSummary {
        authority: Option::<Pubkey>::from(p.authority).map(|k| k.to_string()),
        metadata_address: Option::<Pubkey>::from(p.metadata_address).map(|k| k.to_string()),
    });
    Ok(MintSummary {
        address: address.to_string(),
        decimals: state.base.decimals,
        supply: state.base.supply,
        is_initialized: state.base.is_initialized,
        mint_authority: coption_to_string(state.base.mint_authority),
        freeze_authority: coption_to_string(state.base.freeze_authority),
        metadata_pointer,
    })
}

pub fn decode_token_metadata(data: &[u8]) -> MetadataResult<TokenMetadata> {
    let state = StateWithExtensions::<Mint>::unpack(data)
        .map_err(|e| CoreError::ParseError(format!("Failed to unpack mint: {}", e)))?;
    state
        .get_variable_len_extension::<TokenMetadata>()
        .map_err(|e| CoreError::NotFound(format!("Token metadata extension: {}", e)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{AdvancedOptions, SocialLinks};
    use solana_program::program_pack::Pack;
    use spl_token_2022::extension::{BaseStateWithExtensionsMut, StateWithExtensionsMut};

    pub(crate) fn test_config(name: &str, symbol: &str) -> TokenConfig {
        TokenConfig {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals: 6,
            supply: 10,
            description: None,
            advanced: AdvancedOptions::None,
            social: SocialLinks::None,
        }
    }

    /// Lay out a mint account the way the token program leaves it after the
    /// five creation instructions have run.
    pub(crate) fn initialized_mint_account(
        metadata: &TokenMetadata,
        decimals: u8,
        authority: &Pubkey,
        pointer_address: &Pubkey,
    ) -> Vec<u8> {
        let sizing = size_mint_for(metadata).unwrap();
        let mut data = vec![0u8; sizing.mint_len];
        {
            let mut state = StateWithExtensionsMut::<Mint>::unpack_uninitialized(&mut data).unwrap();
            let pointer = state.init_extension::<MetadataPointer>(true).unwrap();
            pointer.authority = OptionalNonZeroPubkey::try_from(Some(*authority)).unwrap();
            pointer.metadata_address = OptionalNonZeroPubkey::try_from(Some(*pointer_address)).unwrap();
            state.base = Mint {
                mint_authority: COption::Some(*authority),
                supply: 0,
                decimals,
                is_initialized: true,
                freeze_authority: COption::None,
            };
            state.pack_base();
            state.init_account_type().unwrap();
        }
        let new_len = sizing.rent_space();
        data.resize(new_len, 0);
        let mut state = StateWithExtensionsMut::<Mint>::unpack(&mut data).unwrap();
        state.init_variable_len_extension(metadata, false).unwrap();
        data
    }

    #[test]
    fn record_uses_configured_constants() {
        let mint = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let record = build_metadata_record(&test_config("Test", "TST"), &mint, &authority, &Settings::default()).unwrap();
        assert_eq!(record.name, "Test");
        assert_eq!(record.symbol, "TST");
        assert_eq!(record.uri, crate::settings::DEFAULT_METADATA_URI);
        assert_eq!(
            record.additional_metadata,
            vec![("description".to_string(), "Only Possible On Solana".to_string())]
        );
        assert_eq!(Option::<Pubkey>::from(record.update_authority), Some(authority));
    }

    #[test]
    fn description_replaces_fixed_value() {
        let mut config = test_config("Test", "TST");
        config.description = Some("community token".to_string());
        let record = build_metadata_record(&config, &Pubkey::new_unique(), &Pubkey::new_unique(), &Settings::default()).unwrap();
        assert_eq!(record.additional_metadata[0].1, "community token");
    }

    #[test]
    fn sizing_adds_header_to_packed_len() {
        let record = build_metadata_record(
            &test_config("Test", "TST"),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Settings::default(),
        )
        .unwrap();
        let sizing = size_mint_for(&record).unwrap();
        assert!(sizing.mint_len > Mint::LEN);
        assert_eq!(sizing.metadata_len, borsh::to_vec(&record).unwrap().len());
        assert_eq!(sizing.rent_space(), sizing.mint_len + 4 + sizing.metadata_len);
    }

    #[test]
    fn oversized_metadata_is_rejected() {
        let long_name = "N".repeat(MAX_METADATA_TLV_LEN);
        let record = build_metadata_record(
            &test_config(&long_name, "TST"),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Settings::default(),
        )
        .unwrap();
        match size_mint_for(&record) {
            Err(CoreError::MetadataTooLarge { size, limit }) => {
                assert!(size > limit);
                assert_eq!(limit, MAX_METADATA_TLV_LEN);
            }
            other => panic!("expected MetadataTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn decodes_initialized_mint_and_metadata() {
        let mint = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let record = build_metadata_record(&test_config("Test", "TST"), &mint, &authority, &Settings::default()).unwrap();
        let data = initialized_mint_account(&record, 6, &authority, &mint);

        let summary = decode_mint_account(&mint, &data).unwrap();
        assert_eq!(summary.decimals, 6);
        assert_eq!(summary.mint_authority, Some(authority.to_string()));
        assert_eq!(summary.freeze_authority, None);
        let pointer = summary.metadata_pointer.unwrap();
        assert_eq!(pointer.metadata_address, Some(mint.to_string()));

        let decoded = decode_token_metadata(&data).unwrap();
        assert_eq!(decoded.name, "Test");
        assert_eq!(decoded.symbol, "TST");
        assert_eq!(MetadataSummary::from(&decoded).mint, mint.to_string());
    }

    #[test]
    fn garbage_account_data_fails_to_decode() {
        assert!(decode_mint_account(&Pubkey::new_unique(), &[1, 2, 3]).is_err());
        assert!(decode_token_metadata(&[0u8; 10]).is_err());
    }
}
