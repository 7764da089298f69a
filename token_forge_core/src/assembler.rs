// Transaction assembler for Token-2022 mints with embedded metadata
// Pure instruction building; network access lives in create_service

use crate::error::CoreError;
use crate::metadata::{build_metadata_record, size_mint_for, MintSizing};
use crate::models::TokenConfig;
use crate::settings::Settings;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::packet::PACKET_DATA_SIZE;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::system_instruction;
use solana_sdk::system_program;
use solana_sdk::transaction::Transaction;
use spl_token_2022::extension::metadata_pointer;
use spl_token_2022::instruction::{initialize_mint, TokenInstruction};
use spl_token_metadata_interface::instruction::{self as metadata_ix, TokenMetadataInstruction};
use spl_token_metadata_interface::state::{Field, TokenMetadata};
use std::fmt;

pub type AssemblyResult<T> = Result<T, CoreError>;

pub const CREATE_TOKEN_INSTRUCTION_COUNT: usize = 5;

/// The five operations of a token creation, in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateTokenStep {
    CreateAccount,
    InitializeMetadataPointer,
    InitializeMint,
    InitializeMetadata,
    UpdateField,
}

impl CreateTokenStep {
    /// The pointer must exist before the mint is initialized.
    pub const ORDER: [CreateTokenStep; CREATE_TOKEN_INSTRUCTION_COUNT] = [
        CreateTokenStep::CreateAccount,
        CreateTokenStep::InitializeMetadataPointer,
        CreateTokenStep::InitializeMint,
        CreateTokenStep::InitializeMetadata,
        CreateTokenStep::UpdateField,
    ];

    /// Recognise which creation step an instruction encodes.
    pub fn identify(ix: &Instruction) -> Option<Self> {
        if ix.program_id == system_program::id() {
            return Some(CreateTokenStep::CreateAccount);
        }
        if ix.program_id != spl_token_2022::id() {
            return None;
        }
        // Interface instructions carry an 8-byte discriminator, so try them first
        match TokenMetadataInstruction::unpack(&ix.data) {
            Ok(TokenMetadataInstruction::Initialize(_)) => return Some(CreateTokenStep::InitializeMetadata),
            Ok(TokenMetadataInstruction::UpdateField(_)) => return Some(CreateTokenStep::UpdateField),
            Ok(_) => return None,
            Err(_) => {}
        }
        match TokenInstruction::unpack(&ix.data) {
            Ok(TokenInstruction::MetadataPointerExtension) => Some(CreateTokenStep::InitializeMetadataPointer),
            Ok(TokenInstruction::InitializeMint { .. }) => Some(CreateTokenStep::InitializeMint),
            _ => None,
        }
    }
}

impl fmt::Display for CreateTokenStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CreateTokenStep::CreateAccount => "create_account",
            CreateTokenStep::InitializeMetadataPointer => "initialize_metadata_pointer",
            CreateTokenStep::InitializeMint => "initialize_mint",
            CreateTokenStep::InitializeMetadata => "initialize_metadata",
            CreateTokenStep::UpdateField => "update_field",
        };
        f.write_str(s)
    }
}

/// Everything needed to build the creation batch except the rent figure.
#[derive(Debug, Clone, PartialEq)]
pub struct MintPlan {
    pub mint: Pubkey,
    /// Fee payer, mint authority, metadata update authority.
    pub authority: Pubkey,
    pub decimals: u8,
    pub metadata: TokenMetadata,
    pub sizing: MintSizing,
}

impl MintPlan {
    /// Derive the metadata record and size the mint; fails on oversized
    /// metadata without touching the network.
    pub fn prepare(
        config: &TokenConfig,
        authority: &Pubkey,
        mint: &Pubkey,
        settings: &Settings,
    ) -> AssemblyResult<Self> {
        let metadata = build_metadata_record(config, mint, authority, settings)?;
        let sizing = size_mint_for(&metadata)?;
        let plan = Self {
            mint: *mint,
            authority: *authority,
            decimals: config.decimals,
            metadata,
            sizing,
        };
        let wire_len = plan.transaction_len()?;
        if wire_len > PACKET_DATA_SIZE {
            return Err(CoreError::MetadataTooLarge {
                size: wire_len,
                limit: PACKET_DATA_SIZE,
            });
        }
        Ok(plan)
    }

    /// Serialized size of the signed creation transaction. Rent and blockhash
    /// are fixed-width, so placeholders give the exact figure.
    pub fn transaction_len(&self) -> AssemblyResult<usize> {
        let instructions = build_create_token_instructions(self, u64::MAX)?;
        let tx = Transaction::new_with_payer(&instructions, Some(&self.authority));
        bincode::serialized_size(&tx)
            .map(|len| len as usize)
            .map_err(|e| CoreError::ParseError(format!("Failed to size transaction: {}", e)))
    }

    /// Bytes to quote to `get_minimum_balance_for_rent_exemption`.
    pub fn rent_space(&self) -> usize {
        self.sizing.rent_space()
    }
}

/// Build the ordered five-instruction batch.
pub fn build_create_token_instructions(plan: &MintPlan, lamports: u64) -> AssemblyResult<Vec<Instruction>> {
    let token_program = spl_token_2022::id();
    let field = plan
        .metadata
        .additional_metadata
        .first()
        .cloned()
        .ok_or_else(|| CoreError::Validation("Metadata needs one additional field".to_string()))?;

    let create_account = system_instruction::create_account(
        &plan.authority,
        &plan.mint,
        lamports,
        plan.sizing.mint_len as u64,
        &token_program,
    );

    let init_pointer = metadata_pointer::instruction::initialize(
        &token_program,
        &plan.mint,
        Some(plan.authority),
        Some(plan.mint),
    )
    .map_err(|e| CoreError::Program(format!("Failed to build metadata pointer instruction: {}", e)))?;

    let init_mint = initialize_mint(&token_program, &plan.mint, &plan.authority, None, plan.decimals)
        .map_err(|e| CoreError::Program(format!("Failed to build initialize mint instruction: {}", e)))?;

    let init_metadata = metadata_ix::initialize(
        &token_program,
        &plan.mint,
        &plan.authority,
        &plan.mint,
        &plan.authority,
        plan.metadata.name.clone(),
        plan.metadata.symbol.clone(),
        plan.metadata.uri.clone(),
    );

    let update_field = metadata_ix::update_field(
        &token_program,
        &plan.mint,
        &plan.authority,
        Field::Key(field.0),
        field.1,
    );

    let instructions = vec![create_account, init_pointer, init_mint, init_metadata, update_field];
    for (idx, ix) in instructions.iter().enumerate() {
        log::debug!(
            "create-token ix {}: {} ({} accounts, {} data bytes)",
            idx,
            CreateTokenStep::identify(ix).map(|s| s.to_string()).unwrap_or_else(|| "unknown".to_string()),
            ix.accounts.len(),
            ix.data.len()
        );
    }
    Ok(instructions)
}

/// Wrap the batch in one transaction paid by `payer` and add the mint's
/// signature. The wallet signature is added later by the `WalletHandle`.
pub fn build_create_token_transaction(
    instructions: &[Instruction],
    payer: &Pubkey,
    mint_keypair: &Keypair,
    recent_blockhash: Hash,
) -> AssemblyResult<Transaction> {
    let mut tx = Transaction::new_with_payer(instructions, Some(payer));
    tx.try_partial_sign(&[mint_keypair], recent_blockhash)
        .map_err(|e| CoreError::Validation(format!("Mint keypair failed to sign: {}", e)))?;
    Ok(tx)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::metadata::tests::test_config;
    use solana_sdk::signature::Signer;
    use spl_token_2022::extension::metadata_pointer::instruction::InitializeInstructionData;

    /// Authority and metadata address carried by a metadata pointer initialize.
    pub(crate) fn pointer_initialize_args(ix_data: &[u8]) -> (Option<Pubkey>, Option<Pubkey>) {
        // token instruction tag, then the pointer sub-instruction tag
        let args = spl_pod::bytemuck::pod_from_bytes::<InitializeInstructionData>(&ix_data[2..]).unwrap();
        (Option::<Pubkey>::from(args.authority), Option::<Pubkey>::from(args.metadata_address))
    }

    fn plan() -> MintPlan {
        MintPlan::prepare(
            &test_config("Test", "TST"),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Settings::default(),
        )
        .unwrap()
    }

    #[test]
    fn builds_five_instructions_in_order() {
        let plan = plan();
        let ixs = build_create_token_instructions(&plan, 4_000_000).unwrap();
        assert_eq!(ixs.len(), CREATE_TOKEN_INSTRUCTION_COUNT);
        let steps: Vec<_> = ixs.iter().map(|ix| CreateTokenStep::identify(ix).unwrap()).collect();
        assert_eq!(steps, CreateTokenStep::ORDER.to_vec());
    }

    #[test]
    fn pointer_precedes_mint_initialization() {
        let ixs = build_create_token_instructions(&plan(), 1).unwrap();
        let pos = |step| ixs.iter().position(|ix| CreateTokenStep::identify(ix) == Some(step)).unwrap();
        assert!(pos(CreateTokenStep::InitializeMetadataPointer) < pos(CreateTokenStep::InitializeMint));
    }

    #[test]
    fn create_account_funds_rent_and_allocates_mint_len() {
        let plan = plan();
        let ixs = build_create_token_instructions(&plan, 123_456).unwrap();
        let create = &ixs[0];
        assert_eq!(create.accounts[0].pubkey, plan.authority);
        assert!(create.accounts[0].is_signer);
        assert_eq!(create.accounts[1].pubkey, plan.mint);
        assert!(create.accounts[1].is_signer);
        // SystemInstruction::CreateAccount { lamports, space, owner }
        assert_eq!(&create.data[4..12], &123_456u64.to_le_bytes());
        assert_eq!(&create.data[12..20], &(plan.sizing.mint_len as u64).to_le_bytes());
        assert_eq!(&create.data[20..52], spl_token_2022::id().as_ref());
    }

    #[test]
    fn mint_has_no_freeze_authority() {
        let plan = plan();
        let ixs = build_create_token_instructions(&plan, 1).unwrap();
        match TokenInstruction::unpack(&ixs[2].data).unwrap() {
            TokenInstruction::InitializeMint { decimals, mint_authority, freeze_authority } => {
                assert_eq!(decimals, 6);
                assert_eq!(mint_authority, plan.authority);
                assert!(freeze_authority.is_none());
            }
            other => panic!("unexpected instruction {:?}", other),
        }
    }

    #[test]
    fn metadata_instructions_carry_form_values() {
        let plan = plan();
        let ixs = build_create_token_instructions(&plan, 1).unwrap();
        match TokenMetadataInstruction::unpack(&ixs[3].data).unwrap() {
            TokenMetadataInstruction::Initialize(init) => {
                assert_eq!(init.name, "Test");
                assert_eq!(init.symbol, "TST");
                assert_eq!(init.uri, plan.metadata.uri);
            }
            other => panic!("unexpected instruction {:?}", other),
        }
        match TokenMetadataInstruction::unpack(&ixs[4].data).unwrap() {
            TokenMetadataInstruction::UpdateField(update) => {
                assert_eq!(update.field, Field::Key("description".to_string()));
                assert_eq!(update.value, "Only Possible On Solana");
            }
            other => panic!("unexpected instruction {:?}", other),
        }
    }

    #[test]
    fn transaction_is_partially_signed_by_mint() {
        let mint = Keypair::new();
        let payer = Pubkey::new_unique();
        let plan = MintPlan::prepare(&test_config("Test", "TST"), &payer, &mint.pubkey(), &Settings::default()).unwrap();
        let ixs = build_create_token_instructions(&plan, 1).unwrap();
        let tx = build_create_token_transaction(&ixs, &payer, &mint, Hash::new_unique()).unwrap();
        assert_eq!(tx.message.account_keys[0], payer);
        assert_eq!(tx.message.header.num_required_signatures, 2);
        assert!(!tx.is_signed());
        let mint_pos = tx.message.account_keys.iter().position(|k| *k == mint.pubkey()).unwrap();
        assert_ne!(tx.signatures[mint_pos], solana_sdk::signature::Signature::default());
    }

    #[test]
    fn metadata_pointer_targets_the_mint() {
        let plan = plan();
        let ixs = build_create_token_instructions(&plan, 1).unwrap();
        assert_eq!(CreateTokenStep::identify(&ixs[1]), Some(CreateTokenStep::InitializeMetadataPointer));
        let (authority, metadata_address) = pointer_initialize_args(&ixs[1].data);
        assert_eq!(metadata_address, Some(plan.mint));
        assert_eq!(authority, Some(plan.authority));
    }

    #[test]
    fn example_transaction_fits_in_a_packet() {
        let mint = Keypair::new();
        let payer = Pubkey::new_unique();
        let plan = MintPlan::prepare(&test_config("Test", "TST"), &payer, &mint.pubkey(), &Settings::default()).unwrap();
        let ixs = build_create_token_instructions(&plan, 1_461_600).unwrap();
        let tx = build_create_token_transaction(&ixs, &payer, &mint, Hash::new_unique()).unwrap();
        let wire = bincode::serialize(&tx).unwrap();
        assert_eq!(wire.len(), plan.transaction_len().unwrap());
        assert!(wire.len() <= PACKET_DATA_SIZE);
    }

    #[test]
    fn name_too_long_for_one_transaction_is_rejected() {
        let long_name = "N".repeat(2000);
        let err = MintPlan::prepare(
            &test_config(&long_name, "TST"),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Settings::default(),
        )
        .unwrap_err();
        assert_eq!(err.category(), crate::error::ErrorCategory::Input);
        match err {
            CoreError::MetadataTooLarge { size, limit } => {
                assert_eq!(limit, PACKET_DATA_SIZE);
                assert!(size > 2000);
            }
            other => panic!("expected MetadataTooLarge, got {:?}", other),
        }
    }
}
