// In-memory ledger and wallet used by the async tests

use crate::connection::{ConnectionResult, LedgerConnection};
use crate::error::CoreError;
use crate::assembler::tests::pointer_initialize_args;
use crate::metadata::tests::initialized_mint_account;
use crate::wallet::{WalletHandle, WalletResult};
use async_trait::async_trait;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::rent::Rent;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::Transaction;
use spl_pod::optional_keys::OptionalNonZeroPubkey;
use spl_token_2022::instruction::TokenInstruction;
use spl_token_metadata_interface::instruction::TokenMetadataInstruction;
use spl_token_metadata_interface::state::{Field, TokenMetadata};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCall {
    Rent(usize),
    Blockhash,
    GetAccount(Pubkey),
    Send,
}

pub struct FakeLedger {
    blockhash: Hash,
    calls: RefCell<Vec<LedgerCall>>,
    accounts: RefCell<HashMap<Pubkey, Vec<u8>>>,
    submitted: RefCell<Vec<Transaction>>,
    send_error: RefCell<Option<Box<dyn Fn() -> CoreError>>>,
    keep_accounts: Cell<bool>,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self {
            blockhash: Hash::new_unique(),
            calls: RefCell::new(Vec::new()),
            accounts: RefCell::new(HashMap::new()),
            submitted: RefCell::new(Vec::new()),
            send_error: RefCell::new(None),
            keep_accounts: Cell::new(true),
        }
    }

    pub fn fail_sends_with(&self, make: impl Fn() -> CoreError + 'static) {
        *self.send_error.borrow_mut() = Some(Box::new(make));
    }

    /// Confirm transactions but never expose the created accounts.
    pub fn drop_landed_accounts(&self) {
        self.keep_accounts.set(false);
    }

    pub fn calls(&self) -> Vec<LedgerCall> {
        self.calls.borrow().clone()
    }

    pub fn rent_quotes(&self) -> Vec<usize> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                LedgerCall::Rent(size) => Some(*size),
                _ => None,
            })
            .collect()
    }

    pub fn submitted(&self) -> Vec<Transaction> {
        self.submitted.borrow().clone()
    }

    /// Replay the creation batch the way the token program would leave the mint.
    /// Metadata can only be initialized in the account the pointer names.
    fn apply(&self, tx: &Transaction) -> ConnectionResult<()> {
        let keys = &tx.message.account_keys;
        let mut mint = None;
        let mut authority = None;
        let mut pointer_address = None;
        let mut decimals = 0u8;
        let mut metadata = TokenMetadata::default();

        for ix in &tx.message.instructions {
            let account = |i: usize| keys[ix.accounts[i] as usize];
            if let Ok(parsed) = TokenMetadataInstruction::unpack(&ix.data) {
                match parsed {
                    TokenMetadataInstruction::Initialize(init) => {
                        metadata.name = init.name;
                        metadata.symbol = init.symbol;
                        metadata.uri = init.uri;
                        metadata.mint = account(2);
                        metadata.update_authority = OptionalNonZeroPubkey::try_from(Some(account(1))).unwrap();
                        if pointer_address != Some(account(0)) {
                            return Err(CoreError::Program(
                                "metadata pointer does not reference the metadata account".to_string(),
                            ));
                        }
                    }
                    TokenMetadataInstruction::UpdateField(update) => {
                        if let Field::Key(key) = update.field {
                            metadata.additional_metadata.push((key, update.value));
                        }
                    }
                    _ => {}
                }
                continue;
            }
            match TokenInstruction::unpack(&ix.data) {
                Ok(TokenInstruction::MetadataPointerExtension) => {
                    pointer_address = pointer_initialize_args(&ix.data).1;
                }
                Ok(TokenInstruction::InitializeMint { decimals: d, mint_authority, .. }) => {
                    decimals = d;
                    authority = Some(mint_authority);
                    mint = Some(account(0));
                }
                _ => {}
            }
        }

        if let (Some(mint), Some(authority), Some(pointer)) = (mint, authority, pointer_address) {
            if self.keep_accounts.get() {
                let data = initialized_mint_account(&metadata, decimals, &authority, &pointer);
                self.accounts.borrow_mut().insert(mint, data);
            }
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl LedgerConnection for FakeLedger {
    async fn get_minimum_balance_for_rent_exemption(&self, size: usize) -> ConnectionResult<u64> {
        self.calls.borrow_mut().push(LedgerCall::Rent(size));
        Ok(Rent::default().minimum_balance(size))
    }

    async fn get_latest_blockhash(&self) -> ConnectionResult<Hash> {
        self.calls.borrow_mut().push(LedgerCall::Blockhash);
        Ok(self.blockhash)
    }

    async fn get_account_data(&self, pubkey: &Pubkey) -> ConnectionResult<Option<Vec<u8>>> {
        self.calls.borrow_mut().push(LedgerCall::GetAccount(*pubkey));
        Ok(self.accounts.borrow().get(pubkey).cloned())
    }

    async fn send_and_confirm_transaction(&self, transaction: &Transaction) -> ConnectionResult<Signature> {
        self.calls.borrow_mut().push(LedgerCall::Send);
        if let Some(make) = self.send_error.borrow().as_ref() {
            return Err(make());
        }
        transaction
            .verify()
            .map_err(|e| CoreError::from_transaction_error(&e))?;
        if transaction.message.recent_blockhash != self.blockhash {
            return Err(CoreError::Timeout("blockhash not found".to_string()));
        }
        self.apply(transaction)?;
        self.submitted.borrow_mut().push(transaction.clone());
        Ok(transaction.signatures[0])
    }

    fn endpoint(&self) -> &str {
        "memory://ledger"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendBehaviour {
    Land,
    Reject,
}

pub struct FakeWallet {
    keypair: Option<Keypair>,
    behaviour: SendBehaviour,
    send_attempts: Cell<usize>,
    last_mint: Cell<Option<Pubkey>>,
}

impl FakeWallet {
    pub fn connected(behaviour: SendBehaviour) -> Self {
        Self::from_keypair(Some(Keypair::new()), behaviour)
    }

    pub fn disconnected() -> Self {
        Self::from_keypair(None, SendBehaviour::Land)
    }

    pub fn with_keypair(bytes: Vec<u8>, behaviour: SendBehaviour) -> Self {
        Self::from_keypair(Some(Keypair::try_from(bytes.as_slice()).unwrap()), behaviour)
    }

    fn from_keypair(keypair: Option<Keypair>, behaviour: SendBehaviour) -> Self {
        Self {
            keypair,
            behaviour,
            send_attempts: Cell::new(0),
            last_mint: Cell::new(None),
        }
    }

    pub fn key(&self) -> Pubkey {
        self.keypair.as_ref().unwrap().pubkey()
    }

    pub fn keypair_bytes(&self) -> Vec<u8> {
        self.keypair.as_ref().unwrap().to_bytes().to_vec()
    }

    pub fn send_attempts(&self) -> usize {
        self.send_attempts.get()
    }

    pub fn last_mint(&self) -> Option<Pubkey> {
        self.last_mint.get()
    }
}

#[async_trait(?Send)]
impl WalletHandle for FakeWallet {
    fn public_key(&self) -> Option<Pubkey> {
        self.keypair.as_ref().map(|k| k.pubkey())
    }

    async fn send_transaction(
        &self,
        mut transaction: Transaction,
        connection: &dyn LedgerConnection,
    ) -> WalletResult<Signature> {
        self.send_attempts.set(self.send_attempts.get() + 1);
        self.last_mint.set(transaction.message.account_keys.get(1).copied());
        let keypair = self.keypair.as_ref().ok_or(CoreError::WalletNotConnected)?;
        if self.behaviour == SendBehaviour::Reject {
            return Err(CoreError::WalletRejected("User rejected the request.".to_string()));
        }
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[keypair], blockhash)
            .map_err(|e| CoreError::WalletRejected(e.to_string()))?;
        connection.send_and_confirm_transaction(&transaction).await
    }
}
