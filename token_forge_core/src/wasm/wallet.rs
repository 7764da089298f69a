// Browser wallet bridge
// The page supplies a wallet object (Phantom/Solflare style) whose `signTransaction`
// takes serialized transaction bytes and resolves to the signed bytes.

use crate::connection::LedgerConnection;
use crate::error::CoreError;
use crate::wallet::{check_signed_transaction, WalletHandle, WalletResult};
use async_trait::async_trait;
use js_sys::{Function, Promise, Reflect, Uint8Array};
use log::{debug, info};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use std::str::FromStr;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

pub struct BrowserWallet {
    public_key: Option<Pubkey>,
    sign_fn: Function,
}

impl BrowserWallet {
    pub fn new(public_key: Option<Pubkey>, sign_fn: Function) -> Self {
        Self { public_key, sign_fn }
    }

    /// Build from the wallet adapter's base58 key; an empty key means disconnected.
    pub fn from_base58(public_key: &str, sign_fn: Function) -> Result<Self, CoreError> {
        let key = public_key.trim();
        let public_key = if key.is_empty() {
            None
        } else {
            Some(
                Pubkey::from_str(key)
                    .map_err(|e| CoreError::InvalidInput(format!("Invalid wallet public key {}: {}", key, e)))?,
            )
        };
        Ok(Self::new(public_key, sign_fn))
    }

    /// Read `publicKey` and `signTransaction` off a page-side wallet object.
    /// `publicKey` may be a base58 string or anything whose `toString()` is one.
    pub fn from_js_object(wallet: &JsValue) -> Result<Self, CoreError> {
        let sign = Reflect::get(wallet, &JsValue::from_str("signTransaction"))
            .map_err(|e| CoreError::InvalidInput(format!("Wallet object unreadable: {}", js_error_message(&e))))?;
        let sign_fn: Function = sign
            .dyn_into()
            .map_err(|_| CoreError::InvalidInput("Wallet object has no signTransaction function".to_string()))?;

        let key = Reflect::get(wallet, &JsValue::from_str("publicKey")).unwrap_or(JsValue::NULL);
        let key = if key.is_null() || key.is_undefined() {
            String::new()
        } else if let Some(s) = key.as_string() {
            s
        } else {
            String::from(js_sys::Object::from(key).to_string())
        };
        Self::from_base58(&key, sign_fn)
    }

    async fn sign(&self, transaction: &Transaction) -> WalletResult<Transaction> {
        let bytes = bincode::serialize(transaction)
            .map_err(|e| CoreError::ParseError(format!("Failed to serialize transaction: {}", e)))?;
        let array = Uint8Array::from(bytes.as_slice());

        let returned = self
            .sign_fn
            .call1(&JsValue::NULL, &array)
            .map_err(|e| CoreError::WalletRejected(js_error_message(&e)))?;
        let signed = match returned.dyn_into::<Promise>() {
            Ok(promise) => JsFuture::from(promise)
                .await
                .map_err(|e| CoreError::WalletRejected(js_error_message(&e)))?,
            Err(value) => value,
        };

        let signed_bytes = Uint8Array::new(&signed).to_vec();
        bincode::deserialize(&signed_bytes)
            .map_err(|e| CoreError::ParseError(format!("Wallet returned an unreadable transaction: {}", e)))
    }
}

fn js_error_message(value: &JsValue) -> String {
    if let Some(message) = value.as_string() {
        return message;
    }
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .unwrap_or_else(|| format!("{:?}", value))
}

#[async_trait(?Send)]
impl WalletHandle for BrowserWallet {
    fn public_key(&self) -> Option<Pubkey> {
        self.public_key
    }

    async fn send_transaction(
        &self,
        transaction: Transaction,
        connection: &dyn LedgerConnection,
    ) -> WalletResult<Signature> {
        if self.public_key.is_none() {
            return Err(CoreError::WalletNotConnected);
        }
        debug!("Requesting browser wallet signature");
        let signed = self.sign(&transaction).await?;
        check_signed_transaction(&transaction, &signed)?;
        let signature = connection.send_and_confirm_transaction(&signed).await?;
        info!("Browser wallet transaction confirmed: {}", signature);
        Ok(signature)
    }
}
