// WASM ledger connection using the browser fetch API
use crate::connection::{ConnectionResult, LedgerConnection};
use crate::error::CoreError;
use crate::settings::Settings;
use crate::wasm::utils::sleep_ms;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as Base64Engine, Engine as _};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{Transaction, TransactionError};
use std::cell::Cell;
use std::str::FromStr;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

const STATUS_POLL_INTERVAL_MS: u32 = 500;

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize, Debug)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize, Debug)]
struct RpcErrorBody {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

pub struct WasmLedgerConnection {
    http_endpoint: String,
    commitment: String,
    confirm_timeout_ms: f64,
    request_id: Cell<u64>,
}

impl WasmLedgerConnection {
    pub fn new(endpoint: String, commitment: String, confirm_timeout_ms: u64) -> Self {
        Self {
            http_endpoint: endpoint,
            commitment,
            confirm_timeout_ms: confirm_timeout_ms as f64,
            request_id: Cell::new(1),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.rpc_url.clone(),
            settings.commitment.clone(),
            settings.confirm_timeout_ms(),
        )
    }

    fn next_id(&self) -> u64 {
        let id = self.request_id.get() + 1;
        self.request_id.set(id);
        id
    }

    async fn call(&self, method: &str, params: Value) -> ConnectionResult<Value> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id(),
            method,
            params,
        };
        let body = serde_json::to_string(&request)?;

        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(RequestMode::Cors);
        opts.set_body(&JsValue::from_str(&body));

        let req = Request::new_with_str_and_init(&self.http_endpoint, &opts)
            .map_err(|e| CoreError::Network(format!("Failed to create request: {:?}", e)))?;
        req.headers()
            .set("Content-Type", "application/json")
            .map_err(|e| CoreError::Network(format!("Failed to set headers: {:?}", e)))?;

        let window = web_sys::window().ok_or_else(|| CoreError::Network("No window object available".to_string()))?;
        let resp_value = JsFuture::from(window.fetch_with_request(&req))
            .await
            .map_err(|e| CoreError::Network(format!("{} fetch failed: {:?}", method, e)))?;
        let resp: Response = resp_value
            .dyn_into()
            .map_err(|_| CoreError::Network("Failed to cast response".to_string()))?;
        if !resp.ok() {
            return Err(CoreError::Network(format!("{} HTTP error: {}", method, resp.status())));
        }

        let json_promise = resp
            .json()
            .map_err(|e| CoreError::Network(format!("Failed to read body: {:?}", e)))?;
        let json = JsFuture::from(json_promise)
            .await
            .map_err(|e| CoreError::Network(format!("Failed to read body: {:?}", e)))?;
        let response: RpcResponse = serde_wasm_bindgen::from_value(json)
            .map_err(|e| CoreError::ParseError(format!("Deserialization error: {:?}", e)))?;

        if let Some(error) = response.error {
            return Err(rpc_error_to_core(method, error));
        }
        response
            .result
            .ok_or_else(|| CoreError::Rpc(format!("{}: no result in response", method)))
    }

    /// Poll signature status until it reaches the configured commitment.
    async fn confirm(&self, signature: &Signature) -> ConnectionResult<()> {
        let start = js_sys::Date::now();
        loop {
            let result = self
                .call("getSignatureStatuses", json!([[signature.to_string()]]))
                .await?;
            if let Some(status) = result["value"].get(0).filter(|s| !s.is_null()) {
                if !status["err"].is_null() {
                    return Err(transaction_error_from_json(&status["err"]));
                }
                let reached = status["confirmationStatus"].as_str().unwrap_or("processed");
                if commitment_reached(reached, &self.commitment) {
                    return Ok(());
                }
            }
            if js_sys::Date::now() - start > self.confirm_timeout_ms {
                return Err(CoreError::Timeout(format!(
                    "Transaction {} not {} after {} ms",
                    signature, self.commitment, self.confirm_timeout_ms
                )));
            }
            sleep_ms(STATUS_POLL_INTERVAL_MS)
                .await
                .map_err(|e| CoreError::Network(format!("setTimeout failed: {:?}", e)))?;
        }
    }
}

fn commitment_rank(level: &str) -> u8 {
    match level {
        "finalized" => 2,
        "confirmed" => 1,
        _ => 0,
    }
}

fn commitment_reached(reached: &str, wanted: &str) -> bool {
    commitment_rank(reached) >= commitment_rank(wanted)
}

fn transaction_error_from_json(err: &Value) -> CoreError {
    match serde_json::from_value::<TransactionError>(err.clone()) {
        Ok(tx_err) => CoreError::from_transaction_error(&tx_err),
        Err(_) => CoreError::Program(err.to_string()),
    }
}

fn rpc_error_to_core(method: &str, error: RpcErrorBody) -> CoreError {
    // Preflight failures carry the simulated TransactionError under data.err
    if let Some(err) = error.data.as_ref().and_then(|d| d.get("err")).filter(|e| !e.is_null()) {
        return transaction_error_from_json(err);
    }
    CoreError::Rpc(format!("{} RPC error {}: {}", method, error.code, error.message))
}

#[async_trait(?Send)]
impl LedgerConnection for WasmLedgerConnection {
    async fn get_minimum_balance_for_rent_exemption(&self, size: usize) -> ConnectionResult<u64> {
        debug!("WASM RPC: getMinimumBalanceForRentExemption({})", size);
        let result = self
            .call("getMinimumBalanceForRentExemption", json!([size, { "commitment": self.commitment }]))
            .await?;
        result
            .as_u64()
            .ok_or_else(|| CoreError::ParseError("Invalid rent exemption response".to_string()))
    }

    async fn get_latest_blockhash(&self) -> ConnectionResult<Hash> {
        debug!("WASM RPC: getLatestBlockhash");
        let result = self
            .call("getLatestBlockhash", json!([{ "commitment": self.commitment }]))
            .await?;
        let blockhash = result["value"]["blockhash"]
            .as_str()
            .ok_or_else(|| CoreError::ParseError("Invalid blockhash response".to_string()))?;
        Hash::from_str(blockhash).map_err(|e| CoreError::ParseError(format!("Invalid blockhash: {}", e)))
    }

    async fn get_account_data(&self, pubkey: &Pubkey) -> ConnectionResult<Option<Vec<u8>>> {
        debug!("WASM RPC: getAccountInfo for {}", pubkey);
        let result = self
            .call(
                "getAccountInfo",
                json!([pubkey.to_string(), { "encoding": "base64", "commitment": self.commitment }]),
            )
            .await?;
        let value = &result["value"];
        if value.is_null() {
            return Ok(None);
        }
        let data = value["data"][0]
            .as_str()
            .ok_or_else(|| CoreError::ParseError("No data field in account info".to_string()))?;
        Base64Engine
            .decode(data)
            .map(Some)
            .map_err(|e| CoreError::ParseError(format!("Failed to decode base64 account data: {}", e)))
    }

    async fn send_and_confirm_transaction(&self, transaction: &Transaction) -> ConnectionResult<Signature> {
        debug!("WASM RPC: sendTransaction");
        let bytes = bincode::serialize(transaction)
            .map_err(|e| CoreError::ParseError(format!("Failed to serialize transaction: {}", e)))?;
        let params = json!([
            Base64Engine.encode(bytes),
            {
                "encoding": "base64",
                "skipPreflight": false,
                "preflightCommitment": self.commitment
            }
        ]);
        let result = self.call("sendTransaction", params).await?;
        let signature = result
            .as_str()
            .ok_or_else(|| CoreError::ParseError("Invalid sendTransaction response".to_string()))
            .and_then(|s| {
                Signature::from_str(s).map_err(|e| CoreError::ParseError(format!("Invalid signature: {}", e)))
            })?;
        self.confirm(&signature).await?;
        Ok(signature)
    }

    fn endpoint(&self) -> &str {
        &self.http_endpoint
    }
}
