// Token Forge WASM Bindings
// Browser-side form state and submit flow; the page's JS layer owns the wallet

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use token_forge_core::{CoreError, CreationOutcome, FormState, Settings, SubmissionTracker};
use token_forge_core::models::OffchainTokenMetadata;
use wasm_bindgen::prelude::*;

const MAX_LOG_ENTRIES: usize = 200;

// Initialize panic hook and logger for WASM
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

#[wasm_bindgen]
pub struct TokenCreatorApp {
    state: Arc<Mutex<AppState>>,
    tracker: SubmissionTracker,
}

struct AppState {
    form: FormState,
    settings: Settings,
    logs: Vec<LogEntry>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub message: String,
    pub details: Option<String>,
}

/// Shape of every error handed back to the page.
#[derive(Serialize, Debug)]
struct JsError<'a> {
    category: token_forge_core::ErrorCategory,
    message: String,
    detail: &'a str,
}

fn to_js_error(err: &CoreError) -> JsValue {
    let detail = err.to_string();
    let body = JsError {
        category: err.category(),
        message: err.user_message(),
        detail: &detail,
    };
    match serde_json::to_string(&body) {
        Ok(json) => JsValue::from_str(&json),
        Err(_) => JsValue::from_str(&detail),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| to_js_error(&CoreError::from(e)))
}

impl AppState {
    fn push_log(&mut self, level: &str, message: impl Into<String>, details: Option<String>) {
        self.logs.push(LogEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            level: level.to_string(),
            message: message.into(),
            details,
        });
        if self.logs.len() > MAX_LOG_ENTRIES {
            let excess = self.logs.len() - MAX_LOG_ENTRIES;
            self.logs.drain(0..excess);
        }
    }
}

impl Default for TokenCreatorApp {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl TokenCreatorApp {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        let state = AppState {
            form: FormState::new(),
            settings: Settings::default(),
            logs: Vec::new(),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            tracker: SubmissionTracker::new(),
        }
    }

    /// Replace one form field by its input name (e.g. `name`, `creatorWebsite`).
    #[wasm_bindgen]
    pub fn set_field(&self, field: &str, value: &str) -> Result<(), JsValue> {
        self.lock()
            .form
            .set_field_by_name(field, value)
            .map_err(|e| to_js_error(&e))
    }

    /// Current field values and toggles as JSON
    #[wasm_bindgen]
    pub fn get_form(&self) -> Result<String, JsValue> {
        to_json(&self.lock().form)
    }

    #[wasm_bindgen]
    pub fn toggle_advanced(&self) -> bool {
        self.lock().form.toggle_advanced()
    }

    #[wasm_bindgen]
    pub fn toggle_social_links(&self) -> bool {
        self.lock().form.toggle_social_links()
    }

    #[wasm_bindgen]
    pub fn toggle_modify_creator(&self) -> bool {
        self.lock().form.toggle_modify_creator()
    }

    /// Validated token configuration as JSON, or the first input error.
    #[wasm_bindgen]
    pub fn validate(&self) -> Result<String, JsValue> {
        let config = self.lock().form.validate().map_err(|e| to_js_error(&e))?;
        to_json(&config)
    }

    /// Off-chain metadata document for the current form, ready for upload.
    #[wasm_bindgen]
    pub fn offchain_metadata_json(&self, image: Option<String>) -> Result<String, JsValue> {
        let config = self.lock().form.validate().map_err(|e| to_js_error(&e))?;
        OffchainTokenMetadata::from_config(&config, image)
            .to_json_pretty()
            .map_err(|e| to_js_error(&CoreError::from(e)))
    }

    /// Update settings (refused while a submission is pending)
    #[wasm_bindgen]
    pub fn update_settings(&self, settings_json: &str) -> Result<(), JsValue> {
        if self.tracker.is_pending() {
            return Err(to_js_error(&CoreError::SubmissionInFlight));
        }
        let settings: Settings = serde_json::from_str(settings_json)
            .map_err(|e| to_js_error(&CoreError::InvalidInput(format!("Failed to parse settings: {}", e))))?;
        settings.validate().map_err(|e| to_js_error(&e))?;

        let mut state = self.lock();
        state.push_log("info", "Settings updated", Some(format!("RPC: {}", settings.rpc_url)));
        state.settings = settings;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn get_settings(&self) -> Result<String, JsValue> {
        to_json(&self.lock().settings)
    }

    #[wasm_bindgen]
    pub fn is_pending(&self) -> bool {
        self.tracker.is_pending()
    }

    /// Submission status as JSON (`state` is idle, pending, succeeded or failed)
    #[wasm_bindgen]
    pub fn get_status(&self) -> Result<String, JsValue> {
        to_json(&self.tracker.status())
    }

    #[wasm_bindgen]
    pub fn get_logs(&self) -> Result<String, JsValue> {
        to_json(&self.lock().logs)
    }

    #[wasm_bindgen]
    pub fn clear_logs(&self) {
        self.lock().logs.clear();
    }

    /// Validate the form and create the token through the page's wallet.
    /// `wallet` is an object with `publicKey` and `signTransaction(bytes)`.
    /// Resolves to the creation outcome as JSON.
    #[cfg(target_arch = "wasm32")]
    #[wasm_bindgen]
    pub async fn submit(&self, wallet: JsValue) -> Result<String, JsValue> {
        use token_forge_core::wasm::{BrowserWallet, WasmLedgerConnection};
        use token_forge_core::CreateTokenService;

        let wallet = BrowserWallet::from_js_object(&wallet).map_err(|e| to_js_error(&e))?;
        let (form, settings) = {
            let mut state = self.lock();
            state.push_log("info", "Submitting token creation", Some(format!("RPC: {}", state.settings.rpc_url)));
            (state.form.clone(), state.settings.clone())
        };
        let connection = WasmLedgerConnection::from_settings(&settings);

        let result = CreateTokenService::submit_form(&form, &self.tracker, &connection, &wallet, &settings).await;
        let outcome = self.record_result(result).map_err(|e| to_js_error(&e))?;
        to_json(&outcome)
    }

    /// Fetch a blockhash to check the configured RPC endpoint
    #[cfg(target_arch = "wasm32")]
    #[wasm_bindgen]
    pub async fn test_rpc_connection(&self) -> Result<String, JsValue> {
        use token_forge_core::wasm::WasmLedgerConnection;
        use token_forge_core::LedgerConnection;

        let settings = self.lock().settings.clone();
        let connection = WasmLedgerConnection::from_settings(&settings);
        let blockhash = connection.get_latest_blockhash().await.map_err(|e| to_js_error(&e))?;
        Ok(format!("Connected! Latest blockhash: {}", blockhash))
    }
}

impl TokenCreatorApp {
    fn lock(&self) -> MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record_result(&self, result: Result<CreationOutcome, CoreError>) -> Result<CreationOutcome, CoreError> {
        let mut state = self.lock();
        match &result {
            Ok(outcome) => {
                info!("Token created: mint {} signature {}", outcome.mint, outcome.signature);
                let mut details = format!("Mint: {}\nSignature: {}", outcome.mint, outcome.signature);
                for warning in &outcome.report.warnings {
                    details.push_str(&format!("\nWarning: {}", warning));
                }
                state.push_log("info", "✓ Token created", Some(details));
            }
            Err(e) => {
                warn!("Token creation failed: {}", e);
                state.push_log("error", e.user_message(), Some(e.to_string()));
            }
        }
        result
    }
}
