// WASM utility functions

use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

/// Sleep for the specified number of milliseconds using browser's setTimeout
pub async fn sleep_ms(milliseconds: u32) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
    let mut scheduled = Ok(0);
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        scheduled = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, milliseconds as i32);
    });
    scheduled?;
    JsFuture::from(promise).await?;
    Ok(())
}
