//! Error types for WebAssembly bridge implementations

use bridge_traits::error::BridgeError;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// Result type for WebAssembly bridge operations
pub type WasmResult<T> = Result<T, WasmError>;

/// Errors that can occur in WebAssembly bridge implementations
#[derive(Error, Debug)]
pub enum WasmError {
    /// JavaScript error from web-sys
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// A browser API is missing (no `window`, no `localStorage`, ...)
    #[error("Browser API not available: {0}")]
    NotAvailable(String),

    /// `QuotaExceededError` raised by web storage
    #[error("Storage quota exceeded: {0}")]
    QuotaExceeded(String),

    /// `AbortError`, e.g. a dismissed picker
    #[error("Operation cancelled")]
    Cancelled,
}

impl WasmError {
    /// Convert a JavaScript exception, tagging it with `context`.
    pub fn from_js(context: &str, value: JsValue) -> Self {
        if let Some(exception) = value.dyn_ref::<web_sys::DomException>() {
            let name = exception.name();
            let message = exception.message();
            return match name.as_str() {
                "AbortError" => WasmError::Cancelled,
                "QuotaExceededError" => WasmError::QuotaExceeded(format!("{context}: {message}")),
                _ => WasmError::JavaScript(format!("{context}: {name}: {message}")),
            };
        }

        let message = if value.is_string() {
            value.as_string().unwrap_or_default()
        } else if let Some(error) = value.dyn_ref::<js_sys::Error>() {
            error.message().into()
        } else {
            format!("{value:?}")
        };
        WasmError::JavaScript(format!("{context}: {message}"))
    }
}

impl From<JsValue> for WasmError {
    fn from(value: JsValue) -> Self {
        WasmError::from_js("javascript", value)
    }
}

impl From<WasmError> for BridgeError {
    fn from(err: WasmError) -> Self {
        match err {
            WasmError::Cancelled => BridgeError::Cancelled,
            WasmError::QuotaExceeded(message) => BridgeError::QuotaExceeded(message),
            WasmError::NotAvailable(api) => BridgeError::NotAvailable(api),
            WasmError::JavaScript(message) => BridgeError::OperationFailed(message),
        }
    }
}

/// Shorthand for mapping a JavaScript exception straight into a
/// [`BridgeError`].
pub(crate) fn js_error(context: &str, value: JsValue) -> BridgeError {
    WasmError::from_js(context, value).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn abort_maps_to_cancelled() {
        let exception = web_sys::DomException::new_with_message_and_name("dismissed", "AbortError")
            .unwrap();
        let err: BridgeError = js_error("picker", exception.into());
        assert!(err.is_cancellation());
    }

    #[wasm_bindgen_test]
    fn quota_maps_to_quota_exceeded() {
        let exception =
            web_sys::DomException::new_with_message_and_name("full", "QuotaExceededError")
                .unwrap();
        let err: BridgeError = js_error("setItem", exception.into());
        assert!(matches!(err, BridgeError::QuotaExceeded(_)));
    }

    #[wasm_bindgen_test]
    fn plain_string_error() {
        let err = WasmError::from_js("ctx", JsValue::from_str("boom"));
        assert_eq!(err.to_string(), "JavaScript error: ctx: boom");
    }
}
