use js_sys::Promise;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Location, Storage, Window};

/// Retrieve the global `window` object.
///
/// # Errors
/// Returns an error outside of a browser context where `window` is unavailable.
pub fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("window unavailable"))
}

/// Convert a JavaScript value into a readable string for error reporting.
#[must_use]
pub fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| err.message().into())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Log an error message to the browser console.
pub fn console_error(message: &str) {
    web_sys::console::error_1(&JsValue::from(message));
}

/// Log a warning to the browser console.
pub fn console_warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from(message));
}

/// Access the browser `localStorage` handle.
///
/// # Errors
/// Returns an error if the browser window cannot be accessed or `localStorage` is unavailable.
pub fn local_storage() -> Result<Storage, JsValue> {
    window()?
        .local_storage()?
        .ok_or_else(|| JsValue::from_str("localStorage unavailable"))
}

fn location() -> Result<Location, JsValue> {
    Ok(window()?.location())
}

/// Current `location.hash`, including the leading `#`.
///
/// # Errors
/// Returns an error if the location cannot be read.
pub fn location_hash() -> Result<String, JsValue> {
    location()?.hash()
}

/// Page URL without query or fragment: `origin + pathname`.
///
/// # Errors
/// Returns an error if the location cannot be read.
pub fn page_base_url() -> Result<String, JsValue> {
    let location = location()?;
    Ok(format!("{}{}", location.origin()?, location.pathname()?))
}

/// Write text to the clipboard. The returned promise settles when the copy does.
///
/// # Errors
/// Returns an error if no browser window is available.
pub fn write_clipboard(text: &str) -> Result<Promise, JsValue> {
    Ok(window()?.navigator().clipboard().write_text(text))
}

/// Ask the user to confirm a destructive action.
///
/// # Errors
/// Returns an error if the dialog cannot be shown.
pub fn confirm(message: &str) -> Result<bool, JsValue> {
    window()?.confirm_with_message(message)
}
