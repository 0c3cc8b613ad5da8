//! mtlaunch WASM Web Runtime
//!
//! Hosts the Emscripten build of the engine in a page: loads the module
//! script, streams asset packs with `fetch`, and calls the engine's `main`
//! once the module, every pack and the player's launch request are in.

#[cfg(target_arch = "wasm32")]
mod args;
#[cfg(target_arch = "wasm32")]
mod clock;
#[cfg(target_arch = "wasm32")]
mod engine;
#[cfg(target_arch = "wasm32")]
mod fetch;
#[cfg(target_arch = "wasm32")]
mod frontend;
#[cfg(target_arch = "wasm32")]
mod launcher;
#[cfg(target_arch = "wasm32")]
mod page;
mod memory;
mod slot;
mod worker;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Called when the WASM module loads.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
    log::info!("mtlaunch web runtime initialized");
}

/// `[code, display name]` pairs for every language the engine ships.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = supportedLanguages)]
pub fn supported_languages() -> js_sys::Array {
    mtlaunch_core::language::SUPPORTED_LANGUAGES
        .iter()
        .map(|(code, name)| {
            let pair = js_sys::Array::new();
            pair.push(&JsValue::from_str(code));
            pair.push(&JsValue::from_str(name));
            JsValue::from(pair)
        })
        .collect()
}

/// Language to start in: the page's `lang` query parameter, else the
/// browser's preferences.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = defaultLanguage)]
pub fn default_language() -> Result<String, JsValue> {
    use mtlaunch_core::language::{self, FALLBACK_LANGUAGE};

    let window = web_sys::window().ok_or("No window")?;
    let search = window.location().search()?;
    let requested = web_sys::UrlSearchParams::new_with_str(&search)?.get("lang");
    let preferred: Vec<String> = window
        .navigator()
        .languages()
        .iter()
        .filter_map(|l| l.as_string())
        .collect();

    match language::default_language(requested.as_deref(), &preferred) {
        Ok(code) => Ok(code.to_string()),
        Err(e) => {
            log::warn!("{e}");
            let message = format!("Invalid lang parameter: {}", requested.unwrap_or_default());
            let _ = window.alert_with_message(&message);
            Ok(FALLBACK_LANGUAGE.to_string())
        }
    }
}
