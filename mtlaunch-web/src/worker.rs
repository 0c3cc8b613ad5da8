//! Bootstrap for the engine's worker threads.
//!
//! Workers get their own `Module`, so engine output printed off the main
//! thread would go to the worker's console. The bootstrap routes `print` and
//! `printErr` back to the main thread's handlers before loading the module.

#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

const FORWARDED_HANDLERS: [&str; 2] = ["print", "printErr"];

/// Worker script that forwards output and then imports `module_url`, which
/// must be absolute: relative URLs do not resolve inside a blob worker.
pub fn bootstrap_script(module_url: &str) -> String {
    let mut script = String::new();
    for handler in FORWARDED_HANDLERS {
        script.push_str(&format!(
            "Module['{handler}'] = (text) => {{\n  postMessage({{cmd: 'callHandler', handler: '{handler}', args: [text], threadId: Module['_pthread_self']()}});\n}};\n"
        ));
    }
    // A JSON string is a valid JS string literal.
    let url = serde_json::Value::from(module_url).to_string();
    script.push_str(&format!("importScripts({url});\n"));
    script
}
