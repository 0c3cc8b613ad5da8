//! DOM plumbing: the canvas, the module loader script and the globals the
//! engine's generated JS looks up on `window`.

use js_sys::{Array, Function, Object, Reflect};
use mtlaunch_core::Launcher;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, Document, Event, HtmlCanvasElement, HtmlScriptElement, Url};

use crate::worker;

const CANVAS_ID: &str = "canvas";
const EXCEPTION_NOTICE: &str = "Exception thrown, see JavaScript console";

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .ok_or("No window")?
        .document()
        .ok_or_else(|| "No document".into())
}

/// The page's `#canvas`, created hidden at the end of `<body>` when absent.
pub fn find_or_create_canvas() -> Result<HtmlCanvasElement, JsValue> {
    let document = document()?;
    if let Some(existing) = document.get_element_by_id(CANVAS_ID) {
        return existing
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| "Element #canvas is not a canvas".into());
    }

    let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    canvas.set_id(CANVAS_ID);
    canvas.set_tab_index(-1);
    canvas.style().set_property("display", "none")?;

    let on_lost = Closure::<dyn FnMut(Event)>::new(|event: Event| {
        event.prevent_default();
        log::error!("WebGL context lost");
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message("WebGL context lost. You will need to reload the page.");
        }
    });
    canvas.add_event_listener_with_callback("webglcontextlost", on_lost.as_ref().unchecked_ref())?;
    on_lost.forget();

    document.body().ok_or("No body")?.append_child(&canvas)?;
    Ok(canvas)
}

pub fn inject_script(src: &str) -> Result<(), JsValue> {
    let document = document()?;
    let script: HtmlScriptElement = document.create_element("script")?.dyn_into()?;
    script.set_src(src);
    document.body().ok_or("No body")?.append_child(&script)?;
    Ok(())
}

fn set(target: &JsValue, key: &str, value: &JsValue) -> Result<(), JsValue> {
    Reflect::set(target, &JsValue::from_str(key), value)?;
    Ok(())
}

/// Leak `f` into a JS function. The hooks live as long as the page.
fn leak<F: FnMut(JsValue) + 'static>(f: F) -> JsValue {
    Closure::<dyn FnMut(JsValue)>::new(f).into_js_value()
}

/// Worker bootstrap for `module_url` as a script blob.
fn worker_blob(module_url: &str) -> Result<Blob, JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    let absolute = Url::new_with_base(module_url, &window.location().href()?)?.href();
    let parts = Array::of1(&JsValue::from_str(&worker::bootstrap_script(&absolute)));
    let options = BlobPropertyBag::new();
    options.set_type("text/javascript");
    Blob::new_with_str_sequence_and_options(&parts, &options)
}

/// Fill in the `Module` object the Emscripten loader reads its settings from
/// and publish it, with the engine's callbacks, on `window`.
pub fn install_module_object(
    module: &Object,
    module_url: &str,
    canvas: &HtmlCanvasElement,
    launcher: &Launcher,
) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("No window")?;

    let print = |launcher: Launcher| {
        leak(move |text: JsValue| {
            if let Some(text) = text.as_string() {
                launcher.print(&text);
            }
        })
    };
    set(module, "print", &print(launcher.clone()))?;
    set(module, "printErr", &print(launcher.clone()))?;
    set(module, "canvas", canvas)?;
    set(module, "mainScriptUrlOrBlob", &worker_blob(module_url)?)?;
    set(
        module,
        "setStatus",
        &leak(|text: JsValue| {
            if let Some(text) = text.as_string().filter(|t| !t.is_empty()) {
                log::debug!("module status: {text}");
            }
        }),
    )?;
    let progress = launcher.clone();
    set(
        module,
        "monitorRunDependencies",
        &leak(move |left: JsValue| {
            progress.module_progress(left.as_f64().unwrap_or(0.0) as u32);
        }),
    )?;
    set(&window, "Module", module)?;

    let notice = launcher.clone();
    let on_error: Function = leak(move |_| notice.print(EXCEPTION_NOTICE)).unchecked_into();
    window.set_onerror(Some(&on_error));

    let ready = launcher.clone();
    set(
        &window,
        "emloop_ready",
        &leak(move |_| {
            if let Err(e) = ready.module_ready() {
                log::error!("{e}");
            }
        }),
    )?;
    let redraw = launcher.clone();
    set(
        &window,
        "emloop_request_animation_frame",
        &leak(move |_| redraw.request_redraw()),
    )?;
    Ok(())
}
