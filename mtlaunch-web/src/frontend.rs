use std::cell::RefCell;

use js_sys::Function;
use mtlaunch_core::{DownloadTotals, Frontend};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, HtmlProgressElement};

const PROGRESS_BAR_ID: &str = "progressbar";

/// Page callbacks registered through the JS `Launcher` object.
#[derive(Default)]
struct Handlers {
    ready: Option<Function>,
    error: Option<Function>,
    progress: Option<Function>,
    print: Option<Function>,
}

/// Reports launcher events to the page.
pub struct PageFrontend {
    canvas: HtmlCanvasElement,
    handlers: RefCell<Handlers>,
}

impl PageFrontend {
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self {
            canvas,
            handlers: RefCell::new(Handlers::default()),
        }
    }

    pub fn set_on_ready(&self, f: Option<Function>) {
        self.handlers.borrow_mut().ready = f;
    }

    pub fn set_on_error(&self, f: Option<Function>) {
        self.handlers.borrow_mut().error = f;
    }

    pub fn set_on_progress(&self, f: Option<Function>) {
        self.handlers.borrow_mut().progress = f;
    }

    pub fn set_on_print(&self, f: Option<Function>) {
        self.handlers.borrow_mut().print = f;
    }

    // Cloned out so a handler may replace itself while running.
    fn handler(&self, pick: fn(&Handlers) -> &Option<Function>) -> Option<Function> {
        pick(&self.handlers.borrow()).clone()
    }

    fn progress_bar() -> Option<HtmlProgressElement> {
        web_sys::window()?
            .document()?
            .get_element_by_id(PROGRESS_BAR_ID)?
            .dyn_into()
            .ok()
    }
}

fn log_call_error(what: &str, result: Result<JsValue, JsValue>) {
    if let Err(e) = result {
        log::error!("{what} handler threw: {e:?}");
    }
}

impl Frontend for PageFrontend {
    fn ready(&self) {
        if let Some(f) = self.handler(|h| &h.ready) {
            log_call_error("onready", f.call0(&JsValue::NULL));
        }
    }

    fn error(&self, message: &str) -> bool {
        match self.handler(|h| &h.error) {
            Some(f) => {
                log_call_error("onerror", f.call1(&JsValue::NULL, &JsValue::from_str(message)));
                true
            }
            None => false,
        }
    }

    fn alert(&self, message: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }

    fn progress(&self, task: &str, fraction: f64) {
        if let Some(f) = self.handler(|h| &h.progress) {
            log_call_error(
                "onprogress",
                f.call2(
                    &JsValue::NULL,
                    &JsValue::from_str(task),
                    &JsValue::from_f64(fraction),
                ),
            );
        }
    }

    fn download_totals(&self, totals: DownloadTotals) {
        if let Some(bar) = Self::progress_bar() {
            bar.set_max(100.0);
            bar.set_value(f64::from(totals.percent()));
            let display = if totals.in_progress() { "block" } else { "none" };
            let _ = bar.style().set_property("display", display);
        }
    }

    fn print(&self, text: &str) {
        if let Some(f) = self.handler(|h| &h.print) {
            log_call_error("onprint", f.call1(&JsValue::NULL, &JsValue::from_str(text)));
        }
    }

    fn activate(&self) {
        let style = self.canvas.style();
        let _ = style.set_property("display", "block");
        let _ = self.canvas.focus();
    }
}
