use std::rc::Rc;

use js_sys::{Function, Object};
use mtlaunch_core::{Host, LaunchError, Launcher as CoreLauncher, LauncherConfig};
use wasm_bindgen::prelude::*;

use crate::args::LaunchArgs;
use crate::clock::AnimationFrameClock;
use crate::engine::EmscriptenEngine;
use crate::fetch::FetchPackSource;
use crate::frontend::PageFrontend;
use crate::page;
use crate::slot::PageSlot;

thread_local! {
    // The engine's loader script talks to `window.Module`, so a page can
    // host only one launcher.
    static PAGE_SLOT: PageSlot = const { PageSlot::new() };
}

fn js_error(e: LaunchError) -> JsValue {
    js_sys::Error::new(&e.to_string()).into()
}

/// The page-facing launcher.
#[wasm_bindgen]
pub struct Launcher {
    core: CoreLauncher,
    frontend: Rc<PageFrontend>,
}

#[wasm_bindgen]
impl Launcher {
    /// Create the launcher with default settings.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<Launcher, JsValue> {
        Self::create(&LauncherConfig::default())
    }

    /// Create the launcher from a JSON settings object. Missing keys take
    /// their defaults.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(json: &str) -> Result<Launcher, JsValue> {
        let config: LauncherConfig = serde_json::from_str(json)
            .map_err(|e| JsValue::from_str(&format!("Invalid launcher config: {e}")))?;
        Self::create(&config)
    }

    fn create(config: &LauncherConfig) -> Result<Launcher, JsValue> {
        PAGE_SLOT.with(|slot| {
            slot.fill(
                || Self::build(config),
                || js_sys::Error::new("Launcher can only be created once").into(),
            )
        })
    }

    fn build(config: &LauncherConfig) -> Result<Launcher, JsValue> {
        let canvas = page::find_or_create_canvas()?;
        let module = Object::new();
        let frontend = Rc::new(PageFrontend::new(canvas.clone()));
        let host = Host {
            engine: Rc::new(EmscriptenEngine::new(
                module.clone(),
                config.module_url(),
                canvas.clone(),
            )),
            frontend: frontend.clone(),
            packs: Rc::new(FetchPackSource),
            clock: Rc::new(AnimationFrameClock),
        };
        let core = CoreLauncher::new(config, host).map_err(js_error)?;
        // The loader script is only injected on the next frame, so the module
        // object is complete before it runs.
        page::install_module_object(&module, &config.module_url(), &canvas, &core)?;
        log::info!("launcher created, release dir {}", config.release_dir);
        Ok(Launcher { core, frontend })
    }

    #[wasm_bindgen(setter)]
    pub fn set_onready(&self, f: Option<Function>) {
        self.frontend.set_on_ready(f);
    }

    #[wasm_bindgen(setter)]
    pub fn set_onerror(&self, f: Option<Function>) {
        self.frontend.set_on_error(f);
    }

    /// `f(task, fraction)`
    #[wasm_bindgen(setter)]
    pub fn set_onprogress(&self, f: Option<Function>) {
        self.frontend.set_on_progress(f);
    }

    #[wasm_bindgen(setter)]
    pub fn set_onprint(&self, f: Option<Function>) {
        self.frontend.set_on_print(f);
    }

    #[wasm_bindgen(js_name = setProxy)]
    pub fn set_proxy(&self, url: &str) {
        self.core.set_proxy(url);
    }

    #[wasm_bindgen(js_name = setPacksDir)]
    pub fn set_packs_dir(&self, url: &str, cross_origin: Option<bool>) {
        self.core.set_packs_dir(url, cross_origin.unwrap_or(false));
    }

    #[wasm_bindgen(js_name = setVPN)]
    pub fn set_vpn(&self, server_code: Option<String>, client_code: Option<String>) {
        self.core.set_vpn(server_code.as_deref(), client_code.as_deref());
    }

    #[wasm_bindgen(js_name = setConf)]
    pub fn set_conf(&self, key: &str, value: &str) {
        self.core.set_conf(key, value);
    }

    #[wasm_bindgen(js_name = setLang)]
    pub fn set_lang(&self, code: &str) -> Result<(), JsValue> {
        self.core.set_language(code).map_err(js_error)
    }

    /// 0 = not added, 1 = downloading, 2 = installed.
    #[wasm_bindgen(js_name = checkPack)]
    pub fn check_pack(&self, name: &str) -> u32 {
        self.core.check_pack(name).code()
    }

    #[wasm_bindgen(js_name = addPack)]
    pub fn add_pack(&self, name: &str) -> Result<(), JsValue> {
        self.core.add_pack(name).map_err(js_error)
    }

    #[wasm_bindgen(js_name = addPacks)]
    pub fn add_packs(&self, names: Vec<String>) -> Result<(), JsValue> {
        self.core.add_packs(names.as_slice()).map_err(js_error)
    }

    #[wasm_bindgen(js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.core.is_ready()
    }

    pub fn launch(&self, args: &LaunchArgs) -> Result<(), JsValue> {
        self.core.launch(args.to_core()).map_err(js_error)
    }

    #[wasm_bindgen(js_name = wantPointerLock)]
    pub fn want_pointer_lock(&self) -> bool {
        self.core.want_pointer_lock()
    }

    /// Engine output, when new lines arrived since the last call.
    #[wasm_bindgen(js_name = consoleText)]
    pub fn console_text(&self) -> Option<String> {
        self.core.take_console_update()
    }
}
