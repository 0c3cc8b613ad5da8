use js_sys::{Array, Function, Object, Reflect, Uint32Array, Uint8Array};
use mtlaunch_core::Engine;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlCanvasElement;

use crate::memory::{self, EngineMemory};
use crate::page;

/// Calls into the Emscripten module through the exports it places on the
/// global `Module` object (`Module._emloop_invoke_main`, `Module.HEAPU8`, ...).
pub struct EmscriptenEngine {
    module: Object,
    script_url: String,
    canvas: HtmlCanvasElement,
}

impl EmscriptenEngine {
    pub fn new(module: Object, script_url: String, canvas: HtmlCanvasElement) -> Self {
        Self {
            module,
            script_url,
            canvas,
        }
    }

    fn property(&self, name: &str) -> Result<JsValue, JsValue> {
        Reflect::get(&self.module, &JsValue::from_str(name))
    }

    fn function(&self, name: &str) -> Result<Function, JsValue> {
        self.property(name)?
            .dyn_into::<Function>()
            .map_err(|_| JsValue::from_str(&format!("Module.{name} is not a function")))
    }

    /// Call an exported C function. Pointers and sizes travel as numbers.
    fn call(&self, export: &str, args: &[f64]) -> Result<JsValue, JsValue> {
        let f = self.function(&format!("_{export}"))?;
        let js_args: Array = args.iter().map(|a| JsValue::from_f64(*a)).collect();
        f.apply(&JsValue::NULL, &js_args)
    }

    fn malloc(&self, size: usize) -> Result<u32, JsValue> {
        let ptr = self.call("malloc", &[size as f64])?;
        match ptr.as_f64() {
            Some(p) if p != 0.0 => Ok(p as u32),
            _ => Err(JsValue::from_str(&format!("malloc({size}) failed"))),
        }
    }

    fn free(&self, ptr: u32) -> Result<(), JsValue> {
        self.call("free", &[f64::from(ptr)])?;
        Ok(())
    }

    /// Copy `s` into engine memory as a NUL-terminated UTF-8 string.
    fn new_string(&self, s: &str) -> Result<u32, JsValue> {
        let ptr = self
            .function("stringToNewUTF8")?
            .call1(&JsValue::NULL, &JsValue::from_str(s))?;
        ptr.as_f64()
            .map(|p| p as u32)
            .ok_or_else(|| JsValue::from_str("stringToNewUTF8 returned no pointer"))
    }

    fn heap_u8(&self) -> Result<Uint8Array, JsValue> {
        Ok(self.property("HEAPU8")?.dyn_into()?)
    }

    fn heap_u32(&self) -> Result<Uint32Array, JsValue> {
        Ok(self.property("HEAPU32")?.dyn_into()?)
    }

    /// Call an export taking a single string argument.
    fn call_with_string(&self, export: &str, s: &str) -> Result<(), JsValue> {
        let buf = self.new_string(s)?;
        let result = self.call(export, &[f64::from(buf)]);
        self.free(buf)?;
        result.map(|_| ())
    }

    fn invoke_main_inner(&self, argv: &[String]) -> Result<(), JsValue> {
        let argc = argv.len();
        let argv = memory::write_argv(self, argv)?;
        self.call("emloop_invoke_main", &[argc as f64, f64::from(argv)])?;
        Ok(())
    }

    fn install_pack_inner(&self, name: &str, data: &[u8]) -> Result<(), JsValue> {
        let ptr = self.malloc(data.len().max(1))?;
        self.heap_u8()?.set(&Uint8Array::from(data), ptr);
        let result = self.call_with_string_and_buffer("emloop_install_pack", name, ptr, data.len());
        self.free(ptr)?;
        result
    }

    fn call_with_string_and_buffer(
        &self,
        export: &str,
        s: &str,
        ptr: u32,
        len: usize,
    ) -> Result<(), JsValue> {
        let name = self.new_string(s)?;
        let result = self.call(export, &[f64::from(name), f64::from(ptr), len as f64]);
        self.free(name)?;
        result.map(|_| ())
    }

    fn init_sockets_inner(&self, proxy_url: &str, vpn: Option<&str>) -> Result<(), JsValue> {
        self.call("emsocket_init", &[])?;
        self.call_with_string("emsocket_set_proxy", proxy_url)?;
        if let Some(vpn) = vpn {
            self.call_with_string("emsocket_set_vpn", vpn)?;
        }
        Ok(())
    }

    fn report(what: &str, result: Result<(), JsValue>) {
        if let Err(e) = result {
            log::error!("engine {what} failed: {e:?}");
        }
    }
}

impl EngineMemory for EmscriptenEngine {
    type Error = JsValue;

    fn malloc(&self, size: usize) -> Result<u32, JsValue> {
        EmscriptenEngine::malloc(self, size)
    }

    fn alloc_string(&self, s: &str) -> Result<u32, JsValue> {
        self.new_string(s)
    }

    fn write_u32s(&self, ptr: u32, words: &[u32]) -> Result<(), JsValue> {
        self.heap_u32()?.set(&Uint32Array::from(words), ptr >> 2);
        Ok(())
    }
}

impl Engine for EmscriptenEngine {
    fn load(&self) {
        log::info!("loading engine module from {}", self.script_url);
        Self::report("load", page::inject_script(&self.script_url));
    }

    fn invoke_main(&self, argv: &[String]) {
        Self::report("main", self.invoke_main_inner(argv));
    }

    fn install_pack(&self, name: &str, data: &[u8]) {
        Self::report("pack install", self.install_pack_inner(name, data));
    }

    fn pause(&self) {
        Self::report("pause", self.call("emloop_pause", &[]).map(|_| ()));
    }

    fn unpause(&self) {
        Self::report("unpause", self.call("emloop_unpause", &[]).map(|_| ()));
    }

    fn set_conf(&self, contents: &str) {
        Self::report(
            "set conf",
            self.call_with_string("emloop_set_minetest_conf", contents),
        );
    }

    fn init_sound(&self) {
        Self::report("sound init", self.call("emloop_init_sound", &[]).map(|_| ()));
    }

    fn init_sockets(&self, proxy_url: &str, vpn: Option<&str>) {
        Self::report("socket init", self.init_sockets_inner(proxy_url, vpn));
    }

    fn want_pointer_lock(&self) -> bool {
        self.call("irrlicht_want_pointerlock", &[])
            .ok()
            .and_then(|v| v.as_f64())
            .is_some_and(|v| v != 0.0)
    }

    fn force_pointer_lock(&self) {
        // Prefer the engine's helper; older builds lack it.
        if self.call("irrlicht_force_pointerlock", &[]).is_err() {
            self.canvas.request_pointer_lock();
        }
    }
}
