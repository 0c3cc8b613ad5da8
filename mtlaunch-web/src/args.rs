use mtlaunch_core::LaunchArgs as CoreArgs;
use wasm_bindgen::prelude::*;

/// Launch options as seen from the page.
#[wasm_bindgen]
#[derive(Default, Clone)]
pub struct LaunchArgs {
    inner: CoreArgs,
}

impl LaunchArgs {
    pub(crate) fn to_core(&self) -> CoreArgs {
        self.inner.clone()
    }
}

#[wasm_bindgen]
impl LaunchArgs {
    #[wasm_bindgen(constructor)]
    pub fn new() -> LaunchArgs {
        Self::default()
    }

    #[wasm_bindgen(js_name = fromQueryString)]
    pub fn from_query_string(qs: &str) -> LaunchArgs {
        Self {
            inner: CoreArgs::from_query_string(qs),
        }
    }

    #[wasm_bindgen(js_name = toQueryString)]
    pub fn to_query_string(&self) -> String {
        self.inner.to_query_string()
    }

    /// Engine argv, without the program name.
    #[wasm_bindgen(js_name = toArray)]
    pub fn to_array(&self) -> Vec<String> {
        self.inner.to_argv()
    }

    #[wasm_bindgen(getter)]
    pub fn go(&self) -> bool {
        self.inner.go
    }

    #[wasm_bindgen(setter)]
    pub fn set_go(&mut self, go: bool) {
        self.inner.go = go;
    }

    #[wasm_bindgen(getter)]
    pub fn server(&self) -> bool {
        self.inner.server
    }

    #[wasm_bindgen(setter)]
    pub fn set_server(&mut self, server: bool) {
        self.inner.server = server;
    }

    #[wasm_bindgen(getter)]
    pub fn name(&self) -> String {
        self.inner.name.clone()
    }

    #[wasm_bindgen(setter)]
    pub fn set_name(&mut self, name: String) {
        self.inner.name = name;
    }

    #[wasm_bindgen(getter)]
    pub fn password(&self) -> String {
        self.inner.password.clone()
    }

    #[wasm_bindgen(setter)]
    pub fn set_password(&mut self, password: String) {
        self.inner.password = password;
    }

    #[wasm_bindgen(getter)]
    pub fn gameid(&self) -> String {
        self.inner.gameid.clone()
    }

    #[wasm_bindgen(setter)]
    pub fn set_gameid(&mut self, gameid: String) {
        self.inner.gameid = gameid;
    }

    #[wasm_bindgen(getter)]
    pub fn address(&self) -> String {
        self.inner.address.clone()
    }

    #[wasm_bindgen(setter)]
    pub fn set_address(&mut self, address: String) {
        self.inner.address = address;
    }

    /// `undefined` when unset.
    #[wasm_bindgen(getter)]
    pub fn port(&self) -> Option<u16> {
        self.inner.port
    }

    #[wasm_bindgen(setter)]
    pub fn set_port(&mut self, port: Option<u16>) {
        self.inner.port = port;
    }

    #[wasm_bindgen(getter)]
    pub fn packs(&self) -> Vec<String> {
        self.inner.packs.clone()
    }

    #[wasm_bindgen(setter)]
    pub fn set_packs(&mut self, packs: Vec<String>) {
        self.inner.packs = packs;
    }

    #[wasm_bindgen(getter)]
    pub fn extra(&self) -> Vec<String> {
        self.inner.extra.clone()
    }

    #[wasm_bindgen(setter)]
    pub fn set_extra(&mut self, extra: Vec<String>) {
        self.inner.extra = extra;
    }
}
