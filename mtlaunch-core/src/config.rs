use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::packs::BASE_PACK;

pub const DEFAULT_PROXY_URL: &str = "wss://bc3d.etherdeck.org/proxy";
pub const DEFAULT_MODULE_SCRIPT: &str = "minetest.js";

/// Launcher settings supplied by the embedding page (JSON) or a launch
/// profile (TOML). Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Directory holding the engine build, relative to the page.
    pub release_dir: String,
    /// Emscripten loader script inside `release_dir`.
    pub module_script: String,
    /// Pack directory; `<release_dir>/packs` when unset.
    pub packs_dir: Option<String>,
    /// Fetch packs without credentials.
    pub packs_dir_cross_origin: bool,
    pub proxy_url: String,
    pub language: Option<String>,
    pub vpn_server_code: Option<String>,
    pub vpn_client_code: Option<String>,
    /// Packs added as soon as the launcher is created.
    pub default_packs: Vec<String>,
    /// Extra engine settings.
    pub conf: BTreeMap<String, String>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            release_dir: ".".to_string(),
            module_script: DEFAULT_MODULE_SCRIPT.to_string(),
            packs_dir: None,
            packs_dir_cross_origin: false,
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            language: None,
            vpn_server_code: None,
            vpn_client_code: None,
            default_packs: vec![BASE_PACK.to_string()],
            conf: BTreeMap::new(),
        }
    }
}

impl LauncherConfig {
    pub fn packs_dir(&self) -> String {
        match &self.packs_dir {
            Some(dir) => dir.clone(),
            None => format!("{}/packs", self.release_dir.trim_end_matches('/')),
        }
    }

    pub fn module_url(&self) -> String {
        format!("{}/{}", self.release_dir.trim_end_matches('/'), self.module_script)
    }
}
