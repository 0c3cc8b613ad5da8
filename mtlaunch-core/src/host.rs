//! Collaborators the launcher drives but does not implement: the compiled
//! engine, the embedding page, and wherever pack bytes come from.

use std::rc::Rc;

use crate::launcher::PackDownload;
use crate::packs::DownloadTotals;
use crate::scheduler::FrameClock;

/// Entry points exported by the compiled engine module.
pub trait Engine {
    /// Begin loading the module. It reports back through
    /// [`Launcher::module_ready`](crate::Launcher::module_ready).
    fn load(&self);
    /// Run the engine's `main` with a full argv (program name first).
    fn invoke_main(&self, argv: &[String]);
    fn install_pack(&self, name: &str, data: &[u8]);
    fn pause(&self);
    fn unpause(&self);
    /// Replace the engine settings file with `contents`.
    fn set_conf(&self, contents: &str);
    fn init_sound(&self);
    fn init_sockets(&self, proxy_url: &str, vpn: Option<&str>);

    fn want_pointer_lock(&self) -> bool {
        false
    }

    fn force_pointer_lock(&self) {}
}

/// Hooks into the page hosting the launcher.
pub trait Frontend {
    /// The launcher will now accept a `launch` call.
    fn ready(&self);
    /// Report an environmental failure. Returns `false` when the page has no
    /// error handler, in which case the launcher raises an alert instead.
    fn error(&self, message: &str) -> bool;
    fn alert(&self, message: &str);
    /// Fractional progress of a named task (`wasm_module`, `download:<pack>`,
    /// `install:<pack>`).
    fn progress(&self, task: &str, fraction: f64);

    fn download_totals(&self, _totals: DownloadTotals) {}

    /// A line printed by the engine.
    fn print(&self, _text: &str) {}

    /// Launch was requested; show the game surface.
    fn activate(&self) {}
}

/// Streams pack bytes into a [`PackDownload`], finishing or failing it.
pub trait PackSource {
    fn fetch(&self, download: PackDownload);
}

/// Everything a [`Launcher`](crate::Launcher) needs from its host.
#[derive(Clone)]
pub struct Host {
    pub engine: Rc<dyn Engine>,
    pub frontend: Rc<dyn Frontend>,
    pub packs: Rc<dyn PackSource>,
    pub clock: Rc<dyn FrameClock>,
}
