//! Launch orchestration: the fixed startup condition graph, pack loading and
//! the configuration surface offered to the embedding page.
//!
//! ```text
//! wasmReady ──> ready ──┐
//! launch_called ────────┼──> main_called
//! installed:<pack> ─────┘        (one per added pack)
//! fetched:<pack> + wasmReady ──> installed:<pack>
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::args::LaunchArgs;
use crate::config::LauncherConfig;
use crate::conf::EngineConf;
use crate::console::ConsoleLog;
use crate::error::LaunchError;
use crate::host::{Engine, Frontend, Host, PackSource};
use crate::language;
use crate::packs::{
    fetched_condition, installed_condition, is_builtin_game, pack_url, DownloadTotals, PackBuffer,
    PackStatus,
};
use crate::scheduler::{Callback, LaunchScheduler};

pub const WASM_READY: &str = "wasmReady";
pub const LAUNCH_CALLED: &str = "launch_called";
pub const READY: &str = "ready";
pub const MAIN_CALLED: &str = "main_called";

/// argv[0] handed to the engine.
pub const PROGRAM_NAME: &str = "./minetest";

struct LauncherState {
    args: Option<LaunchArgs>,
    proxy_url: String,
    packs_dir: String,
    packs_dir_cross_origin: bool,
    vpn: Option<String>,
    conf: EngineConf,
    totals: DownloadTotals,
    module_dependencies: u32,
    console: ConsoleLog,
}

struct LauncherInner {
    scheduler: LaunchScheduler,
    engine: Rc<dyn Engine>,
    frontend: Rc<dyn Frontend>,
    packs: Rc<dyn PackSource>,
    state: RefCell<LauncherState>,
}

/// Drives one page's launch: module load, pack installs and the call into
/// the engine's `main`.
///
/// Cloning yields another handle to the same launcher.
#[derive(Clone)]
pub struct Launcher {
    inner: Rc<LauncherInner>,
}

impl Launcher {
    /// Declare the startup graph and start fetching the configured default
    /// packs. The engine module starts loading on the first frame.
    pub fn new(config: &LauncherConfig, host: Host) -> Result<Self, LaunchError> {
        let scheduler = LaunchScheduler::new(host.clock);
        let launcher = Self {
            inner: Rc::new(LauncherInner {
                scheduler,
                engine: host.engine,
                frontend: host.frontend,
                packs: host.packs,
                state: RefCell::new(LauncherState {
                    args: None,
                    proxy_url: config.proxy_url.clone(),
                    packs_dir: config.packs_dir(),
                    packs_dir_cross_origin: config.packs_dir_cross_origin,
                    vpn: None,
                    conf: EngineConf::new(),
                    totals: DownloadTotals::default(),
                    module_dependencies: 0,
                    console: ConsoleLog::default(),
                }),
            }),
        };

        let scheduler = &launcher.inner.scheduler;
        let engine = launcher.inner.engine.clone();
        scheduler.declare(WASM_READY, Some(Box::new(move || engine.load())), &[])?;
        scheduler.declare(LAUNCH_CALLED, None, &[])?;
        scheduler.declare(READY, Some(launcher.deferred(Self::notify_ready)), &[WASM_READY])?;
        scheduler.declare(
            MAIN_CALLED,
            Some(launcher.deferred(Self::call_main)),
            &[READY, LAUNCH_CALLED],
        )?;

        for (key, value) in &config.conf {
            launcher.set_conf(key, value);
        }
        if let Some(lang) = &config.language {
            launcher.set_language(lang)?;
        }
        launcher.set_vpn(
            config.vpn_server_code.as_deref(),
            config.vpn_client_code.as_deref(),
        );
        launcher.add_packs(config.default_packs.as_slice())?;
        Ok(launcher)
    }

    /// Wrap a launcher method as a scheduler callback that holds only a weak
    /// reference to the launcher.
    fn deferred(&self, action: fn(&Launcher)) -> Callback {
        let weak = Rc::downgrade(&self.inner);
        Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                action(&Launcher { inner });
            }
        })
    }

    fn upgrade(weak: &Weak<LauncherInner>) -> Option<Launcher> {
        weak.upgrade().map(|inner| Launcher { inner })
    }

    fn satisfy_logged(&self, name: &str) {
        if let Err(e) = self.inner.scheduler.satisfy(name) {
            log::error!("{e}");
        }
    }

    fn notify_ready(&self) {
        self.satisfy_logged(READY);
        log::info!("launcher ready");
        self.inner.frontend.ready();
    }

    fn call_main(&self) {
        let args = self.inner.state.borrow().args.clone().unwrap_or_default();
        let mut argv = vec![PROGRAM_NAME.to_string()];
        argv.extend(args.to_argv());
        log::info!("invoking engine main: {argv:?}");
        self.inner.engine.invoke_main(&argv);
        // Give the page a frame to redraw before the engine blocks the main
        // thread generating the world.
        self.request_redraw();
        self.satisfy_logged(MAIN_CALLED);
    }

    pub fn scheduler(&self) -> &LaunchScheduler {
        &self.inner.scheduler
    }

    /// The engine module finished loading.
    pub fn module_ready(&self) -> Result<(), LaunchError> {
        log::info!("engine module loaded");
        self.inner.scheduler.satisfy(WASM_READY)?;
        Ok(())
    }

    /// Module loader progress: `left` run-dependencies are still outstanding.
    pub fn module_progress(&self, left: u32) {
        let total = {
            let mut state = self.inner.state.borrow_mut();
            state.module_dependencies = state.module_dependencies.max(left);
            state.module_dependencies
        };
        if total > 0 {
            let fraction = f64::from(total - left) / f64::from(total);
            self.inner.frontend.progress("wasm_module", fraction);
        }
    }

    /// Pause the engine and resume it on the next frame so the page can
    /// repaint.
    pub fn request_redraw(&self) {
        self.inner.engine.pause();
        let engine = self.inner.engine.clone();
        self.inner
            .scheduler
            .clock()
            .request_frame(Box::new(move || engine.unpause()));
    }

    /// A line of engine output.
    pub fn print(&self, text: &str) {
        self.inner.state.borrow_mut().console.push(text);
        self.inner.frontend.print(text);
    }

    /// Console text, when new output arrived since the last call.
    pub fn take_console_update(&self) -> Option<String> {
        self.inner.state.borrow_mut().console.take_update()
    }

    pub fn is_ready(&self) -> bool {
        self.inner.scheduler.is_satisfied(READY).unwrap_or(false)
    }

    pub fn is_launched(&self) -> bool {
        self.inner.scheduler.is_satisfied(LAUNCH_CALLED).unwrap_or(false)
    }

    pub fn is_main_called(&self) -> bool {
        self.inner.scheduler.is_satisfied(MAIN_CALLED).unwrap_or(false)
    }

    pub fn want_pointer_lock(&self) -> bool {
        self.inner.engine.want_pointer_lock()
    }

    pub fn set_proxy(&self, url: &str) {
        self.inner.state.borrow_mut().proxy_url = url.to_string();
    }

    /// Directory packs are fetched from; absolute or relative to the page.
    /// A cross-origin directory is fetched without credentials.
    pub fn set_packs_dir(&self, url: &str, cross_origin: bool) {
        let mut state = self.inner.state.borrow_mut();
        state.packs_dir = url.to_string();
        state.packs_dir_cross_origin = cross_origin;
    }

    /// The server code wins when both are given.
    pub fn set_vpn(&self, server_code: Option<&str>, client_code: Option<&str>) {
        let non_empty = |code: Option<&str>| code.filter(|c| !c.is_empty()).map(str::to_string);
        self.inner.state.borrow_mut().vpn = non_empty(server_code).or_else(|| non_empty(client_code));
    }

    pub fn vpn(&self) -> Option<String> {
        self.inner.state.borrow().vpn.clone()
    }

    /// Set an engine setting, replacing any previous value of `key`.
    pub fn set_conf(&self, key: &str, value: &str) {
        self.inner.state.borrow_mut().conf.set(key, value);
    }

    pub fn engine_conf(&self) -> EngineConf {
        self.inner.state.borrow().conf.clone()
    }

    pub fn set_language(&self, code: &str) -> Result<(), LaunchError> {
        if !language::is_supported(code) {
            return Err(LaunchError::UnsupportedLanguage(code.to_string()));
        }
        self.set_conf("language", code);
        Ok(())
    }

    pub fn check_pack(&self, name: &str) -> PackStatus {
        let installed = installed_condition(name);
        let scheduler = &self.inner.scheduler;
        if !scheduler.is_declared(&installed) {
            return PackStatus::NotAdded;
        }
        match scheduler.is_satisfied(&installed) {
            Ok(true) => PackStatus::Installed,
            _ => PackStatus::Downloading,
        }
    }

    pub fn add_packs<S: AsRef<str>>(&self, names: &[S]) -> Result<(), LaunchError> {
        for name in names {
            self.add_pack(name.as_ref())?;
        }
        Ok(())
    }

    /// Register a pack and hand its download to the pack source. The engine
    /// `main` is held back until the pack is installed.
    pub fn add_pack(&self, name: &str) -> Result<(), LaunchError> {
        let scheduler = &self.inner.scheduler;
        if scheduler.is_satisfied(LAUNCH_CALLED)? {
            return Err(LaunchError::PackAfterLaunch(name.to_string()));
        }
        if is_builtin_game(name) {
            log::debug!("'{name}' is built into the engine, nothing to fetch");
            return Ok(());
        }
        let fetched = fetched_condition(name);
        let installed = installed_condition(name);
        if scheduler.is_declared(&installed) {
            return Err(LaunchError::DuplicatePack(name.to_string()));
        }
        let (url, omit_credentials) = {
            let state = self.inner.state.borrow();
            (pack_url(&state.packs_dir, name), state.packs_dir_cross_origin)
        };
        let buffer = Rc::new(RefCell::new(PackBuffer::default()));

        let install: Callback = {
            let weak = Rc::downgrade(&self.inner);
            let name = name.to_string();
            let buffer = buffer.clone();
            Box::new(move || {
                if let Some(launcher) = Self::upgrade(&weak) {
                    launcher.install_pack(&name, &buffer);
                }
            })
        };
        scheduler.declare(&fetched, None, &[])?;
        scheduler.declare(&installed, Some(install), &[WASM_READY, fetched.as_str()])?;
        scheduler.add_dependency(MAIN_CALLED, &installed)?;

        log::info!("fetching pack '{name}' from {url}");
        self.inner.packs.fetch(PackDownload {
            name: name.to_string(),
            url,
            omit_credentials,
            content_length: None,
            buffer,
            launcher: Rc::downgrade(&self.inner),
        });
        Ok(())
    }

    fn install_pack(&self, name: &str, buffer: &RefCell<PackBuffer>) {
        let data = buffer.borrow_mut().take();
        log::info!("installing pack '{name}' ({} bytes)", data.len());
        self.inner.engine.install_pack(name, &data);
        self.satisfy_logged(&installed_condition(name));
        self.inner.frontend.progress(&format!("download:{name}"), 1.0);
        self.inner.frontend.progress(&format!("install:{name}"), 1.0);
    }

    fn add_download_bytes(&self, downloaded: u64, needed: u64) {
        let totals = {
            let mut state = self.inner.state.borrow_mut();
            state.totals.add(downloaded, needed);
            state.totals
        };
        self.inner.frontend.download_totals(totals);
    }

    /// Start the game with `args`. Only valid once the launcher reported
    /// ready, and only once.
    pub fn launch(&self, args: LaunchArgs) -> Result<(), LaunchError> {
        if !self.is_ready() {
            return Err(LaunchError::NotReady);
        }
        if self.is_launched() {
            return Err(LaunchError::AlreadyLaunched);
        }

        let mut wanted = Vec::new();
        if !args.gameid.is_empty() {
            wanted.push(args.gameid.clone());
        }
        wanted.extend(args.packs.iter().cloned());
        for pack in &wanted {
            if self.check_pack(pack) == PackStatus::NotAdded {
                self.add_pack(pack)?;
            }
        }

        let go = args.go;
        let (conf, proxy_url, vpn) = {
            let mut state = self.inner.state.borrow_mut();
            state.args = Some(args);
            (state.conf.clone(), state.proxy_url.clone(), state.vpn.clone())
        };

        self.inner.frontend.activate();
        let engine = &self.inner.engine;
        if !conf.is_empty() {
            let contents = conf.render();
            log::info!("engine configuration:\n{contents}");
            engine.set_conf(&contents);
        }
        engine.init_sound();
        engine.init_sockets(&proxy_url, vpn.as_deref());
        if go {
            engine.force_pointer_lock();
        }
        self.inner.scheduler.satisfy(LAUNCH_CALLED)?;
        log::info!("launch requested");
        Ok(())
    }
}

/// One pack's transfer, handed to a [`PackSource`]. The source feeds it
/// chunks and then calls [`finish`](Self::finish) or [`fail`](Self::fail).
/// A download dropped without finishing leaves the launch waiting forever.
pub struct PackDownload {
    name: String,
    url: String,
    omit_credentials: bool,
    content_length: Option<u64>,
    buffer: Rc<RefCell<PackBuffer>>,
    launcher: Weak<LauncherInner>,
}

impl PackDownload {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn omit_credentials(&self) -> bool {
        self.omit_credentials
    }

    pub fn received(&self) -> usize {
        self.buffer.borrow().received()
    }

    /// Announce the expected size; without one, no download progress is
    /// reported.
    pub fn set_content_length(&mut self, length: Option<u64>) {
        // A zero length reads as unknown.
        let length = length.filter(|&l| l > 0);
        self.content_length = length;
        if let (Some(length), Some(launcher)) = (length, Launcher::upgrade(&self.launcher)) {
            launcher.add_download_bytes(0, length);
        }
    }

    pub fn push_chunk(&mut self, chunk: Vec<u8>) {
        let len = chunk.len() as u64;
        self.buffer.borrow_mut().push(chunk);
        let Some(total) = self.content_length else {
            return;
        };
        if let Some(launcher) = Launcher::upgrade(&self.launcher) {
            launcher.add_download_bytes(len, 0);
            let fraction = self.received() as f64 / total as f64;
            launcher
                .inner
                .frontend
                .progress(&format!("download:{}", self.name), fraction);
        }
    }

    /// All bytes arrived.
    pub fn finish(self) -> Result<(), LaunchError> {
        log::info!("fetched pack '{}' ({} bytes)", self.name, self.received());
        if let Some(launcher) = Launcher::upgrade(&self.launcher) {
            launcher.inner.scheduler.satisfy(&fetched_condition(&self.name))?;
        }
        Ok(())
    }

    /// The transfer failed. The pack is never installed, so the engine is
    /// never started.
    pub fn fail(self, message: &str) {
        log::error!("fetching pack '{}' failed: {message}", self.name);
        if let Some(launcher) = Launcher::upgrade(&self.launcher) {
            let frontend = &launcher.inner.frontend;
            if !frontend.error(message) {
                frontend.alert(&format!("Error while loading {}. Please refresh page", self.url));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::QueuedFrames;
    use std::cell::Cell;

    #[derive(Default)]
    struct FakeEngine {
        events: RefCell<Vec<String>>,
    }

    impl FakeEngine {
        fn record(&self, event: String) {
            self.events.borrow_mut().push(event);
        }

        fn count(&self, prefix: &str) -> usize {
            self.events
                .borrow()
                .iter()
                .filter(|e| e.starts_with(prefix))
                .count()
        }

        fn position(&self, prefix: &str) -> Option<usize> {
            self.events.borrow().iter().position(|e| e.starts_with(prefix))
        }
    }

    impl Engine for FakeEngine {
        fn load(&self) {
            self.record("load".into());
        }
        fn invoke_main(&self, argv: &[String]) {
            self.record(format!("main {}", argv.join(" ")));
        }
        fn install_pack(&self, name: &str, data: &[u8]) {
            self.record(format!("install {name} {}", data.len()));
        }
        fn pause(&self) {
            self.record("pause".into());
        }
        fn unpause(&self) {
            self.record("unpause".into());
        }
        fn set_conf(&self, contents: &str) {
            self.record(format!("conf {contents}"));
        }
        fn init_sound(&self) {
            self.record("sound".into());
        }
        fn init_sockets(&self, proxy_url: &str, vpn: Option<&str>) {
            self.record(format!("sockets {proxy_url} {vpn:?}"));
        }
        fn force_pointer_lock(&self) {
            self.record("pointerlock".into());
        }
    }

    #[derive(Default)]
    struct FakeFrontend {
        ready: Cell<u32>,
        handles_errors: Cell<bool>,
        errors: RefCell<Vec<String>>,
        alerts: RefCell<Vec<String>>,
        progress: RefCell<Vec<(String, f64)>>,
        totals: Cell<DownloadTotals>,
        printed: RefCell<Vec<String>>,
        activated: Cell<bool>,
    }

    impl Frontend for FakeFrontend {
        fn ready(&self) {
            self.ready.set(self.ready.get() + 1);
        }
        fn error(&self, message: &str) -> bool {
            self.errors.borrow_mut().push(message.to_string());
            self.handles_errors.get()
        }
        fn alert(&self, message: &str) {
            self.alerts.borrow_mut().push(message.to_string());
        }
        fn progress(&self, task: &str, fraction: f64) {
            self.progress.borrow_mut().push((task.to_string(), fraction));
        }
        fn download_totals(&self, totals: DownloadTotals) {
            self.totals.set(totals);
        }
        fn print(&self, text: &str) {
            self.printed.borrow_mut().push(text.to_string());
        }
        fn activate(&self) {
            self.activated.set(true);
        }
    }

    #[derive(Default)]
    struct FakeSource {
        downloads: RefCell<Vec<PackDownload>>,
    }

    impl FakeSource {
        fn take(&self, name: &str) -> PackDownload {
            let mut downloads = self.downloads.borrow_mut();
            let index = downloads
                .iter()
                .position(|d| d.name() == name)
                .unwrap_or_else(|| panic!("no download for {name}"));
            downloads.remove(index)
        }

        fn names(&self) -> Vec<String> {
            self.downloads.borrow().iter().map(|d| d.name().to_string()).collect()
        }
    }

    impl PackSource for FakeSource {
        fn fetch(&self, download: PackDownload) {
            self.downloads.borrow_mut().push(download);
        }
    }

    struct Harness {
        frames: Rc<QueuedFrames>,
        engine: Rc<FakeEngine>,
        frontend: Rc<FakeFrontend>,
        source: Rc<FakeSource>,
        launcher: Launcher,
    }

    impl Harness {
        fn with_config(config: LauncherConfig) -> Self {
            let frames = QueuedFrames::new();
            let engine = Rc::new(FakeEngine::default());
            let frontend = Rc::new(FakeFrontend::default());
            let source = Rc::new(FakeSource::default());
            let launcher = Launcher::new(
                &config,
                Host {
                    engine: engine.clone(),
                    frontend: frontend.clone(),
                    packs: source.clone(),
                    clock: frames.clone(),
                },
            )
            .unwrap();
            Self {
                frames,
                engine,
                frontend,
                source,
                launcher,
            }
        }

        fn new() -> Self {
            Self::with_config(LauncherConfig::default())
        }

        fn settle(&self) {
            self.frames.run_until_idle(100);
        }

        fn deliver(&self, name: &str, bytes: &[u8]) {
            let mut download = self.source.take(name);
            download.set_content_length(Some(bytes.len() as u64));
            download.push_chunk(bytes.to_vec());
            download.finish().unwrap();
        }

        /// Load the module and wait for the ready notification.
        fn make_ready(&self) {
            self.settle();
            self.launcher.module_ready().unwrap();
            self.settle();
            assert!(self.launcher.is_ready());
        }
    }

    #[test]
    fn test_module_load_starts_on_first_frame() {
        let h = Harness::new();
        assert_eq!(h.engine.count("load"), 0);
        h.frames.advance();
        assert_eq!(h.engine.count("load"), 1);
        h.settle();
        assert_eq!(h.engine.count("load"), 1);
        assert!(!h.launcher.is_ready());
    }

    #[test]
    fn test_base_pack_added_on_creation() {
        let h = Harness::new();
        assert_eq!(h.source.names(), vec!["base"]);
        assert_eq!(h.launcher.check_pack("base"), PackStatus::Downloading);
        let download = h.source.take("base");
        assert_eq!(download.url(), "./packs/base.pack");
        assert!(!download.omit_credentials());
    }

    #[test]
    fn test_full_launch_sequence() {
        let h = Harness::new();
        h.make_ready();
        assert_eq!(h.frontend.ready.get(), 1);

        let args = LaunchArgs {
            go: true,
            name: "alice".into(),
            ..LaunchArgs::default()
        };
        h.launcher.launch(args).unwrap();
        h.settle();
        assert_eq!(h.engine.count("main"), 0, "base pack still downloading");

        h.deliver("base", b"abc");
        h.frames.advance();
        assert_eq!(h.engine.count("install base 3"), 1);
        assert_eq!(h.launcher.check_pack("base"), PackStatus::Installed);
        h.frames.advance();
        assert_eq!(h.engine.count("main ./minetest --go --name alice"), 1);
        assert!(h.launcher.is_main_called());
        assert_eq!(h.engine.count("unpause"), 0);
        h.frames.advance();
        assert_eq!(h.engine.count("unpause"), 1);

        let sockets = h.engine.position("sockets").unwrap();
        let main = h.engine.position("main").unwrap();
        assert!(h.engine.position("sound").unwrap() < main);
        assert!(h.engine.position("pointerlock").unwrap() < main);
        assert!(sockets < main);
        assert!(h.frontend.activated.get());
    }

    #[test]
    fn test_install_waits_for_module() {
        let h = Harness::new();
        h.settle();
        h.deliver("base", b"0123456789");
        h.settle();
        assert_eq!(h.engine.count("install"), 0);
        assert_eq!(h.launcher.check_pack("base"), PackStatus::Downloading);

        h.launcher.module_ready().unwrap();
        h.settle();
        assert_eq!(h.engine.count("install base 10"), 1);
        assert_eq!(h.launcher.check_pack("base"), PackStatus::Installed);
    }

    #[test]
    fn test_second_launch_is_rejected() {
        let h = Harness::new();
        h.make_ready();
        h.deliver("base", b"x");
        h.launcher.launch(LaunchArgs::new()).unwrap();
        h.settle();
        assert_eq!(
            h.launcher.launch(LaunchArgs::new()),
            Err(LaunchError::AlreadyLaunched)
        );
        h.settle();
        assert_eq!(h.engine.count("main"), 1);
    }

    #[test]
    fn test_launch_before_ready_is_rejected() {
        let h = Harness::new();
        h.settle();
        assert_eq!(h.launcher.launch(LaunchArgs::new()), Err(LaunchError::NotReady));
        h.launcher.module_ready().unwrap();
        assert_eq!(
            h.launcher.launch(LaunchArgs::new()),
            Err(LaunchError::NotReady),
            "ready is only reported on the next frame"
        );
    }

    #[test]
    fn test_module_ready_twice_is_an_error() {
        let h = Harness::new();
        h.launcher.module_ready().unwrap();
        assert!(matches!(
            h.launcher.module_ready(),
            Err(LaunchError::Scheduler(_))
        ));
    }

    #[test]
    fn test_failed_fetch_stalls_launch() {
        let h = Harness::new();
        h.frontend.handles_errors.set(true);
        h.make_ready();
        h.launcher.launch(LaunchArgs::new()).unwrap();
        h.source.take("base").fail("NetworkError when attempting to fetch resource");
        h.settle();
        assert_eq!(
            *h.frontend.errors.borrow(),
            vec!["NetworkError when attempting to fetch resource"]
        );
        assert!(h.frontend.alerts.borrow().is_empty());
        assert_eq!(h.engine.count("main"), 0);
        assert!(!h.launcher.is_main_called());
    }

    #[test]
    fn test_unhandled_fetch_error_raises_alert() {
        let h = Harness::new();
        h.source.take("base").fail("404");
        assert_eq!(
            *h.frontend.alerts.borrow(),
            vec!["Error while loading ./packs/base.pack. Please refresh page"]
        );
    }

    #[test]
    fn test_pack_registration_rules() {
        let h = Harness::new();
        assert_eq!(
            h.launcher.add_pack("base"),
            Err(LaunchError::DuplicatePack("base".into()))
        );
        h.launcher.add_pack("devtest").unwrap();
        assert_eq!(h.launcher.check_pack("devtest"), PackStatus::NotAdded);
        assert_eq!(h.source.names(), vec!["base"]);

        h.make_ready();
        h.launcher.launch(LaunchArgs::new()).unwrap();
        assert_eq!(
            h.launcher.add_pack("late"),
            Err(LaunchError::PackAfterLaunch("late".into()))
        );
        assert_eq!(h.launcher.check_pack("late"), PackStatus::NotAdded);
    }

    #[test]
    fn test_launch_adds_game_packs_and_waits_for_them() {
        let h = Harness::new();
        h.launcher.add_pack("textures").unwrap();
        h.make_ready();
        h.deliver("base", b"b");
        h.settle();

        let args = LaunchArgs {
            gameid: "mineclone2".into(),
            packs: vec!["mineclone2".into(), "textures".into(), "mods".into()],
            ..LaunchArgs::default()
        };
        h.launcher.launch(args).unwrap();
        assert_eq!(h.source.names(), vec!["textures", "mineclone2", "mods"]);

        h.deliver("mineclone2", b"mc");
        h.deliver("textures", b"t");
        h.settle();
        assert_eq!(h.engine.count("main"), 0);
        h.deliver("mods", b"m");
        h.settle();
        assert_eq!(h.engine.count("main ./minetest --gameid mineclone2"), 1);
        assert_eq!(h.engine.count("install"), 4);
    }

    #[test]
    fn test_configuration_pushed_at_launch() {
        let mut config = LauncherConfig::default();
        config.conf.insert("viewing_range".into(), "60".into());
        config.language = Some("de".into());
        config.vpn_client_code = Some("client42".into());
        let h = Harness::with_config(config);
        h.launcher.set_proxy("wss://proxy.example.net");
        h.make_ready();
        h.launcher.launch(LaunchArgs::new()).unwrap();

        assert_eq!(h.engine.count("conf viewing_range = 60\nlanguage = de\n"), 1);
        assert_eq!(
            h.engine.count("sockets wss://proxy.example.net Some(\"client42\")"),
            1
        );
        assert_eq!(h.engine.count("pointerlock"), 0);
    }

    #[test]
    fn test_empty_conf_is_not_pushed() {
        let h = Harness::new();
        h.make_ready();
        h.launcher.launch(LaunchArgs::new()).unwrap();
        assert_eq!(h.engine.count("conf"), 0);
    }

    #[test]
    fn test_unsupported_language_rejected() {
        let h = Harness::new();
        assert_eq!(
            h.launcher.set_language("xx"),
            Err(LaunchError::UnsupportedLanguage("xx".into()))
        );
        assert!(h.launcher.engine_conf().is_empty());
        h.launcher.set_language("pt_BR").unwrap();
        assert_eq!(h.launcher.engine_conf().get("language"), Some("pt_BR"));
    }

    #[test]
    fn test_vpn_prefers_server_code() {
        let h = Harness::new();
        h.launcher.set_vpn(Some("server"), Some("client"));
        assert_eq!(h.launcher.vpn().as_deref(), Some("server"));
        h.launcher.set_vpn(Some(""), Some("client"));
        assert_eq!(h.launcher.vpn().as_deref(), Some("client"));
        h.launcher.set_vpn(None, None);
        assert_eq!(h.launcher.vpn(), None);
    }

    #[test]
    fn test_cross_origin_packs_dir() {
        let h = Harness::new();
        h.launcher.set_packs_dir("https://cdn.example.com/packs", true);
        h.launcher.add_pack("extra").unwrap();
        let download = h.source.take("extra");
        assert_eq!(download.url(), "https://cdn.example.com/packs/extra.pack");
        assert!(download.omit_credentials());
    }

    #[test]
    fn test_download_progress() {
        let h = Harness::new();
        let mut download = h.source.take("base");
        download.set_content_length(Some(4));
        assert_eq!(h.frontend.totals.get(), DownloadTotals { downloaded: 0, needed: 4 });
        download.push_chunk(vec![0; 1]);
        download.push_chunk(vec![0; 3]);
        assert_eq!(h.frontend.totals.get().percent(), 100);
        let progress = h.frontend.progress.borrow().clone();
        assert_eq!(
            progress,
            vec![("download:base".to_string(), 0.25), ("download:base".to_string(), 1.0)]
        );
    }

    #[test]
    fn test_download_without_length_reports_no_progress() {
        let h = Harness::new();
        let mut download = h.source.take("base");
        download.set_content_length(None);
        download.push_chunk(vec![1, 2, 3]);
        assert_eq!(download.received(), 3);
        assert!(h.frontend.progress.borrow().is_empty());
    }

    #[test]
    fn test_zero_content_length_reports_no_progress() {
        let h = Harness::new();
        let mut download = h.source.take("base");
        download.set_content_length(Some(0));
        download.push_chunk(vec![1, 2, 3]);
        assert_eq!(download.received(), 3);
        assert!(h.frontend.progress.borrow().is_empty());
        assert_eq!(h.frontend.totals.get(), DownloadTotals::default());
        assert!(!h.frontend.totals.get().in_progress());
    }

    #[test]
    fn test_module_progress() {
        let h = Harness::new();
        h.launcher.module_progress(4);
        h.launcher.module_progress(1);
        h.launcher.module_progress(0);
        let fractions: Vec<f64> = h.frontend.progress.borrow().iter().map(|p| p.1).collect();
        assert_eq!(fractions, vec![0.0, 0.75, 1.0]);
    }

    #[test]
    fn test_module_progress_with_no_dependencies_is_silent() {
        let h = Harness::new();
        h.launcher.module_progress(0);
        assert!(h.frontend.progress.borrow().is_empty());
    }

    #[test]
    fn test_print_goes_to_console_and_hook() {
        let h = Harness::new();
        h.launcher.print("Loading world");
        assert_eq!(*h.frontend.printed.borrow(), vec!["Loading world"]);
        assert_eq!(h.launcher.take_console_update().as_deref(), Some("Loading world\n"));
        assert_eq!(h.launcher.take_console_update(), None);
    }

    #[test]
    fn test_dropped_launcher_ignores_late_download() {
        let h = Harness::new();
        let download = h.source.take("base");
        drop(h);
        assert_eq!(download.finish(), Ok(()));
    }
}
