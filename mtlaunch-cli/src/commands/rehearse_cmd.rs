//! Headless launch rehearsal: the real launcher graph, driven by queued
//! frames, with packs read from disk and an engine that only records calls.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::Read;
use std::path::PathBuf;
use std::rc::Rc;

use mtlaunch_core::{
    DownloadTotals, Engine, Frontend, Host, LaunchArgs, Launcher, LauncherConfig, PackDownload,
    PackSource, PackStatus, QueuedFrames,
};

use crate::cli::LaunchFlags;
use crate::profile::ProfileContext;

pub fn run(
    ctx: &ProfileContext,
    packs_dir: Option<PathBuf>,
    chunk_size: usize,
    max_ticks: usize,
    flags: &LaunchFlags,
) -> anyhow::Result<()> {
    let mut config = ctx.profile.launcher.clone();
    let dir = packs_dir.unwrap_or_else(|| ctx.packs_dir());
    config.packs_dir = Some(dir.to_string_lossy().into_owned());

    let options = RehearsalOptions {
        chunk_size,
        max_ticks,
    };
    let events = rehearse(&config, ctx.launch_args(flags), &options)?;
    for (i, event) in events.iter().enumerate() {
        println!("{:>3}  {event}", i + 1);
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct RehearsalOptions {
    pub chunk_size: usize,
    pub max_ticks: usize,
}

impl Default for RehearsalOptions {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024,
            max_ticks: 1000,
        }
    }
}

type EventLog = Rc<RefCell<Vec<String>>>;

/// Run a launch to the engine's `main`. Returns the recorded events, or an
/// error naming what the launch is still waiting for.
pub fn rehearse(
    config: &LauncherConfig,
    args: LaunchArgs,
    options: &RehearsalOptions,
) -> anyhow::Result<Vec<String>> {
    if options.chunk_size == 0 {
        anyhow::bail!("Chunk size must be positive");
    }
    let events = EventLog::default();
    let frames = QueuedFrames::new();
    let engine = Rc::new(DryRunEngine::new(events.clone()));
    let packs = Rc::new(LocalPackSource::new(options.chunk_size));
    let host = Host {
        engine: engine.clone(),
        frontend: Rc::new(LogFrontend {
            events: events.clone(),
        }),
        packs: packs.clone(),
        clock: frames.clone(),
    };
    let launcher = Launcher::new(config, host)?;

    let settle = || {
        loop {
            let delivered = packs.pump();
            let ticks = frames.run_until_idle(options.max_ticks);
            if delivered == 0 && ticks == 0 {
                break;
            }
        }
    };

    settle();
    if !engine.loaded.get() {
        anyhow::bail!("Engine module load was never requested");
    }
    launcher.module_ready()?;
    settle();
    if !launcher.is_ready() {
        anyhow::bail!("Launcher never became ready");
    }

    let wanted: Vec<String> = config
        .default_packs
        .iter()
        .chain(&args.packs)
        .chain(Some(&args.gameid).filter(|g| !g.is_empty()))
        .cloned()
        .collect();
    launcher.launch(args)?;
    settle();

    if !launcher.is_main_called() {
        let waiting: Vec<&str> = wanted
            .iter()
            .filter(|p| launcher.check_pack(p) == PackStatus::Downloading)
            .map(String::as_str)
            .collect();
        anyhow::bail!(
            "Launch stalled before the engine started; waiting on packs: {}",
            if waiting.is_empty() {
                "none".to_string()
            } else {
                waiting.join(", ")
            }
        );
    }
    let recorded = events.borrow().clone();
    Ok(recorded)
}

struct DryRunEngine {
    events: EventLog,
    loaded: Cell<bool>,
}

impl DryRunEngine {
    fn new(events: EventLog) -> Self {
        Self {
            events,
            loaded: Cell::new(false),
        }
    }

    fn record(&self, event: String) {
        log::info!("engine: {event}");
        self.events.borrow_mut().push(event);
    }
}

impl Engine for DryRunEngine {
    fn load(&self) {
        self.loaded.set(true);
        self.record("load".to_string());
    }

    fn invoke_main(&self, argv: &[String]) {
        self.record(format!("main {}", argv.join(" ")));
    }

    fn install_pack(&self, name: &str, data: &[u8]) {
        self.record(format!("install {name} ({} bytes)", data.len()));
    }

    fn pause(&self) {
        self.record("pause".to_string());
    }

    fn unpause(&self) {
        self.record("unpause".to_string());
    }

    fn set_conf(&self, contents: &str) {
        let settings: Vec<&str> = contents.lines().collect();
        self.record(format!("conf {}", settings.join("; ")));
    }

    fn init_sound(&self) {
        self.record("sound".to_string());
    }

    fn init_sockets(&self, proxy_url: &str, vpn: Option<&str>) {
        match vpn {
            Some(vpn) => self.record(format!("sockets {proxy_url} vpn={vpn}")),
            None => self.record(format!("sockets {proxy_url}")),
        }
    }
}

struct LogFrontend {
    events: EventLog,
}

impl Frontend for LogFrontend {
    fn ready(&self) {
        self.events.borrow_mut().push("ready".to_string());
    }

    fn error(&self, message: &str) -> bool {
        log::error!("{message}");
        self.events.borrow_mut().push(format!("error {message}"));
        true
    }

    fn alert(&self, message: &str) {
        log::warn!("alert: {message}");
    }

    fn progress(&self, task: &str, fraction: f64) {
        log::debug!("{task}: {:.0}%", fraction * 100.0);
    }

    fn download_totals(&self, totals: DownloadTotals) {
        if !totals.in_progress() {
            log::info!("downloads complete ({} bytes)", totals.needed);
        }
    }

    fn print(&self, text: &str) {
        println!("{text}");
    }

    fn activate(&self) {
        self.events.borrow_mut().push("activate".to_string());
    }
}

/// Reads packs from the local filesystem. Downloads queue until
/// [`pump`](Self::pump), like network reads completing on a later tick.
struct LocalPackSource {
    chunk_size: usize,
    queue: RefCell<VecDeque<PackDownload>>,
}

impl LocalPackSource {
    fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            queue: RefCell::new(VecDeque::new()),
        }
    }

    /// Deliver every queued download. Returns how many were handled.
    fn pump(&self) -> usize {
        let downloads: Vec<_> = self.queue.borrow_mut().drain(..).collect();
        let count = downloads.len();
        for mut download in downloads {
            match self.stream(&mut download) {
                Ok(()) => {
                    if let Err(e) = download.finish() {
                        log::error!("{e}");
                    }
                }
                Err(e) => {
                    let message = format!("{}: {e}", download.url());
                    download.fail(&message);
                }
            }
        }
        count
    }

    fn stream(&self, download: &mut PackDownload) -> std::io::Result<()> {
        let mut file = std::fs::File::open(download.url())?;
        download.set_content_length(Some(file.metadata()?.len()));
        let mut chunk = vec![0; self.chunk_size];
        loop {
            let n = file.read(&mut chunk)?;
            if n == 0 {
                return Ok(());
            }
            download.push_chunk(chunk[..n].to_vec());
        }
    }
}

impl PackSource for LocalPackSource {
    fn fetch(&self, download: PackDownload) {
        log::debug!("queued {}", download.url());
        self.queue.borrow_mut().push_back(download);
    }
}
