//! mtlaunch core
//!
//! Sequences the startup of a browser-hosted build of the engine: a
//! condition-based scheduler gates the module load, pack installs and the
//! call into the engine's `main`. Everything browser-specific lives behind
//! the traits in [`host`], so the whole launch can run natively.

pub mod args;
pub mod conf;
pub mod config;
pub mod console;
pub mod error;
pub mod host;
pub mod language;
pub mod launcher;
pub mod packs;
pub mod scheduler;

pub use args::LaunchArgs;
pub use config::LauncherConfig;
pub use error::LaunchError;
pub use host::{Engine, Frontend, Host, PackSource};
pub use launcher::{Launcher, PackDownload};
pub use packs::{DownloadTotals, PackStatus};
pub use scheduler::{FrameClock, LaunchScheduler, QueuedFrames, SchedulerError};
