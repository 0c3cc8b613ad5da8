use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mtlaunch",
    about = "Companion tool for the mtlaunch browser launcher",
    version
)]
pub struct Cli {
    /// Launch profile to use instead of the nearest mtlaunch.toml
    #[arg(long, global = true)]
    pub profile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print a launch URL
    Url {
        /// Page the query string is appended to (overrides the profile)
        #[arg(long)]
        base: Option<String>,
        #[command(flatten)]
        launch: LaunchFlags,
    },
    /// Print the engine configuration a launch would write
    Conf,
    /// List supported languages, or resolve the default one
    Langs {
        /// Explicitly requested language
        #[arg(long)]
        lang: Option<String>,
        /// Preferred languages, most preferred first (e.g. pt-BR)
        #[arg(long = "prefer")]
        prefer: Vec<String>,
    },
    /// Run a complete launch headlessly against local pack files
    Rehearse {
        /// Directory holding <name>.pack files (overrides the profile)
        #[arg(long)]
        packs_dir: Option<PathBuf>,
        /// Bytes delivered per simulated network read
        #[arg(long, default_value_t = 64 * 1024)]
        chunk_size: usize,
        /// Frames to run before the launch counts as stalled
        #[arg(long, default_value_t = 1000)]
        max_ticks: usize,
        #[command(flatten)]
        launch: LaunchFlags,
    },
}

/// Launch options given on the command line. Set values override the
/// profile's `[launch]` table.
#[derive(Args, Debug, Default, Clone)]
pub struct LaunchFlags {
    /// Skip the main menu
    #[arg(long)]
    pub go: bool,
    /// Host a server instead of joining one
    #[arg(long)]
    pub server: bool,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub gameid: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub port: Option<u16>,
    /// Extra pack to load (repeatable)
    #[arg(long = "pack")]
    pub packs: Vec<String>,
    /// Extra engine argument (repeatable)
    #[arg(long = "extra", allow_hyphen_values = true)]
    pub extra: Vec<String>,
}
