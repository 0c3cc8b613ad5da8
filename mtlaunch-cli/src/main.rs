mod cli;
mod commands;
mod profile;

use clap::Parser;

use crate::cli::{Cli, Command};
use crate::profile::ProfileContext;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let ctx = ProfileContext::discover(cli.profile.as_deref())?;

    match cli.command {
        Command::Url { base, launch } => commands::url_cmd::run(&ctx, base, &launch),
        Command::Conf => commands::conf_cmd::run(&ctx),
        Command::Langs { lang, prefer } => commands::langs_cmd::run(lang.as_deref(), &prefer),
        Command::Rehearse {
            packs_dir,
            chunk_size,
            max_ticks,
            launch,
        } => commands::rehearse_cmd::run(&ctx, packs_dir, chunk_size, max_ticks, &launch),
    }
}
