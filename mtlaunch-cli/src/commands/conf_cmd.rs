use mtlaunch_core::conf::EngineConf;
use mtlaunch_core::language;
use mtlaunch_core::LauncherConfig;

use crate::profile::ProfileContext;

pub fn run(ctx: &ProfileContext) -> anyhow::Result<()> {
    print!("{}", engine_conf(&ctx.profile.launcher)?.render());
    Ok(())
}

/// The settings a launch with `config` would hand the engine.
pub fn engine_conf(config: &LauncherConfig) -> anyhow::Result<EngineConf> {
    let mut conf = EngineConf::new();
    for (key, value) in &config.conf {
        conf.set(key.as_str(), value.as_str());
    }
    if let Some(lang) = &config.language {
        if !language::is_supported(lang) {
            anyhow::bail!("Unsupported language in profile: {lang}");
        }
        conf.set("language", lang.as_str());
    }
    Ok(conf)
}
