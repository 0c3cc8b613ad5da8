use std::path::{Path, PathBuf};

use mtlaunch_core::{LaunchArgs, LauncherConfig};
use serde::{Deserialize, Serialize};

use crate::cli::LaunchFlags;

pub const PROFILE_FILE: &str = "mtlaunch.toml";

/// Contents of `mtlaunch.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Page launch URLs are built against.
    pub base_url: Option<String>,
    pub launcher: LauncherConfig,
    pub launch: LaunchProfile,
}

/// The `[launch]` table: default launch options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchProfile {
    pub go: bool,
    pub server: bool,
    pub name: String,
    pub password: String,
    pub gameid: String,
    pub address: String,
    pub port: Option<u16>,
    pub packs: Vec<String>,
    pub extra: Vec<String>,
}

/// The resolved profile.
#[derive(Debug, Clone)]
pub struct ProfileContext {
    /// Directory relative paths in the profile resolve against.
    pub root: PathBuf,
    /// The file read, if any.
    pub path: Option<PathBuf>,
    pub profile: Profile,
}

impl ProfileContext {
    /// Use `explicit` if given, else the nearest `mtlaunch.toml` from the
    /// current directory, else built-in defaults.
    pub fn discover(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => Self::discover_from(&std::env::current_dir()?),
        }
    }

    pub fn discover_from(start: &Path) -> anyhow::Result<Self> {
        let mut dir = start.to_path_buf();
        loop {
            let candidate = dir.join(PROFILE_FILE);
            if candidate.is_file() {
                return Self::load(&candidate);
            }
            if !dir.pop() {
                log::debug!("no {PROFILE_FILE} found, using defaults");
                return Ok(Self {
                    root: start.to_path_buf(),
                    path: None,
                    profile: Profile::default(),
                });
            }
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.is_file() {
            anyhow::bail!("Profile not found: {}", path.display());
        }
        let content = std::fs::read_to_string(path)?;
        let profile: Profile = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid profile {}: {e}", path.display()))?;
        log::info!("using profile {}", path.display());
        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Self {
            root,
            path: Some(path.to_path_buf()),
            profile,
        })
    }

    /// Profile launch options with the command line applied on top.
    pub fn launch_args(&self, flags: &LaunchFlags) -> LaunchArgs {
        let launch = &self.profile.launch;
        let pick = |flag: &Option<String>, profile: &String| {
            flag.clone().unwrap_or_else(|| profile.clone())
        };
        let mut packs = launch.packs.clone();
        for pack in &flags.packs {
            if !packs.contains(pack) {
                packs.push(pack.clone());
            }
        }
        let mut extra = launch.extra.clone();
        extra.extend(flags.extra.iter().cloned());

        LaunchArgs {
            go: flags.go || launch.go,
            server: flags.server || launch.server,
            name: pick(&flags.name, &launch.name),
            password: pick(&flags.password, &launch.password),
            gameid: pick(&flags.gameid, &launch.gameid),
            address: pick(&flags.address, &launch.address),
            port: flags.port.or(launch.port),
            packs,
            extra,
        }
    }

    /// Pack directory for local use, resolved against the profile's root.
    pub fn packs_dir(&self) -> PathBuf {
        self.root.join(self.profile.launcher.packs_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
base_url = "https://play.example.com/"

[launcher]
release_dir = "release"
language = "de"

[launcher.conf]
viewing_range = "100"

[launch]
gameid = "mineclone2"
name = "sam"
packs = ["irrlicht_extras"]
"#;

    #[test]
    fn test_discover_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PROFILE_FILE), SAMPLE).unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        let ctx = ProfileContext::discover_from(&nested).unwrap();
        assert_eq!(ctx.root, dir.path());
        assert_eq!(ctx.path.as_deref(), Some(dir.path().join(PROFILE_FILE).as_path()));
        assert_eq!(ctx.profile.base_url.as_deref(), Some("https://play.example.com/"));
        assert_eq!(ctx.profile.launcher.language.as_deref(), Some("de"));
        assert_eq!(ctx.profile.launcher.default_packs, vec!["base"]);
        assert_eq!(ctx.packs_dir(), dir.path().join("release/packs"));
    }

    #[test]
    fn test_discover_without_profile_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("x/y");
        std::fs::create_dir_all(&nested).unwrap();
        let ctx = ProfileContext::discover_from(&nested).unwrap();
        // A profile further up the real filesystem would be picked up.
        if ctx.path.is_none() {
            assert_eq!(ctx.root, nested);
            assert!(ctx.profile.base_url.is_none());
        }
    }

    #[test]
    fn test_explicit_missing_profile_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = ProfileContext::discover(Some(&dir.path().join("nope.toml")));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Profile not found"));
    }

    #[test]
    fn test_invalid_profile_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROFILE_FILE);
        std::fs::write(&path, "launch = 3").unwrap();
        let err = ProfileContext::load(&path).unwrap_err().to_string();
        assert!(err.contains("Invalid profile"));
    }

    #[test]
    fn test_flags_override_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROFILE_FILE);
        std::fs::write(&path, SAMPLE).unwrap();
        let ctx = ProfileContext::load(&path).unwrap();

        let flags = LaunchFlags {
            go: true,
            name: Some("alex".into()),
            port: Some(30001),
            packs: vec!["irrlicht_extras".into(), "sounds".into()],
            ..LaunchFlags::default()
        };
        let args = ctx.launch_args(&flags);
        assert!(args.go);
        assert_eq!(args.name, "alex");
        assert_eq!(args.gameid, "mineclone2");
        assert_eq!(args.port, Some(30001));
        assert_eq!(args.packs, vec!["irrlicht_extras", "sounds"]);
    }
}
