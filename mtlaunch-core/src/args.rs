use url::form_urlencoded;

use crate::packs::{is_builtin_game, BASE_PACK};

/// Command-line arguments handed to the engine's entry point, plus the packs
/// the chosen game needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchArgs {
    /// Skip the main menu and join/start immediately.
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

impl LaunchArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine argv, without the program name.
    pub fn to_argv(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.go {
            args.push("--go".to_string());
        }
        if self.server {
            args.push("--server".to_string());
        }
        for (flag, value) in self.string_options() {
            args.push(format!("--{flag}"));
            args.push(value.to_string());
        }
        if let Some(port) = self.port {
            args.push("--port".to_string());
            args.push(port.to_string());
        }
        args.extend(self.extra.iter().cloned());
        args
    }

    /// Encode as a URL query string (without the leading `?`).
    pub fn to_query_string(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if self.go {
            query.append_pair("go", "");
        }
        if self.server {
            query.append_pair("server", "");
        }
        for (key, value) in self.string_options() {
            query.append_pair(key, value);
        }
        if let Some(port) = self.port {
            query.append_pair("port", &port.to_string());
        }
        let extra_packs: Vec<&str> = self
            .packs
            .iter()
            .map(String::as_str)
            .filter(|p| *p != BASE_PACK && !is_builtin_game(p) && *p != self.gameid)
            .collect();
        if !extra_packs.is_empty() {
            query.append_pair("packs", &extra_packs.join(","));
        }
        if !self.extra.is_empty() {
            query.append_pair("extra", &self.extra.join(","));
        }
        query.finish()
    }

    /// Decode a query string as produced by [`LaunchArgs::to_query_string`].
    /// A leading `?` is accepted. The first value of a repeated key wins.
    pub fn from_query_string(qs: &str) -> Self {
        let pairs: Vec<(String, String)> =
            form_urlencoded::parse(qs.trim_start_matches('?').as_bytes())
                .into_owned()
                .collect();
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        let mut args = LaunchArgs {
            go: get("go").is_some(),
            server: get("server").is_some(),
            name: get("name").unwrap_or_default().to_string(),
            password: get("password").unwrap_or_default().to_string(),
            gameid: get("gameid").unwrap_or_default().to_string(),
            address: get("address").unwrap_or_default().to_string(),
            ..Self::default()
        };
        if let Some(port) = get("port") {
            match port.parse() {
                Ok(port) => args.port = Some(port),
                Err(_) => log::warn!("ignoring invalid port '{port}' in launch query"),
            }
        }
        if !args.gameid.is_empty() && !is_builtin_game(&args.gameid) && args.gameid != BASE_PACK {
            args.packs.push(args.gameid.clone());
        }
        if let Some(packs) = get("packs") {
            for pack in packs.split(',').filter(|p| !p.is_empty()) {
                if !args.packs.iter().any(|p| p == pack) {
                    args.packs.push(pack.to_string());
                }
            }
        }
        if let Some(extra) = get("extra") {
            args.extra = extra
                .split(',')
                .filter(|e| !e.is_empty())
                .map(str::to_string)
                .collect();
        }
        args
    }

    fn string_options(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        [
            ("name", self.name.as_str()),
            ("password", self.password.as_str()),
            ("gameid", self.gameid.as_str()),
            ("address", self.address.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LaunchArgs {
        LaunchArgs {
            go: true,
            name: "singleplayer".into(),
            gameid: "mineclone2".into(),
            address: "play.example.net".into(),
            port: Some(30000),
            packs: vec!["mineclone2".into(), "textures".into()],
            extra: vec!["--verbose".into()],
            ..LaunchArgs::default()
        }
    }

    #[test]
    fn test_to_argv_order() {
        assert_eq!(
            sample().to_argv(),
            vec![
                "--go",
                "--name",
                "singleplayer",
                "--gameid",
                "mineclone2",
                "--address",
                "play.example.net",
                "--port",
                "30000",
                "--verbose",
            ]
        );
    }

    #[test]
    fn test_empty_args_produce_empty_argv() {
        assert!(LaunchArgs::new().to_argv().is_empty());
        assert_eq!(LaunchArgs::new().to_query_string(), "");
    }

    #[test]
    fn test_query_string_drops_implied_packs() {
        let mut args = sample();
        args.packs.push("base".into());
        args.packs.push("devtest".into());
        let qs = args.to_query_string();
        assert_eq!(
            qs,
            "go=&name=singleplayer&gameid=mineclone2&address=play.example.net\
             &port=30000&packs=textures&extra=--verbose"
        );
    }

    #[test]
    fn test_query_string_encodes_values() {
        let args = LaunchArgs {
            name: "two words".into(),
            password: "p&ss=1".into(),
            ..LaunchArgs::default()
        };
        assert_eq!(args.to_query_string(), "name=two+words&password=p%26ss%3D1");
    }

    #[test]
    fn test_from_query_string_restores_args() {
        let qs = sample().to_query_string();
        assert_eq!(LaunchArgs::from_query_string(&format!("?{qs}")), sample());
    }

    #[test]
    fn test_from_query_string_builtin_game_is_not_a_pack() {
        let args = LaunchArgs::from_query_string("gameid=devtest&packs=a,a,b,");
        assert_eq!(args.gameid, "devtest");
        assert_eq!(args.packs, vec!["a", "b"]);
        assert!(args.extra.is_empty());
    }

    #[test]
    fn test_from_query_string_ignores_bad_port() {
        let args = LaunchArgs::from_query_string("server&port=notaport");
        assert!(args.server);
        assert!(!args.go);
        assert_eq!(args.port, None);
    }
}
