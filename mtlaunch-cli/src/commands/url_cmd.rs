use mtlaunch_core::LaunchArgs;

use crate::cli::LaunchFlags;
use crate::profile::ProfileContext;

pub fn run(ctx: &ProfileContext, base: Option<String>, flags: &LaunchFlags) -> anyhow::Result<()> {
    let Some(base) = base.or_else(|| ctx.profile.base_url.clone()) else {
        anyhow::bail!("No base URL. Pass --base or set base_url in mtlaunch.toml");
    };
    println!("{}", launch_url(&base, &ctx.launch_args(flags)));
    Ok(())
}

/// `base` with the launch query appended.
pub fn launch_url(base: &str, args: &LaunchArgs) -> String {
    let query = args.to_query_string();
    if query.is_empty() {
        return base.to_string();
    }
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_url() {
        let args = LaunchArgs {
            go: true,
            address: "mt.example.com".into(),
            port: Some(30000),
            ..LaunchArgs::default()
        };
        let url = launch_url("https://play.example.com/", &args);
        assert_eq!(
            url,
            "https://play.example.com/?go=&address=mt.example.com&port=30000"
        );
        assert_eq!(
            launch_url("https://play.example.com/?theme=dark", &args),
            "https://play.example.com/?theme=dark&go=&address=mt.example.com&port=30000"
        );
    }

    #[test]
    fn test_launch_url_without_options() {
        assert_eq!(launch_url("index.html", &LaunchArgs::new()), "index.html");
    }
}
