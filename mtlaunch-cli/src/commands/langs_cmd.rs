use mtlaunch_core::language::{self, SUPPORTED_LANGUAGES};

pub fn run(lang: Option<&str>, prefer: &[String]) -> anyhow::Result<()> {
    if lang.is_none() && prefer.is_empty() {
        for (code, name) in SUPPORTED_LANGUAGES {
            println!("{code:<8}{name}");
        }
        return Ok(());
    }
    println!("{}", resolve(lang, prefer)?);
    Ok(())
}

/// The default language as `code  display name`.
fn resolve(lang: Option<&str>, prefer: &[String]) -> anyhow::Result<String> {
    let code = language::default_language(lang, prefer)?;
    let name = language::display_name(code).unwrap_or(code);
    Ok(format!("{code:<8}{name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_from_preferences() {
        let prefer = vec!["pt-BR".to_string(), "en-US".to_string()];
        let line = resolve(None, &prefer).unwrap();
        assert!(line.starts_with("pt_BR"), "{line}");
    }

    #[test]
    fn test_resolve_rejects_unknown_request() {
        assert!(resolve(Some("xx"), &[]).is_err());
    }
}
