//! Languages the engine ships translations for, and picking a default one
//! from the page's request and the browser's preferences.

use crate::error::LaunchError;

pub const FALLBACK_LANGUAGE: &str = "en";

/// `(code, display name)` pairs, sorted by code.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("be", "Беларуская [be]"),
    ("bg", "Български [bg]"),
    ("ca", "Català [ca]"),
    ("cs", "Česky [cs]"),
    ("cy", "Cymraeg [cy]"),
    ("da", "Dansk [da]"),
    ("de", "Deutsch [de]"),
    ("el", "Ελληνικά [el]"),
    ("en", "English [en]"),
    ("eo", "Esperanto [eo]"),
    ("es", "Español [es]"),
    ("et", "Eesti [et]"),
    ("eu", "Euskara [eu]"),
    ("fi", "Suomi [fi]"),
    ("fil", "Wikang Filipino [fil]"),
    ("fr", "Français [fr]"),
    ("gd", "Gàidhlig [gd]"),
    ("gl", "Galego [gl]"),
    ("hu", "Magyar [hu]"),
    ("id", "Bahasa Indonesia [id]"),
    ("it", "Italiano [it]"),
    ("ja", "日本語 [ja]"),
    ("jbo", "Lojban [jbo]"),
    ("kk", "Қазақша [kk]"),
    ("ko", "한국어 [ko]"),
    ("ky", "Kırgızca / Кыргызча [ky]"),
    ("lt", "Lietuvių [lt]"),
    ("lv", "Latviešu [lv]"),
    ("mn", "Монгол [mn]"),
    ("mr", "मराठी [mr]"),
    ("ms", "Bahasa Melayu [ms]"),
    ("nb", "Norsk Bokmål [nb]"),
    ("nl", "Nederlands [nl]"),
    ("nn", "Norsk Nynorsk [nn]"),
    ("oc", "Occitan [oc]"),
    ("pl", "Polski [pl]"),
    ("pt", "Português [pt]"),
    ("pt_BR", "Português do Brasil [pt_BR]"),
    ("ro", "Română [ro]"),
    ("ru", "Русский [ru]"),
    ("sk", "Slovenčina [sk]"),
    ("sl", "Slovenščina [sl]"),
    ("sr_Cyrl", "Српски [sr_Cyrl]"),
    ("sr_Latn", "Srpski (Latinica) [sr_Latn]"),
    ("sv", "Svenska [sv]"),
    ("sw", "Kiswahili [sw]"),
    ("tr", "Türkçe [tr]"),
    ("tt", "Tatarça [tt]"),
    ("uk", "Українська [uk]"),
    ("vi", "Tiếng Việt [vi]"),
    ("zh_CN", "中文 (简体) [zh_CN]"),
    ("zh_TW", "正體中文 (繁體) [zh_TW]"),
];

pub fn is_supported(code: &str) -> bool {
    display_name(code).is_some()
}

pub fn display_name(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

fn lookup(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(c, _)| *c)
}

/// Pick the language to start the engine in.
///
/// An explicit `requested` code (e.g. a `lang` query parameter) must be
/// supported; otherwise an error is returned and callers usually fall back to
/// [`FALLBACK_LANGUAGE`]. Without a request, browser preferences are tried in
/// order: exact match, `lang_Script` prefix, bare language code. If none of
/// those hit, the first supported code sharing a language code with any
/// preference wins.
pub fn default_language<S: AsRef<str>>(
    requested: Option<&str>,
    preferred: &[S],
) -> Result<&'static str, LaunchError> {
    if let Some(code) = requested {
        return lookup(code).ok_or_else(|| LaunchError::UnsupportedLanguage(code.to_string()));
    }

    let mut fuzzy = Vec::new();
    for candidate in preferred {
        let candidate = candidate.as_ref().replace('-', "_");
        if let Some(code) = lookup(&candidate) {
            return Ok(code);
        }

        let parts: Vec<&str> = candidate.split('_').collect();
        if parts.len() > 2 {
            if let Some(code) = lookup(&parts[..2].join("_")) {
                return Ok(code);
            }
        }
        if parts.len() > 1 {
            if let Some(code) = lookup(parts[0]) {
                return Ok(code);
            }
        }

        fuzzy.extend(
            SUPPORTED_LANGUAGES
                .iter()
                .map(|(code, _)| *code)
                .filter(|code| code.split('_').next() == Some(parts[0])),
        );
    }

    Ok(fuzzy.first().copied().unwrap_or(FALLBACK_LANGUAGE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted_and_unique() {
        assert_eq!(SUPPORTED_LANGUAGES.len(), 52);
        for pair in SUPPORTED_LANGUAGES.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} before {}", pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("de"), Some("Deutsch [de]"));
        assert!(is_supported("pt_BR"));
        assert!(!is_supported("xx"));
    }

    #[test]
    fn test_requested_language_must_be_supported() {
        assert_eq!(default_language::<&str>(Some("fr"), &["de"]), Ok("fr"));
        assert_eq!(
            default_language::<&str>(Some("klingon"), &["de"]),
            Err(LaunchError::UnsupportedLanguage("klingon".into()))
        );
    }

    #[test]
    fn test_exact_and_region_matches() {
        assert_eq!(default_language(None, &["pt-BR", "en"]), Ok("pt_BR"));
        assert_eq!(default_language(None, &["sr-Latn-RS"]), Ok("sr_Latn"));
        assert_eq!(default_language(None, &["de-AT"]), Ok("de"));
    }

    #[test]
    fn test_fuzzy_match_is_last_resort() {
        // "zh" alone has no exact entry; a later exact match still wins.
        assert_eq!(default_language(None, &["zh", "ja"]), Ok("ja"));
        assert_eq!(default_language(None, &["zh"]), Ok("zh_CN"));
    }

    #[test]
    fn test_falls_back_to_english() {
        assert_eq!(default_language(None, &["xx-YY"]), Ok("en"));
        assert_eq!(default_language::<String>(None, &[]), Ok("en"));
    }
}
