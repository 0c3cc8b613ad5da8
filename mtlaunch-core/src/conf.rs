/// In-memory engine configuration, rendered as the engine's `key = value`
/// settings file.
///
/// Keys keep the position of their first insertion; setting an existing key
/// replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConf {
    entries: Vec<(String, String)>,
}

impl EngineConf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{k} = {v}\n"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_keeps_insertion_order() {
        let mut conf = EngineConf::new();
        conf.set("viewing_range", "140");
        conf.set("language", "de");
        conf.set("viewing_range", "60");
        assert_eq!(conf.len(), 2);
        assert_eq!(conf.get("viewing_range"), Some("60"));
        assert_eq!(conf.render(), "viewing_range = 60\nlanguage = de\n");
    }

    #[test]
    fn test_empty_renders_nothing() {
        let conf = EngineConf::new();
        assert!(conf.is_empty());
        assert_eq!(conf.render(), "");
        assert_eq!(conf.get("missing"), None);
    }
}
