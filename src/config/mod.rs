use dashmap::DashMap;
use std::env;
use std::sync::Arc;

/// Configuration service
///
/// A flat key/value view over the process environment. Register a prepared
/// instance with `CodeUnit::instance` to make it injectable.
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    pub fn new() -> Self {
        let service = Self::default();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }

    /// Entries whose key starts with `prefix`, with the prefix stripped.
    pub fn entries_with_prefix(&self, prefix: &str) -> Vec<(String, String)> {
        let mut entries: Vec<_> = self
            .config
            .iter()
            .filter_map(|entry| {
                entry
                    .key()
                    .strip_prefix(prefix)
                    .filter(|rest| !rest.is_empty())
                    .map(|rest| (rest.to_string(), entry.value().clone()))
            })
            .collect();
        entries.sort();
        entries
    }
}
