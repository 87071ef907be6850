//! Storefront configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use kulinastra_facets::RupiahFormatter;
use kulinastra_products::{CatalogLoader, JsonFileCatalogStore, RetryPolicy};

pub const DEFAULT_NO_RESULTS_MESSAGE: &str = "Tidak ada produk yang sesuai dengan filter.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    /// Location of the `{ "products": [...] }` catalog document.
    pub catalog_path: PathBuf,
    /// Retry policy for the initial catalog load.
    pub catalog_retry: RetryPolicy,
    /// How many control events to hold while the catalog loads.
    pub pending_event_capacity: usize,
    /// Text shown in the results region when nothing matches.
    pub no_results_message: String,
    /// Currency prefix used in price badges.
    pub currency_prefix: String,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("app/data.json"),
            catalog_retry: RetryPolicy::default(),
            pending_event_capacity: 32,
            no_results_message: DEFAULT_NO_RESULTS_MESSAGE.to_string(),
            currency_prefix: "Rp".to_string(),
        }
    }
}

impl StorefrontConfig {
    /// Defaults overlaid with `KULINASTRA_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup` (an environment-like key/value source).
    ///
    /// Unparsable values are logged and ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup("KULINASTRA_CATALOG_PATH") {
            self.catalog_path = PathBuf::from(path);
        }
        if let Some(ms) = parse_var(&lookup, "KULINASTRA_CATALOG_RETRY_MS") {
            self.catalog_retry.delay = Duration::from_millis(ms);
        }
        if let Some(n) = parse_var(&lookup, "KULINASTRA_CATALOG_RETRY_ATTEMPTS") {
            self.catalog_retry.max_retries = n;
        }
        if let Some(n) = parse_var(&lookup, "KULINASTRA_PENDING_EVENTS") {
            self.pending_event_capacity = n;
        }
        self
    }

    pub fn formatter(&self) -> RupiahFormatter {
        RupiahFormatter::new(self.currency_prefix.clone())
    }

    /// Loader for the catalog file at `catalog_path` under `catalog_retry`.
    pub fn catalog_loader(&self) -> CatalogLoader<JsonFileCatalogStore> {
        CatalogLoader::new(
            JsonFileCatalogStore::new(&self.catalog_path),
            self.catalog_retry,
        )
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable configuration value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_storefront() {
        let config = StorefrontConfig::default();
        assert_eq!(config.catalog_retry.delay, Duration::from_millis(500));
        assert_eq!(config.catalog_retry.max_retries, 1);
        assert_eq!(config.no_results_message, DEFAULT_NO_RESULTS_MESSAGE);
    }

    #[test]
    fn overrides_apply_and_bad_values_are_ignored() {
        let config = StorefrontConfig::default().with_overrides(lookup(&[
            ("KULINASTRA_CATALOG_PATH", "/srv/data.json"),
            ("KULINASTRA_CATALOG_RETRY_MS", "250"),
            ("KULINASTRA_CATALOG_RETRY_ATTEMPTS", "many"),
            ("KULINASTRA_PENDING_EVENTS", "8"),
        ]));

        assert_eq!(config.catalog_path, PathBuf::from("/srv/data.json"));
        assert_eq!(config.catalog_retry.delay, Duration::from_millis(250));
        assert_eq!(config.catalog_retry.max_retries, 1);
        assert_eq!(config.pending_event_capacity, 8);
    }

    #[test]
    fn deserializes_partial_json() {
        let config: StorefrontConfig =
            serde_json::from_str(r#"{ "currency_prefix": "IDR" }"#).unwrap();
        assert_eq!(config.currency_prefix, "IDR");
        assert_eq!(config.pending_event_capacity, 32);
    }

    #[test]
    fn catalog_loader_reads_the_configured_path() {
        let config = StorefrontConfig::default()
            .with_overrides(lookup(&[("KULINASTRA_CATALOG_PATH", "/srv/kulinastra/data.json")]));
        let loader = config.catalog_loader();
        assert_eq!(
            loader.store().path(),
            std::path::Path::new("/srv/kulinastra/data.json")
        );
    }
}
