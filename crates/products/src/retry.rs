//! Bounded catalog loading.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogError, CatalogHandle, CatalogStore};

/// Fixed-delay retry policy for catalog loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt (0 = no retries).
    pub max_retries: u32,
    /// Delay between attempts.
    #[serde(with = "millis")]
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Check if another attempt is allowed after `attempt` attempts.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt <= self.max_retries
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

/// What happened when loading the catalog into a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Catalog published to the handle.
    Loaded { count: usize, attempts: u32 },
    /// Handle already held a catalog; the store was not consulted.
    AlreadyLoaded,
    /// Every attempt failed; the handle stays not-ready.
    Exhausted { attempts: u32, last_error: CatalogError },
}

/// Loads a catalog store into a `CatalogHandle` under a `RetryPolicy`.
#[derive(Debug)]
pub struct CatalogLoader<S> {
    store: S,
    policy: RetryPolicy,
}

impl<S: CatalogStore> CatalogLoader<S> {
    pub fn new(store: S, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load with retry, sleeping through `sleep` between attempts.
    ///
    /// A store error is retried; a successful empty catalog is not (it is a
    /// real, loaded catalog with zero products).
    pub fn load_into(&self, handle: &CatalogHandle, mut sleep: impl FnMut(Duration)) -> LoadOutcome {
        if handle.is_loaded() {
            return LoadOutcome::AlreadyLoaded;
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.store.load_catalog() {
                Ok(products) => {
                    let count = products.len();
                    return match handle.publish(products) {
                        Ok(()) => {
                            tracing::info!(count, attempt, "catalog ready");
                            LoadOutcome::Loaded { count, attempts: attempt }
                        }
                        Err(_) => LoadOutcome::AlreadyLoaded,
                    };
                }
                Err(err) if self.policy.should_retry(attempt) => {
                    tracing::warn!(attempt, error = %err, delay_ms = self.policy.delay.as_millis() as u64, "catalog load failed; retrying");
                    sleep(self.policy.delay);
                }
                Err(err) => {
                    tracing::error!(attempt, error = %err, "catalog load failed; giving up");
                    return LoadOutcome::Exhausted {
                        attempts: attempt,
                        last_error: err,
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalogStore;

    #[test]
    fn retries_once_with_fixed_delay_then_loads() {
        let store = InMemoryCatalogStore::new(Vec::new()).failing_first(1);
        let loader = CatalogLoader::new(store, RetryPolicy::default());
        let handle = CatalogHandle::new();
        let mut slept = Vec::new();

        let outcome = loader.load_into(&handle, |d| slept.push(d));

        assert_eq!(outcome, LoadOutcome::Loaded { count: 0, attempts: 2 });
        assert_eq!(slept, vec![Duration::from_millis(500)]);
        assert!(handle.is_loaded());
    }

    #[test]
    fn exhausted_retries_leave_handle_not_ready() {
        let store = InMemoryCatalogStore::new(Vec::new()).failing_first(5);
        let loader = CatalogLoader::new(store, RetryPolicy::fixed(2, Duration::from_millis(10)));
        let handle = CatalogHandle::new();
        let mut sleeps = 0;

        let outcome = loader.load_into(&handle, |_| sleeps += 1);

        assert!(matches!(outcome, LoadOutcome::Exhausted { attempts: 3, .. }));
        assert_eq!(sleeps, 2);
        assert!(!handle.is_loaded());
    }

    #[test]
    fn no_retry_policy_gives_up_after_first_failure() {
        let store = InMemoryCatalogStore::new(Vec::new()).failing_first(1);
        let loader = CatalogLoader::new(store, RetryPolicy::no_retry());
        let outcome = loader.load_into(&CatalogHandle::new(), |_| panic!("must not sleep"));
        assert!(matches!(outcome, LoadOutcome::Exhausted { attempts: 1, .. }));
    }

    #[test]
    fn already_loaded_handle_skips_the_store() {
        let store = InMemoryCatalogStore::new(Vec::new()).failing_first(10);
        let loader = CatalogLoader::new(store, RetryPolicy::default());
        let handle = CatalogHandle::loaded(Vec::new());
        assert_eq!(loader.load_into(&handle, |_| {}), LoadOutcome::AlreadyLoaded);
    }

    #[test]
    fn policy_deserializes_delay_in_millis() {
        let policy: RetryPolicy =
            serde_json::from_str(r#"{ "max_retries": 3, "delay": 250 }"#).unwrap();
        assert_eq!(policy, RetryPolicy::fixed(3, Duration::from_millis(250)));
    }
}
