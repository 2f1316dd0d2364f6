use crate::agents::declaration::Identifier;
use crate::error::{Result, TflvError};
use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

pub mod factory;
pub use factory::ResolverFactory;

/// Answers "what is the latest acceptable version of this artifact".
pub trait VersionResolver: Send + Sync {
    fn resolve(&self, identifier: &Identifier) -> Result<String>;
}

/// Memoizes resolved versions by lookup key for the lifetime of one run.
///
/// Every key has its own slot. Callers asking for the same key wait for the
/// first lookup instead of racing it, while other keys resolve independently.
#[derive(Debug, Default)]
pub struct VersionCache {
    entries: DashMap<String, Arc<Mutex<Option<String>>>>,
}

impl VersionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_try_insert_with<F>(&self, key: &str, fetch: F) -> Result<String>
    where
        F: FnOnce() -> Result<String>,
    {
        let slot = self.entries.entry(key.to_string()).or_default().clone();
        let mut cached = slot
            .lock()
            .map_err(|_| TflvError::Resolve(format!("version cache entry {key} poisoned")))?;

        if let Some(version) = cached.as_ref() {
            debug!("Cache hit for {}: {}", key, version);
            return Ok(version.clone());
        }

        let version = fetch()?;
        *cached = Some(version.clone());
        debug!("Cached {} => {}", key, version);
        Ok(version)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|slot| slot.value().lock().map(|v| v.is_some()).unwrap_or(false))
            .count()
    }
}
