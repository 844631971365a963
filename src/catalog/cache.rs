//! Tiered on-disk catalog cache.
//!
//! One current-schema file receives all writes. Older schema filenames are
//! consulted read-only so an upgraded deployment can still start from data
//! written by a previous version.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};

use super::error::CatalogError;
use super::types::{CacheEnvelope, Satellite};

pub const CURRENT_KEY: &str = "catalog-v3.json";
pub const LEGACY_KEYS: [&str; 2] = ["catalog-v2.json", "satellites-cache.json"];

pub struct CacheStore {
    dir: PathBuf,
    max_age: Duration,
}

impl CacheStore {
    pub fn new(dir: PathBuf, max_age: std::time::Duration) -> Self {
        CacheStore {
            dir,
            max_age: Duration::from_std(max_age).unwrap_or_else(|_| Duration::hours(12)),
        }
    }

    /// Newest envelope younger than the expiry window, consulting the current
    /// key first and legacy keys in priority order.
    pub fn read_fresh(&self) -> Option<CacheEnvelope> {
        let now = Utc::now();
        self.keys()
            .filter_map(|path| read_envelope(&path))
            .find(|envelope| envelope.age(now) < self.max_age)
    }

    /// Any readable envelope regardless of age, newest first. Last-resort
    /// fallback when every network source has failed.
    pub fn read_stale(&self) -> Option<CacheEnvelope> {
        self.keys()
            .filter_map(|path| read_envelope(&path))
            .max_by_key(|envelope| envelope.timestamp)
    }

    /// Persist the full catalog under the current key. Writes go to a temp
    /// file first and are renamed into place, so a crash mid-write never
    /// leaves a truncated envelope behind.
    pub fn write(&self, satellites: &[Satellite]) -> Result<(), CatalogError> {
        fs::create_dir_all(&self.dir)?;
        let envelope = CacheEnvelope::new(satellites.to_vec(), Utc::now());
        let body = serde_json::to_vec(&envelope)?;

        let target = self.dir.join(CURRENT_KEY);
        let tmp = self.dir.join(format!("{CURRENT_KEY}.tmp"));
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &target)?;
        log::info!(
            "cached {} satellites to {}",
            satellites.len(),
            target.display()
        );
        Ok(())
    }

    fn keys(&self) -> impl Iterator<Item = PathBuf> + '_ {
        std::iter::once(CURRENT_KEY)
            .chain(LEGACY_KEYS)
            .map(|key| self.dir.join(key))
    }
}

fn read_envelope(path: &Path) -> Option<CacheEnvelope> {
    let body = fs::read(path).ok()?;
    match serde_json::from_slice(&body) {
        Ok(envelope) => Some(envelope),
        Err(e) => {
            log::warn!("ignoring unreadable cache file {}: {}", path.display(), e);
            None
        }
    }
}
