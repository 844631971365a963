use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::tle::{norad_id, RawTle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Station,
    Payload,
    Debris,
}

/// Name markers win over the group's own label. Station markers are checked
/// before debris markers, so an ambiguous name classifies as a station.
const STATION_MARKERS: [&str; 4] = ["ISS", "CSS", "TIANGONG", "ZARYA"];
const DEBRIS_MARKERS: [&str; 2] = [" DEB", "R/B"];

pub fn classify(name: &str, group_category: Category) -> Category {
    let upper = name.to_uppercase();
    if STATION_MARKERS.iter().any(|m| upper.contains(m)) {
        Category::Station
    } else if DEBRIS_MARKERS.iter().any(|m| upper.contains(m)) {
        Category::Debris
    } else {
        group_category
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Satellite {
    pub name: String,
    pub tle1: String,
    pub tle2: String,
    /// 5-character catalog number; the deduplication key.
    pub id: String,
    pub category: Category,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
}

fn default_visible() -> bool {
    true
}

impl Satellite {
    pub fn from_raw(raw: RawTle, group_category: Category) -> Option<Self> {
        let id = norad_id(&raw.line2)?;
        let category = classify(&raw.name, group_category);
        Some(Satellite {
            name: raw.name,
            tle1: raw.line1,
            tle2: raw.line2,
            id,
            category,
            is_visible: true,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum CatalogStatus {
    #[serde(rename = "SYNCING")]
    Syncing,
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "ACTIVE (CACHED)")]
    ActiveCached,
    #[serde(rename = "OFFLINE (CACHED)")]
    OfflineCached,
    #[serde(rename = "ERROR")]
    Error,
}

impl std::fmt::Display for CatalogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CatalogStatus::Syncing => "SYNCING",
            CatalogStatus::Active => "ACTIVE",
            CatalogStatus::ActiveCached => "ACTIVE (CACHED)",
            CatalogStatus::OfflineCached => "OFFLINE (CACHED)",
            CatalogStatus::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// On-disk cache payload: satellite records plus the write time in epoch
/// milliseconds. Propagation state is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEnvelope {
    pub data: Vec<Satellite>,
    pub timestamp: i64,
}

impl CacheEnvelope {
    pub fn new(data: Vec<Satellite>, written_at: DateTime<Utc>) -> Self {
        CacheEnvelope {
            data,
            timestamp: written_at.timestamp_millis(),
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        chrono::Duration::milliseconds(now.timestamp_millis() - self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_precedence_table() {
        let cases = [
            ("ISS (ZARYA)", Category::Payload, Category::Station),
            ("CSS (TIANHE)", Category::Debris, Category::Station),
            ("TIANGONG-1 DEB", Category::Payload, Category::Station),
            ("COSMOS 2251 DEB", Category::Payload, Category::Debris),
            ("SL-16 R/B", Category::Payload, Category::Debris),
            ("STARLINK-3042", Category::Payload, Category::Payload),
            ("NOAA 19", Category::Payload, Category::Payload),
            ("OBJECT A", Category::Debris, Category::Debris),
        ];
        for (name, label, expected) in cases {
            assert_eq!(classify(name, label), expected, "name {name:?}");
        }
    }

    #[test]
    fn envelope_age_is_measured_from_timestamp() {
        let written = Utc::now() - chrono::Duration::hours(13);
        let envelope = CacheEnvelope::new(Vec::new(), written);
        let age = envelope.age(Utc::now());
        assert!(age >= chrono::Duration::hours(13));
        assert!(age < chrono::Duration::hours(14));
    }
}
