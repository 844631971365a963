use super::types::Category;

/// Satellite groups fetched from the catalog source. Keys follow the
/// CelesTrak group naming used by both URL forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Stations,
    Active,
    Brightest,
    Weather,
    Noaa,
    Gps,
    Starlink,
    Last30Days,
    Cosmos2251Debris,
    Iridium33Debris,
    Fengyun1cDebris,
}

impl Group {
    pub const ALL: [Group; 11] = [
        Group::Stations,
        Group::Active,
        Group::Brightest,
        Group::Weather,
        Group::Noaa,
        Group::Gps,
        Group::Starlink,
        Group::Last30Days,
        Group::Cosmos2251Debris,
        Group::Iridium33Debris,
        Group::Fengyun1cDebris,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Group::Stations => "stations",
            Group::Active => "active",
            Group::Brightest => "visual",
            Group::Weather => "weather",
            Group::Noaa => "noaa",
            Group::Gps => "gps-ops",
            Group::Starlink => "starlink",
            Group::Last30Days => "last-30-days",
            Group::Cosmos2251Debris => "cosmos-2251-debris",
            Group::Iridium33Debris => "iridium-33-debris",
            Group::Fengyun1cDebris => "fengyun-1c-debris",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Group::Stations => "Stations",
            Group::Active => "Active",
            Group::Brightest => "100 Brightest",
            Group::Weather => "Weather",
            Group::Noaa => "NOAA",
            Group::Gps => "GPS",
            Group::Starlink => "Starlink",
            Group::Last30Days => "Last 30 Days",
            Group::Cosmos2251Debris => "Cosmos 2251",
            Group::Iridium33Debris => "Iridium 33",
            Group::Fengyun1cDebris => "Fengyun 1C",
        }
    }

    /// Default category for members of this group; individual names may still
    /// override it (see `classify`).
    pub fn category(&self) -> Category {
        match self {
            Group::Stations => Category::Station,
            Group::Cosmos2251Debris | Group::Iridium33Debris | Group::Fengyun1cDebris => {
                Category::Debris
            }
            _ => Category::Payload,
        }
    }
}
