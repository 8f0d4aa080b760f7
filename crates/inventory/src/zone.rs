use serde::{Deserialize, Serialize};

/// Coarse category grouping stalls on the market floor.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Zone {
    Food,
    Fashion,
    Craft,
    General,
}

impl Zone {
    /// All zones in floor-plan order.
    pub const ALL: [Zone; 4] = [Zone::Food, Zone::Fashion, Zone::Craft, Zone::General];

    /// Wire name as stored by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Food => "FOOD",
            Zone::Fashion => "FASHION",
            Zone::Craft => "CRAFT",
            Zone::General => "GENERAL",
        }
    }

    /// Display label for filter chips and headings.
    pub fn label(&self) -> &'static str {
        match self {
            Zone::Food => "Food & Drinks",
            Zone::Fashion => "Clothing & Fashion",
            Zone::Craft => "Crafts & DIY",
            Zone::General => "General Goods",
        }
    }
}

impl core::fmt::Display for Zone {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Zone predicate used by filters: a specific zone or any zone.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZoneFilter {
    #[default]
    All,
    Only(Zone),
}

impl ZoneFilter {
    pub fn matches(&self, zone: Zone) -> bool {
        match self {
            ZoneFilter::All => true,
            ZoneFilter::Only(z) => *z == zone,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ZoneFilter::All => "All",
            ZoneFilter::Only(z) => z.label(),
        }
    }

    /// Filter chips in display order: `All` first, then each zone.
    pub fn choices() -> impl Iterator<Item = ZoneFilter> {
        core::iter::once(ZoneFilter::All).chain(Zone::ALL.into_iter().map(ZoneFilter::Only))
    }
}

impl From<Zone> for ZoneFilter {
    fn from(zone: Zone) -> Self {
        ZoneFilter::Only(zone)
    }
}
