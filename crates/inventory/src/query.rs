use serde::{Deserialize, Serialize};

use crate::stall::{Stall, StallStatus};
use crate::zone::{Zone, ZoneFilter};

/// Zone + name-search filter over a stall collection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StallQuery {
    pub zone: ZoneFilter,
    /// Case-insensitive substring of the stall name; empty matches everything.
    pub text: String,
}

impl StallQuery {
    pub fn new(zone: ZoneFilter, text: impl Into<String>) -> Self {
        Self { zone, text: text.into() }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn matches(&self, stall: &Stall) -> bool {
        self.zone.matches(stall.zone())
            && (self.text.is_empty()
                || stall.name().to_lowercase().contains(&self.text.to_lowercase()))
    }

    /// Lazily filter `stalls`, preserving their order.
    pub fn apply<'a>(&'a self, stalls: &'a [Stall]) -> impl Iterator<Item = &'a Stall> + 'a {
        stalls.iter().filter(move |s| self.matches(s))
    }
}

/// Per-zone occupancy counts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ZoneOccupancy {
    pub available: usize,
    pub booked: usize,
    pub maintenance: usize,
}

impl ZoneOccupancy {
    pub fn total(&self) -> usize {
        self.available + self.booked + self.maintenance
    }
}

/// Occupancy counts for every zone, in floor-plan order.
pub fn occupancy_by_zone(stalls: &[Stall]) -> Vec<(Zone, ZoneOccupancy)> {
    Zone::ALL
        .into_iter()
        .map(|zone| {
            let mut counts = ZoneOccupancy::default();
            for stall in stalls.iter().filter(|s| s.zone() == zone) {
                match stall.status() {
                    StallStatus::Available => counts.available += 1,
                    StallStatus::Booked => counts.booked += 1,
                    StallStatus::Maintenance => counts.maintenance += 1,
                }
            }
            (zone, counts)
        })
        .collect()
}
