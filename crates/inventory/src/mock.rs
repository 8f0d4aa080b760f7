//! Deterministic mock inventory for running without a backend.
//!
//! Stalls are generated from a small zone layout table. Occupancy is drawn
//! from a seeded generator, so the same layout and seed always produce the
//! same inventory.

use marketbook_core::{DomainResult, Price, StallId};

use crate::stall::{Occupancy, Stall};
use crate::zone::Zone;

/// One row of the market floor plan.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneLayout {
    pub zone: Zone,
    /// Letter prefix of stall names in this zone (`A` → `A1`, `A2`, ...).
    pub prefix: &'static str,
    pub count: u32,
    pub base_price: f64,
}

/// Default floor plan: 12 food, 12 fashion, 8 craft, 8 general stalls.
pub const DEFAULT_LAYOUT: [ZoneLayout; 4] = [
    ZoneLayout { zone: Zone::Food, prefix: "A", count: 12, base_price: 350.0 },
    ZoneLayout { zone: Zone::Fashion, prefix: "B", count: 12, base_price: 250.0 },
    ZoneLayout { zone: Zone::Craft, prefix: "C", count: 8, base_price: 200.0 },
    ZoneLayout { zone: Zone::General, prefix: "D", count: 8, base_price: 150.0 },
];

/// Extra charge for corner stalls (every even-numbered stall).
pub const CORNER_SURCHARGE: f64 = 50.0;

pub const STALL_SIZE: &str = "2x2 m";

const SAMPLE_TENANTS: [&str; 5] = [
    "Auntie Jam's Kitchen",
    "Grilled Pork & Milk",
    "Vintage Threads",
    "Fresh Longan Juice",
    "Bomb Meatballs",
];

/// Share of stalls generated as booked, and of the rest as under maintenance.
const BOOKED_RATIO: f64 = 0.3;
const MAINTENANCE_RATIO: f64 = 0.05;

pub const DEFAULT_SEED: u64 = 0x6d61_726b_6574;

/// Seeded mock-inventory generator.
#[derive(Debug, Clone)]
pub struct MockInventory {
    seed: u64,
}

impl Default for MockInventory {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl MockInventory {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Generate stalls for `layout`, in layout order then stall number.
    pub fn generate(&self, layout: &[ZoneLayout]) -> DomainResult<Vec<Stall>> {
        let mut rng = SplitMix64(self.seed);
        let mut stalls = Vec::with_capacity(layout.iter().map(|z| z.count as usize).sum());

        for zone in layout {
            let base = Price::new(zone.base_price)?;
            for n in 1..=zone.count {
                let corner = n % 2 == 0;
                let price = if corner { base.plus(CORNER_SURCHARGE)? } else { base };

                let occupancy = if rng.next_f64() < BOOKED_RATIO {
                    let pick = (rng.next_u64() % SAMPLE_TENANTS.len() as u64) as usize;
                    Occupancy::Booked { tenant: Some(SAMPLE_TENANTS[pick].to_string()) }
                } else if rng.next_f64() < MAINTENANCE_RATIO {
                    Occupancy::Maintenance
                } else {
                    Occupancy::Available
                };

                let name = format!("{}{}", zone.prefix, n);
                let id = StallId::new(format!("STALL-{name}"))?;
                stalls.push(
                    Stall::new(id, name, zone.zone, price, STALL_SIZE)
                        .with_features(features_for(zone.zone, corner))
                        .with_occupancy(occupancy),
                );
            }
        }

        Ok(stalls)
    }
}

fn features_for(zone: Zone, corner: bool) -> Vec<String> {
    let mut features = vec!["Power outlet"];
    if corner {
        features.push("Corner");
    }
    match zone {
        Zone::Food => features.extend(["Near waste point", "Easy-clean floor"]),
        Zone::Fashion => features.push("Spotlighting"),
        Zone::Craft | Zone::General => {}
    }
    features.into_iter().map(str::to_string).collect()
}

/// Small, fast, well-distributed PRNG (SplitMix64). Not for anything secret.
struct SplitMix64(u64);

impl SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}
