//! Rule-based stall recommendation used when the hosted model is unavailable.
//!
//! Model:
//! - Classify the query into a zone by keyword, checking FOOD, FASHION, CRAFT
//!   in that order; anything else is GENERAL.
//! - Pick the first available stall of that zone in collection order.
//! - Otherwise pick the first available stall anywhere, flagged degraded.

use marketbook_inventory::{Stall, Zone};

use crate::result::Recommendation;

struct ZoneRule {
    zone: Zone,
    keywords: &'static [&'static str],
    rationale: &'static str,
}

const RULES: [ZoneRule; 3] = [
    ZoneRule {
        zone: Zone::Food,
        keywords: &["อาหาร", "ของกิน", "น้ำ", "เครื่องดื่ม", "food", "drink", "ลูกชิ้น", "หมู"],
        rationale: "This zone suits food vendors: there is a waste point nearby and the floor is easy to clean.",
    },
    ZoneRule {
        zone: Zone::Fashion,
        keywords: &["เสื้อ", "ผ้า", "แต่งตัว", "แฟชั่น", "fashion", "clothes", "กางเกง", "กระเป๋า"],
        rationale: "The fashion zone gets heavy foot traffic and good lighting, so your goods stand out.",
    },
    ZoneRule {
        zone: Zone::Craft,
        keywords: &["ฝีมือ", "hand", "craft", "diy", "ศิลปะ", "วาด", "รูป"],
        rationale: "The craft zone has a relaxed atmosphere that fits art and handmade goods.",
    },
];

const GENERAL_RATIONALE: &str =
    "The general zone is affordable and flexible, good for a wide range of goods.";

/// Zone a free-text query points to, with the reason shown to the user.
///
/// Unmatched queries land in GENERAL rather than producing no answer.
pub fn classify(query: &str) -> (Zone, &'static str) {
    let query = query.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| query.contains(k)))
        .map(|rule| (rule.zone, rule.rationale))
        .unwrap_or((Zone::General, GENERAL_RATIONALE))
}

/// Recommend a stall for `query`. Pure and deterministic.
pub fn recommend(query: &str, stalls: &[Stall]) -> Recommendation {
    let (zone, rationale) = classify(query);

    if let Some(stall) = stalls.iter().find(|s| s.can_book() && s.zone() == zone) {
        return Recommendation::Matched { stall: stall.clone(), rationale };
    }

    match stalls.iter().find(|s| s.can_book()) {
        Some(stall) => Recommendation::Degraded {
            stall: stall.clone(),
            preferred_zone: zone,
            rationale,
        },
        None => Recommendation::NoAvailability { preferred_zone: zone },
    }
}
