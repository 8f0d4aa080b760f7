use thiserror::Error;

use marketbook_inventory::{Stall, Zone};

/// Outcome of the rule-based stall recommendation.
#[derive(Debug, Clone, PartialEq)]
pub enum Recommendation {
    /// An available stall in the zone the query points to.
    Matched { stall: Stall, rationale: &'static str },
    /// The preferred zone is full; this is the first available stall anywhere.
    Degraded { stall: Stall, preferred_zone: Zone, rationale: &'static str },
    /// Nothing is available at all.
    NoAvailability { preferred_zone: Zone },
}

impl Recommendation {
    pub fn stall(&self) -> Option<&Stall> {
        match self {
            Recommendation::Matched { stall, .. } | Recommendation::Degraded { stall, .. } => Some(stall),
            Recommendation::NoAvailability { .. } => None,
        }
    }

    /// Zone the query was classified into.
    pub fn preferred_zone(&self) -> Zone {
        match self {
            Recommendation::Matched { stall, .. } => stall.zone(),
            Recommendation::Degraded { preferred_zone, .. }
            | Recommendation::NoAvailability { preferred_zone } => *preferred_zone,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Recommendation::Degraded { .. })
    }

    /// Chat-ready reply text.
    pub fn render(&self) -> String {
        match self {
            Recommendation::Matched { stall, rationale } => offline_reply(stall, rationale, false),
            Recommendation::Degraded { stall, rationale, .. } => offline_reply(stall, rationale, true),
            Recommendation::NoAvailability { .. } => {
                "[Offline mode] Sorry, there are no free stalls right now. Maybe try another date?"
                    .to_string()
            }
        }
    }
}

fn offline_reply(stall: &Stall, rationale: &str, degraded: bool) -> String {
    let note = if degraded {
        " (That zone is full, so this is the closest free stall I could find.)"
    } else {
        ""
    };
    format!(
        "[Offline mode] I suggest stall {} ({}).\n\nWhy: {rationale}{note}\nPrice: {} THB\n\n(Automatic reply: the AI service is not connected.)",
        stall.name(),
        stall.zone(),
        stall.price(),
    )
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("inference failed: {0}")]
    InferenceFailed(String),

    #[error("internal error: {0}")]
    Internal(String),
}
