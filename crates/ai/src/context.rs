use serde::{Deserialize, Serialize};

use marketbook_inventory::{Stall, Zone};

use crate::result::AiError;

/// What the hosted model is told about one available stall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StallContext {
    pub id: String,
    pub name: String,
    pub zone: Zone,
    pub price: f64,
    /// Feature tags joined with `", "`.
    pub features: String,
}

/// Context records for every bookable stall, in collection order.
pub fn build_context(stalls: &[Stall]) -> Vec<StallContext> {
    stalls
        .iter()
        .filter(|s| s.can_book())
        .map(|s| StallContext {
            id: s.id_typed().to_string(),
            name: s.name().to_string(),
            zone: s.zone(),
            price: s.price().amount(),
            features: s.features().join(", "),
        })
        .collect()
}

/// Context encoded as JSON text, the form the recommendation endpoint expects.
pub fn encode_context(context: &[StallContext]) -> Result<String, AiError> {
    serde_json::to_string(context).map_err(|e| AiError::Internal(format!("failed to encode context: {e}")))
}
