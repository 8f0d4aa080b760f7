//! Persisted record schema and its conversion to/from [`Stall`].
//!
//! Records are what the backend stores and what seeding inserts. Feature tags
//! normally arrive as a JSON array, but older rows hold them as an encoded
//! scalar (`"[\"Power outlet\"]"`); both shapes are accepted.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use marketbook_core::{DomainError, Price, StallId};

use crate::stall::{Occupancy, Stall, StallStatus};
use crate::zone::Zone;

/// Malformed encoded feature list.
///
/// Always recovered locally (empty list); never surfaced to callers of the store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed feature list: {0}")]
pub struct ParseError(pub String);

/// Feature tags as they may arrive from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawFeatures {
    List(Vec<String>),
    Encoded(String),
}

impl Default for RawFeatures {
    fn default() -> Self {
        RawFeatures::List(Vec::new())
    }
}

impl RawFeatures {
    /// Strict parse of the raw shape.
    pub fn parse(&self) -> Result<Vec<String>, ParseError> {
        match self {
            RawFeatures::List(list) => Ok(list.clone()),
            RawFeatures::Encoded(text) if text.trim().is_empty() => Ok(Vec::new()),
            RawFeatures::Encoded(text) => {
                serde_json::from_str(text).map_err(|e| ParseError(e.to_string()))
            }
        }
    }

    /// Classify an arbitrary JSON value. Anything other than a string, a
    /// string array or null is recovered as an empty list.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => RawFeatures::default(),
            Value::String(text) => RawFeatures::Encoded(text),
            other => serde_json::from_value::<Vec<String>>(other)
                .map(RawFeatures::List)
                .unwrap_or_else(|err| {
                    let err = ParseError(err.to_string());
                    tracing::debug!(error = %err, "recovered malformed feature list as empty");
                    RawFeatures::default()
                }),
        }
    }

    /// Parse, substituting an empty list on failure.
    pub fn normalize(&self) -> Vec<String> {
        self.parse().unwrap_or_else(|err| {
            tracing::debug!(error = %err, "recovered malformed feature list as empty");
            Vec::new()
        })
    }
}

fn lenient_features<'de, D>(deserializer: D) -> Result<RawFeatures, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(RawFeatures::from_value(Value::deserialize(deserializer)?))
}

/// Row of the `stalls` table.
///
/// `tenant` is always serialized, as `null` when absent, so partial writes
/// never leave a stale tenant behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StallRecord {
    pub id: StallId,
    pub name: String,
    pub zone: Zone,
    pub price: f64,
    pub size: String,
    pub status: StallStatus,
    #[serde(default, deserialize_with = "lenient_features")]
    pub features: RawFeatures,
    #[serde(default)]
    pub tenant: Option<String>,
}

impl From<&Stall> for StallRecord {
    fn from(stall: &Stall) -> Self {
        Self {
            id: stall.id_typed().clone(),
            name: stall.name().to_string(),
            zone: stall.zone(),
            price: stall.price().amount(),
            size: stall.size().to_string(),
            status: stall.status(),
            features: RawFeatures::List(stall.features().to_vec()),
            tenant: stall.tenant().map(str::to_string),
        }
    }
}

impl TryFrom<StallRecord> for Stall {
    type Error = DomainError;

    fn try_from(record: StallRecord) -> Result<Self, Self::Error> {
        let price = Price::new(record.price)?;
        let features = record.features.normalize();
        let occupancy = Occupancy::from_parts(record.status, record.tenant);
        Ok(Stall::new(record.id, record.name, record.zone, price, record.size)
            .with_features(features)
            .with_occupancy(occupancy))
    }
}

/// Mutable columns written by booking and admin edits (`size` and `id` are
/// never patched).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StallPatch {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub zone: Option<Zone>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub price: Option<f64>,
    pub status: StallStatus,
    pub tenant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub features: Option<Vec<String>>,
}

impl StallPatch {
    /// Patch for a booking: status + tenant only.
    pub fn booking(tenant: impl Into<String>) -> Self {
        Self {
            name: None,
            zone: None,
            price: None,
            status: StallStatus::Booked,
            tenant: Some(tenant.into()),
            features: None,
        }
    }

    /// Patch replacing every mutable column with the values of `stall`.
    pub fn full(stall: &Stall) -> Self {
        Self {
            name: Some(stall.name().to_string()),
            zone: Some(stall.zone()),
            price: Some(stall.price().amount()),
            status: stall.status(),
            tenant: stall.tenant().map(str::to_string),
            features: Some(stall.features().to_vec()),
        }
    }

    /// Apply the patch onto a stored record.
    pub fn apply_to(&self, record: &mut StallRecord) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(zone) = self.zone {
            record.zone = zone;
        }
        if let Some(price) = self.price {
            record.price = price;
        }
        if let Some(features) = &self.features {
            record.features = RawFeatures::List(features.clone());
        }
        record.status = self.status;
        record.tenant = self.tenant.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_array_features() {
        let record: StallRecord = serde_json::from_value(json!({
            "id": "STALL-A1", "name": "A1", "zone": "FOOD", "price": 350,
            "size": "2x2 m", "status": "AVAILABLE",
            "features": ["Power outlet", "Corner"], "tenant": null
        }))
        .unwrap();
        let stall = Stall::try_from(record).unwrap();
        assert_eq!(stall.features(), ["Power outlet", "Corner"]);
        assert_eq!(stall.tenant(), None);
    }

    #[test]
    fn parses_encoded_scalar_features() {
        let record: StallRecord = serde_json::from_value(json!({
            "id": "STALL-B1", "name": "B1", "zone": "FASHION", "price": 250.0,
            "size": "2x2 m", "status": "BOOKED",
            "features": "[\"Spotlighting\"]", "tenant": "Vintage Wear"
        }))
        .unwrap();
        let stall = Stall::try_from(record).unwrap();
        assert_eq!(stall.features(), ["Spotlighting"]);
        assert_eq!(stall.tenant(), Some("Vintage Wear"));
    }

    #[test]
    fn malformed_features_become_empty() {
        let raw = RawFeatures::Encoded("{not json".to_string());
        assert!(raw.parse().is_err());
        assert!(raw.normalize().is_empty());
    }

    #[test]
    fn missing_or_null_features_become_empty() {
        let record: StallRecord = serde_json::from_value(json!({
            "id": "STALL-D1", "name": "D1", "zone": "GENERAL", "price": 150,
            "size": "2x2 m", "status": "MAINTENANCE", "features": null
        }))
        .unwrap();
        assert_eq!(record.features, RawFeatures::List(vec![]));
        assert_eq!(record.tenant, None);
    }

    #[test]
    fn unexpected_feature_shapes_do_not_fail_the_row() {
        for features in [json!(42), json!({}), json!(["a", 1]), json!(true)] {
            let record: StallRecord = serde_json::from_value(json!({
                "id": "STALL-D3", "name": "D3", "zone": "GENERAL", "price": 300,
                "size": "2x2 m", "status": "AVAILABLE", "features": features
            }))
            .unwrap();
            assert_eq!(record.features, RawFeatures::List(vec![]));
        }
    }

    #[test]
    fn one_bad_feature_value_keeps_the_other_rows() {
        let records: Vec<StallRecord> = serde_json::from_value(json!([
            {
                "id": "STALL-A1", "name": "A1", "zone": "FOOD", "price": 350,
                "size": "2x2 m", "status": "AVAILABLE", "features": ["Corner"]
            },
            {
                "id": "STALL-A2", "name": "A2", "zone": "FOOD", "price": 350,
                "size": "2x2 m", "status": "AVAILABLE", "features": 42
            }
        ]))
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].features, RawFeatures::List(vec!["Corner".to_string()]));
        assert!(Stall::try_from(records[1].clone()).unwrap().features().is_empty());
    }

    #[test]
    fn absent_tenant_serializes_as_null() {
        let stall = Stall::new(
            StallId::new("STALL-C1").unwrap(),
            "C1",
            Zone::Craft,
            Price::new(200.0).unwrap(),
            "2x2 m",
        );
        let value = serde_json::to_value(StallRecord::from(&stall)).unwrap();
        assert_eq!(value["tenant"], serde_json::Value::Null);

        let patch = serde_json::to_value(StallPatch::full(&stall)).unwrap();
        assert_eq!(patch["tenant"], serde_json::Value::Null);
        assert_eq!(patch["status"], "AVAILABLE");
    }

    #[test]
    fn non_positive_price_is_rejected() {
        let record: StallRecord = serde_json::from_value(json!({
            "id": "STALL-D2", "name": "D2", "zone": "GENERAL", "price": 0,
            "size": "2x2 m", "status": "AVAILABLE", "features": []
        }))
        .unwrap();
        assert!(Stall::try_from(record).is_err());
    }

    #[test]
    fn booking_patch_only_touches_status_and_tenant() {
        let mut record: StallRecord = serde_json::from_value(json!({
            "id": "STALL-A2", "name": "A2", "zone": "FOOD", "price": 400,
            "size": "2x2 m", "status": "AVAILABLE", "features": ["Corner"]
        }))
        .unwrap();
        StallPatch::booking("Pork Skewers").apply_to(&mut record);
        assert_eq!(record.status, StallStatus::Booked);
        assert_eq!(record.tenant.as_deref(), Some("Pork Skewers"));
        assert_eq!(record.name, "A2");
        assert_eq!(record.features, RawFeatures::List(vec!["Corner".to_string()]));
    }
}
