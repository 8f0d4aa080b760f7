//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**; they are defined entirely by their
//! attribute values. Two value objects with the same values are equal.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one.
///
/// - **Value Object**: `Price(350.0)` equals any other `Price(350.0)`
/// - **Entity**: a `Stall` is itself regardless of its price
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// Daily rental price of a stall.
///
/// Always finite and strictly positive; deserialization enforces the same rule
/// as [`Price::new`].
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Price(f64);

impl Price {
    pub fn new(amount: f64) -> DomainResult<Self> {
        if !(amount.is_finite() && amount > 0.0) {
            return Err(DomainError::validation(format!(
                "price must be a finite positive number (got {amount})"
            )));
        }
        Ok(Self(amount))
    }

    pub fn amount(&self) -> f64 {
        self.0
    }

    /// Add a surcharge (e.g. for corner stalls).
    pub fn plus(self, surcharge: f64) -> DomainResult<Self> {
        Self::new(self.0 + surcharge)
    }
}

impl ValueObject for Price {}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.0}", self.0)
        } else {
            write!(f, "{:.2}", self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let amount = f64::deserialize(deserializer)?;
        Price::new(amount).map_err(serde::de::Error::custom)
    }
}
