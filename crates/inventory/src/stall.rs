use serde::{Deserialize, Serialize};

use marketbook_core::{Entity, Price, StallId};

use crate::zone::Zone;

/// Flat availability status, as exchanged with the backend and shown in the UI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StallStatus {
    Available,
    Booked,
    Maintenance,
}

impl StallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StallStatus::Available => "AVAILABLE",
            StallStatus::Booked => "BOOKED",
            StallStatus::Maintenance => "MAINTENANCE",
        }
    }
}

impl core::fmt::Display for StallStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status and tenant as a single variant.
///
/// Only `Booked` can carry a tenant. A booked stall without a tenant is a
/// reservation that has not been confirmed yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Occupancy {
    #[default]
    Available,
    Booked { tenant: Option<String> },
    Maintenance,
}

impl Occupancy {
    /// Build from the flat wire pair. A tenant on a non-booked status is dropped;
    /// blank tenant names count as no tenant.
    pub fn from_parts(status: StallStatus, tenant: Option<String>) -> Self {
        match status {
            StallStatus::Available => Occupancy::Available,
            StallStatus::Maintenance => Occupancy::Maintenance,
            StallStatus::Booked => Occupancy::Booked {
                tenant: tenant.filter(|t| !t.trim().is_empty()),
            },
        }
    }

    pub fn status(&self) -> StallStatus {
        match self {
            Occupancy::Available => StallStatus::Available,
            Occupancy::Booked { .. } => StallStatus::Booked,
            Occupancy::Maintenance => StallStatus::Maintenance,
        }
    }

    pub fn tenant(&self) -> Option<&str> {
        match self {
            Occupancy::Booked { tenant } => tenant.as_deref(),
            _ => None,
        }
    }
}

/// A rentable unit of market space.
#[derive(Debug, Clone, PartialEq)]
pub struct Stall {
    id: StallId,
    name: String,
    zone: Zone,
    price: Price,
    size: String,
    occupancy: Occupancy,
    features: Vec<String>,
}

impl Stall {
    /// Create an available stall with no feature tags.
    pub fn new(id: StallId, name: impl Into<String>, zone: Zone, price: Price, size: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            zone,
            price,
            size: size.into(),
            occupancy: Occupancy::Available,
            features: Vec::new(),
        }
    }

    pub fn id_typed(&self) -> &StallId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn size(&self) -> &str {
        &self.size
    }

    pub fn occupancy(&self) -> &Occupancy {
        &self.occupancy
    }

    pub fn status(&self) -> StallStatus {
        self.occupancy.status()
    }

    pub fn tenant(&self) -> Option<&str> {
        self.occupancy.tenant()
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// True iff the stall can be booked right now.
    pub fn can_book(&self) -> bool {
        self.status() == StallStatus::Available
    }

    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn in_zone(mut self, zone: Zone) -> Self {
        self.zone = zone;
        self
    }

    pub fn priced(mut self, price: Price) -> Self {
        self.price = price;
        self
    }

    pub fn sized(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }

    pub fn with_features(mut self, features: Vec<String>) -> Self {
        self.features = features;
        self
    }

    pub fn with_occupancy(mut self, occupancy: Occupancy) -> Self {
        self.occupancy = occupancy;
        self
    }

    /// Mark the stall booked for `tenant`.
    pub fn with_tenant(self, tenant: impl Into<String>) -> Self {
        let tenant = tenant.into();
        self.with_occupancy(Occupancy::from_parts(StallStatus::Booked, Some(tenant)))
    }

    /// Move to `status`, clearing the tenant unless the stall stays booked.
    pub fn with_status(mut self, status: StallStatus) -> Self {
        self.occupancy = match (status, self.occupancy) {
            (StallStatus::Booked, booked @ Occupancy::Booked { .. }) => booked,
            (StallStatus::Booked, _) => Occupancy::Booked { tenant: None },
            (StallStatus::Available, _) => Occupancy::Available,
            (StallStatus::Maintenance, _) => Occupancy::Maintenance,
        };
        self
    }
}

impl Entity for Stall {
    type Id = StallId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// True iff `stall` is currently bookable.
pub fn can_book(stall: &Stall) -> bool {
    stall.can_book()
}

/// Copy of `stall` moved to `new_status`; any status other than `Booked`
/// clears the tenant. Pure.
pub fn apply_status_change(stall: &Stall, new_status: StallStatus) -> Stall {
    stall.clone().with_status(new_status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_stall() -> Stall {
        Stall::new(
            StallId::new("STALL-A1").unwrap(),
            "A1",
            Zone::Food,
            Price::new(350.0).unwrap(),
            "2x2 m",
        )
        .with_features(vec!["Power outlet".to_string()])
    }

    #[test]
    fn new_stalls_are_bookable() {
        let stall = test_stall();
        assert_eq!(stall.status(), StallStatus::Available);
        assert!(can_book(&stall));
        assert_eq!(stall.tenant(), None);
    }

    #[test]
    fn booked_and_maintenance_are_not_bookable() {
        let booked = test_stall().with_tenant("Auntie Jam");
        let maintenance = apply_status_change(&test_stall(), StallStatus::Maintenance);
        assert!(!booked.can_book());
        assert!(!maintenance.can_book());
    }

    #[test]
    fn leaving_booked_clears_tenant() {
        let booked = test_stall().with_tenant("Auntie Jam");
        assert_eq!(booked.tenant(), Some("Auntie Jam"));

        let freed = apply_status_change(&booked, StallStatus::Available);
        assert_eq!(freed.status(), StallStatus::Available);
        assert_eq!(freed.tenant(), None);

        let repaired = apply_status_change(&booked, StallStatus::Maintenance);
        assert_eq!(repaired.tenant(), None);
    }

    #[test]
    fn staying_booked_keeps_tenant() {
        let booked = test_stall().with_tenant("Auntie Jam");
        let same = apply_status_change(&booked, StallStatus::Booked);
        assert_eq!(same.tenant(), Some("Auntie Jam"));
    }

    #[test]
    fn booking_without_tenant_is_a_reservation() {
        let reserved = apply_status_change(&test_stall(), StallStatus::Booked);
        assert_eq!(reserved.status(), StallStatus::Booked);
        assert_eq!(reserved.tenant(), None);
    }

    #[test]
    fn apply_status_change_does_not_touch_input() {
        let original = test_stall().with_tenant("Auntie Jam");
        let _ = apply_status_change(&original, StallStatus::Available);
        assert_eq!(original.tenant(), Some("Auntie Jam"));
    }

    #[test]
    fn occupancy_drops_tenant_for_non_booked_status() {
        let occ = Occupancy::from_parts(StallStatus::Available, Some("ghost".to_string()));
        assert_eq!(occ, Occupancy::Available);
        let blank = Occupancy::from_parts(StallStatus::Booked, Some("  ".to_string()));
        assert_eq!(blank, Occupancy::Booked { tenant: None });
    }

    #[test]
    fn identity_survives_edits() {
        let original = test_stall();
        let edited = original.clone().renamed("A1 Deluxe").in_zone(Zone::Craft).with_tenant("Mali");
        assert_ne!(original, edited);
        assert!(original.same_identity_as(&edited));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_status() -> impl Strategy<Value = StallStatus> {
            prop_oneof![
                Just(StallStatus::Available),
                Just(StallStatus::Booked),
                Just(StallStatus::Maintenance),
            ]
        }

        proptest! {
            /// Property: any non-booked target status leaves no tenant behind.
            #[test]
            fn non_booked_status_never_keeps_tenant(
                start in any_status(),
                target in any_status(),
                tenant in proptest::option::of("[A-Za-z ]{1,20}"),
            ) {
                let stall = test_stall().with_occupancy(Occupancy::from_parts(start, tenant));
                let next = apply_status_change(&stall, target);
                prop_assert_eq!(next.status(), target);
                if target != StallStatus::Booked {
                    prop_assert_eq!(next.tenant(), None);
                }
                prop_assert_eq!(next.name(), stall.name());
                prop_assert_eq!(next.features(), stall.features());
            }
        }
    }
}
