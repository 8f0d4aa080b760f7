//! Stall inventory domain module.
//!
//! Business rules for stalls, zones and bookings, implemented as deterministic
//! domain logic (no IO, no HTTP, no storage).

pub mod booking;
pub mod mock;
pub mod query;
pub mod record;
pub mod stall;
pub mod zone;

pub use booking::{BookingForm, BookingInfo};
pub use mock::{DEFAULT_LAYOUT, MockInventory, ZoneLayout};
pub use query::{StallQuery, ZoneOccupancy, occupancy_by_zone};
pub use record::{ParseError, RawFeatures, StallPatch, StallRecord};
pub use stall::{Occupancy, Stall, StallStatus, apply_status_change, can_book};
pub use zone::{Zone, ZoneFilter};
