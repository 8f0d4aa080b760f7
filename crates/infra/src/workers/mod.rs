//! Background tasks.

mod realtime_refresher;

pub use realtime_refresher::{RealtimeRefresher, RefresherHandle};
