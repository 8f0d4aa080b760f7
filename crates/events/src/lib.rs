//! Change notification plumbing between sync adapters and local stores.

pub mod bus;
pub mod change;
pub mod in_memory_bus;

pub use bus::{ChangeBus, Delivery, Subscription};
pub use change::ChangeNotice;
pub use in_memory_bus::InMemoryChangeBus;
