// RDT codeplug codec: fixed header, channel records, radio ID table

pub mod channel;
pub mod constants;
pub mod layout;
pub mod radio_id;
pub mod rdt;

// Re-export commonly used types
pub use channel::{Channel, ChannelWalker};
pub use constants::*;
pub use radio_id::RadioIdEntry;
pub use rdt::{Codeplug, CodeplugError, Info, Result};
