// ANYTONE-RS: codeplug editor for Anytone DMR radios
// Copyright 2025 - Licensed under GPLv3

pub mod bitwise;
pub mod codeplug;
pub mod store;

// Re-export commonly used types
pub use bitwise::{read_u24_le, write_u24_le};
pub use codeplug::{
    channel::{Channel, ChannelWalker},
    radio_id::RadioIdEntry,
    rdt::{Codeplug, CodeplugError, Info},
};
pub use store::ByteStore;

/// anytone-rs version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
