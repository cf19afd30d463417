// RDT file layout constants
// All absolute offsets are from the start of the file

/// Absolute offset of the model identifier string
pub const MODEL_OFFSET: u64 = 0x09;

/// Width of the model identifier string (ASCII, not necessarily terminated)
pub const MODEL_SIZE: usize = 10;

/// Absolute offset of the single-byte total channel count
pub const TOTAL_CHANNELS_ADDRESS: u64 = 0xF1;

/// Absolute offset of the first channel record (channel count byte + 1)
pub const CHANNELS_START: u64 = TOTAL_CHANNELS_ADDRESS + 1;

/// Fixed-size scalar block at the start of every channel record
pub const CHANNEL_HEADER_SIZE: usize = 49;

/// Bounded scan window for a channel's null-terminated name
pub const CHANNEL_NAME_WINDOW: usize = 32;

/// Fixed-size scalar block following a channel's name
pub const CHANNEL_TRAILER_SIZE: usize = 27;

/// Trailer bytes through `auto_scan` that must be present for a record to
/// decode; only the diagnostic flags past this point may be cut off at
/// end-of-file
pub const CHANNEL_TRAILER_REQUIRED: usize = 22;

/// Inter-section padding between the last channel record and the radio ID
/// table, observed empirically in the format
pub const SECTION_PADDING: u64 = 2;

/// Maximum number of radio ID entries a scan will decode. Guards against
/// runaway scans when the index-ordering termination heuristic never fires
/// on corrupt input.
pub const MAX_RADIO_IDS: usize = 10;

/// Index byte plus 24-bit little-endian ID at the start of a radio ID entry
pub const RADIO_ID_HEADER_SIZE: usize = 4;

/// Bounded scan window for a radio ID entry's null-terminated name
pub const RADIO_ID_NAME_WINDOW: usize = 256;

/// Largest valid DMR radio ID (24-bit)
pub const MAX_RADIO_ID_VALUE: u32 = 0xFF_FFFF;
