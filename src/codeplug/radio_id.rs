// Radio ID record codec
//
// The radio ID table has no count and no sentinel. Indices within a valid
// table only ever stay equal or grow, so the first entry whose index is
// strictly smaller than its predecessor's marks the end of the table. That
// is the only structural signal the format offers; a table whose indices
// were ever rewritten out of order would be truncated at the first
// decrease.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::constants::{RADIO_ID_HEADER_SIZE, RADIO_ID_NAME_WINDOW};
use super::layout::terminated_str;
use super::rdt::{CodeplugError, Result};
use crate::bitwise::{read_u24_le, write_u24_le};
use crate::store::ByteStore;

/// One radio ID entry: a slot index, a 24-bit DMR ID, and a display name.
/// The byte store is the source of truth; entries are read fresh for every
/// query and written back byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioIdEntry {
    /// Slot index. Not necessarily contiguous, but non-decreasing in file
    /// order within a valid table.
    pub index: u8,
    /// 24-bit DMR radio ID
    pub id: u32,
    /// Display name, without its terminator. Decoded lossily: names are
    /// radio-charset bytes with no UTF-8 guarantee, so this string is for
    /// display and is never written back over an existing entry.
    pub name: String,
    /// Absolute offset of this entry's index byte
    pub position: u64,
    /// Encoded length: index + ID + name with terminator
    pub length: usize,
}

impl RadioIdEntry {
    /// Encode this entry as it lives in the file: index byte, three
    /// little-endian ID bytes, name bytes, terminator. Only valid for
    /// entries whose name originated in this process; a lossily-decoded
    /// name can re-encode to a different length than the on-disk record.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(RADIO_ID_HEADER_SIZE + self.name.len() + 1);
        buf.push(self.index);
        buf.extend_from_slice(&write_u24_le(self.id));
        buf.extend_from_slice(self.name.as_bytes());
        buf.push(0);
        buf
    }
}

/// Decode the radio ID entry at `offset`. `previous_index` is the index of
/// the entry decoded before this one, or None at the start of the table.
/// Returns Ok(None) when the index decreases, signaling end of table.
pub(crate) fn read_entry<S: ByteStore>(
    store: &mut S,
    offset: u64,
    previous_index: Option<u8>,
) -> Result<Option<RadioIdEntry>> {
    let mut header = [0u8; RADIO_ID_HEADER_SIZE];
    store.read_exact_at(offset, &mut header)?;

    let index = header[0];
    if let Some(prev) = previous_index {
        if index < prev {
            trace!(offset, index, prev, "index decreased, end of radio ID table");
            return Ok(None);
        }
    }

    let id = read_u24_le(&header[1..])?;

    let mut name_buf = [0u8; RADIO_ID_NAME_WINDOW];
    let name_offset = offset + RADIO_ID_HEADER_SIZE as u64;
    let got = store.read_at(name_offset, &mut name_buf)?;
    let (name, name_length) = terminated_str(&name_buf[..got])
        .ok_or(CodeplugError::NoTerminator {
            offset: name_offset,
        })?;

    Ok(Some(RadioIdEntry {
        index,
        id,
        name,
        position: offset,
        length: RADIO_ID_HEADER_SIZE + name_length,
    }))
}

/// Overwrite just the 24-bit ID of the entry at `position`, leaving the
/// index byte and the raw name bytes exactly as they sit on disk. The
/// record's length cannot change, so no other entry is disturbed.
pub(crate) fn write_id<S: ByteStore>(store: &mut S, position: u64, id: u32) -> Result<()> {
    trace!(position, id, "patching radio ID in place");
    store.write_all_at(position + 1, &write_u24_le(id))?;
    Ok(())
}
