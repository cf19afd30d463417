// Codeplug handle: fixed-header reads, radio ID table locator, queries,
// and the radio ID update engine

use std::fs::{File, OpenOptions};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::channel::{Channel, ChannelWalker};
use super::constants::{
    CHANNELS_START, MAX_RADIO_IDS, MAX_RADIO_ID_VALUE, MODEL_OFFSET, MODEL_SIZE,
    RADIO_ID_HEADER_SIZE, SECTION_PADDING, TOTAL_CHANNELS_ADDRESS,
};
use super::radio_id::{self, RadioIdEntry};
use crate::bitwise::elements::ElementError;
use crate::store::ByteStore;

#[derive(Error, Debug)]
pub enum CodeplugError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No null terminator in name scan window at offset {offset}")]
    NoTerminator { offset: u64 },

    #[error("Invalid radio ID index: {0}")]
    InvalidIndex(u8),

    #[error("Invalid radio ID: {0} (must be between 1 and 16777215)")]
    InvalidRadioId(u32),

    #[error("Channel {0} not found")]
    ChannelNotFound(usize),

    #[error("Radio ID with index {0} not found")]
    RadioIdNotFound(u8),

    #[error("Scalar decode error: {0}")]
    Element(#[from] ElementError),
}

pub type Result<T> = std::result::Result<T, CodeplugError>;

/// General information about a codeplug: the model string and the ordered
/// radio ID table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    pub model: String,
    pub radio_ids: Vec<RadioIdEntry>,
}

/// An open RDT codeplug.
///
/// Owns exclusive read/write access to the underlying byte store for the
/// duration of one command invocation. The store is the sole source of
/// truth: every query decodes fresh, every mutation writes through.
pub struct Codeplug<S: ByteStore> {
    store: S,
}

impl Codeplug<File> {
    /// Open an RDT file for reading and writing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self { store: file })
    }
}

impl<S: ByteStore> Codeplug<S> {
    /// Wrap an already-open random-access byte source.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Give the byte store back, closing the codeplug.
    pub fn into_inner(self) -> S {
        self.store
    }

    /// Model identifier string, with trailing NULs and spaces trimmed.
    pub fn model(&mut self) -> Result<String> {
        let mut buf = [0u8; MODEL_SIZE];
        self.store.read_exact_at(MODEL_OFFSET, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf)
            .trim_end_matches(&['\0', ' '][..])
            .to_string())
    }

    /// Total number of channel records in the file.
    pub fn channel_count(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.store.read_exact_at(TOTAL_CHANNELS_ADDRESS, &mut buf)?;
        Ok(buf[0])
    }

    /// Lazy iterator over every channel record in file order.
    pub fn channels(&mut self) -> Result<ChannelWalker<'_, S>> {
        let count = self.channel_count()?;
        Ok(ChannelWalker::new(&mut self.store, CHANNELS_START, count))
    }

    /// Absolute offset where the radio ID table begins.
    ///
    /// There is no pointer to the table anywhere in the file: the only way
    /// to find it is to replay the variable-length channel layout, record
    /// by record, and step over the two bytes of inter-section padding.
    pub fn radio_id_offset(&mut self) -> Result<u64> {
        let mut walker = self.channels()?;
        for channel in walker.by_ref() {
            channel?;
        }
        let offset = walker.offset() + SECTION_PADDING;
        debug!(offset, "located radio ID table");
        Ok(offset)
    }

    /// All channels, decoded in file order.
    pub fn get_channels(&mut self) -> Result<Vec<Channel>> {
        self.channels()?.collect()
    }

    /// The channel at the given file-order position (0-based).
    pub fn get_channel(&mut self, index: usize) -> Result<Channel> {
        for (i, channel) in self.channels()?.enumerate() {
            let channel = channel?;
            if i == index {
                return Ok(channel);
            }
        }
        Err(CodeplugError::ChannelNotFound(index))
    }

    /// All radio ID entries, in table order.
    pub fn get_radio_ids(&mut self) -> Result<Vec<RadioIdEntry>> {
        let table_start = self.radio_id_offset()?;
        self.scan_radio_ids(table_start)
    }

    /// The radio ID entry with the given slot index.
    pub fn get_radio_id(&mut self, index: u8) -> Result<RadioIdEntry> {
        self.get_radio_ids()?
            .into_iter()
            .find(|e| e.index == index)
            .ok_or(CodeplugError::RadioIdNotFound(index))
    }

    /// Model string and radio ID table in one call.
    pub fn info(&mut self) -> Result<Info> {
        Ok(Info {
            model: self.model()?,
            radio_ids: self.get_radio_ids()?,
        })
    }

    /// Set the radio ID in slot `index` to `new_id`.
    ///
    /// If an entry with that index exists, only its three ID bytes are
    /// rewritten; name, position, and length are untouched. Otherwise a new
    /// entry with a generated name is inserted after the last entry whose
    /// index is smaller or equal, and every byte from the insertion point
    /// to end-of-file is shifted forward by the new entry's length so the
    /// records behind it survive intact.
    pub fn update_radio_id(&mut self, index: u8, new_id: u32) -> Result<()> {
        if index as usize >= MAX_RADIO_IDS {
            return Err(CodeplugError::InvalidIndex(index));
        }
        if new_id == 0 || new_id > MAX_RADIO_ID_VALUE {
            return Err(CodeplugError::InvalidRadioId(new_id));
        }

        let table_start = self.radio_id_offset()?;
        let entries = self.scan_radio_ids(table_start)?;

        if let Some(existing) = entries.iter().find(|e| e.index == index) {
            debug!(
                index,
                new_id,
                position = existing.position,
                "rewriting radio ID in place"
            );
            // Patch only the ID bytes. Re-encoding the whole record would
            // go through the lossily-decoded name, which can change length.
            return radio_id::write_id(&mut self.store, existing.position, new_id);
        }

        let mut insert_at = table_start;
        for e in &entries {
            if e.index > index {
                break;
            }
            insert_at = e.position + e.length as u64;
        }

        let name = format!("Radio ID {}", index as usize + 1);
        let entry = RadioIdEntry {
            index,
            id: new_id,
            length: RADIO_ID_HEADER_SIZE + name.len() + 1,
            name,
            position: insert_at,
        };
        self.insert_radio_id(&entry)
    }

    /// Decode entries from `table_start` until the index-order heuristic
    /// fires or `MAX_RADIO_IDS` entries have been read.
    fn scan_radio_ids(&mut self, table_start: u64) -> Result<Vec<RadioIdEntry>> {
        let mut entries = Vec::new();
        let mut offset = table_start;
        let mut previous_index = None;

        for _ in 0..MAX_RADIO_IDS {
            match radio_id::read_entry(&mut self.store, offset, previous_index)? {
                Some(entry) => {
                    offset += entry.length as u64;
                    previous_index = Some(entry.index);
                    entries.push(entry);
                }
                None => break,
            }
        }
        Ok(entries)
    }

    /// Write a brand-new entry at its position, first moving everything
    /// from that position to end-of-file forward by the entry's encoded
    /// length.
    fn insert_radio_id(&mut self, entry: &RadioIdEntry) -> Result<()> {
        let file_len = self.store.len()?;
        let tail_len = file_len.saturating_sub(entry.position) as usize;
        let mut tail = vec![0u8; tail_len];
        self.store.read_exact_at(entry.position, &mut tail)?;

        let bytes = entry.to_bytes();
        debug!(
            index = entry.index,
            position = entry.position,
            shifted = tail_len,
            "inserting new radio ID entry"
        );
        self.store.write_all_at(entry.position, &bytes)?;
        self.store
            .write_all_at(entry.position + bytes.len() as u64, &tail)?;
        Ok(())
    }
}
