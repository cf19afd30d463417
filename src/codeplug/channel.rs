// Channel record decoder
//
// A channel record is a 49-byte fixed header block, a null-terminated name,
// and a 27-byte trailing block. The name makes every record's length its
// own, so the only way to find the record after this one is the decoded
// `total_length`.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::constants::{
    CHANNEL_HEADER_SIZE, CHANNEL_NAME_WINDOW, CHANNEL_TRAILER_REQUIRED, CHANNEL_TRAILER_SIZE,
};
use super::layout::{terminated_str, Block, Field};
use super::rdt::{CodeplugError, Result};
use crate::store::ByteStore;

// Field positions inside the fixed header block. Offsets not listed are
// padding the format leaves between fields.
const RX_FREQ: Field<u32> = Field::at(3);
const TX_FREQ_DIRECTION: Field<u8> = Field::at(7);
const TX_FREQ: Field<i32> = Field::at(8);
const CHANNEL_TYPE: Field<u8> = Field::at(12);
const TX_POWER: Field<u8> = Field::at(13);
const BANDWIDTH: Field<u8> = Field::at(14);
const PTT_PROHIBIT: Field<u8> = Field::at(16);
const CALL_CONFIRMATION: Field<u8> = Field::at(17);
const TALK_AROUND: Field<u8> = Field::at(18);
const CTCSS_DCS_DECODE: Field<u8> = Field::at(19);
const CTCSS_DCS_DECODE_OPTION: Field<u8> = Field::at(20);
const CTCSS_DCS_ENCODE: Field<u8> = Field::at(23);
const CTCSS_DCS_ENCODE_OPTION: Field<u8> = Field::at(24);
const CONTACT: Field<u8> = Field::at(29);
const RADIO_ID: Field<u8> = Field::at(31);
const TX_PERMIT: Field<u8> = Field::at(33);
const SQUELCH_MODE: Field<u8> = Field::at(34);
const SCAN_LIST: Field<i8> = Field::at(35);
const RECEIVE_GROUP_LIST: Field<u8> = Field::at(36);
const RX_COLOR_CODE: Field<u8> = Field::at(41);
const SLOT: Field<u8> = Field::at(42);
const SLOT_SUIT: Field<u8> = Field::at(44);
const APRS_RX: Field<u8> = Field::at(45);
const AES_ENCRYPTION_KEY: Field<u8> = Field::at(46);
const WORK_ALONE: Field<u8> = Field::at(47);

// Field positions inside the trailing block that follows the name.
const RANGING: Field<u8> = Field::at(2);
const CORRECT_FREQ: Field<i8> = Field::at(8);
const SMS_CONFIRMATION: Field<u8> = Field::at(11);
const EXCLUDE_FROM_ROAMING: Field<u8> = Field::at(12);
const MULTIPLE_KEY: Field<u8> = Field::at(15);
const RANDOM_KEY: Field<u8> = Field::at(16);
const SMS_FORBID: Field<u8> = Field::at(17);
const DATA_ACK_DISABLE: Field<u8> = Field::at(18);
const AUTO_SCAN: Field<u8> = Field::at(21);
// These two sit at or past the nominal end of the trailing block in some
// files and decode as zero when the block comes up short.
const SEND_TALKER_ALIAS: Field<u8> = Field::at(22);
const EXTEND_ENCRYPTION: Field<u8> = Field::at(27);

/// One decoded channel record. Decoded fresh from the byte store on every
/// query; never written back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    /// Receive frequency in 10 Hz units
    pub rx_freq: u32,
    pub tx_freq_direction: u8,
    /// Transmit frequency or offset in 10 Hz units
    pub tx_freq: i32,
    pub channel_type: u8,
    pub tx_power: u8,
    pub bandwidth: u8,
    pub ptt_prohibit: u8,
    pub call_confirmation: u8,
    pub talk_around: u8,
    pub ctcss_dcs_decode: u8,
    pub ctcss_dcs_decode_option: u8,
    pub ctcss_dcs_encode: u8,
    pub ctcss_dcs_encode_option: u8,
    pub contact: u8,
    pub radio_id: u8,
    pub tx_permit: u8,
    pub squelch_mode: u8,
    pub scan_list: i8,
    pub receive_group_list: u8,
    pub rx_color_code: u8,
    pub slot: u8,
    pub slot_suit: u8,
    pub aprs_rx: u8,
    pub aes_encryption_key: u8,
    pub work_alone: u8,
    /// Channel name, without its terminator
    pub name: String,
    pub ranging: u8,
    pub correct_freq: i8,
    pub sms_confirmation: u8,
    pub exclude_from_roaming: u8,
    pub multiple_key: u8,
    pub random_key: u8,
    pub sms_forbid: u8,
    pub data_ack_disable: u8,
    pub auto_scan: u8,
    pub send_talker_alias: u8,
    pub extend_encryption: u8,

    /// Absolute offset of the name field
    pub name_offset: u64,
    /// Name length including the terminator
    pub name_length: usize,
    /// Exact number of bytes this record occupies. The caller advances by
    /// this to reach the next record; getting it wrong desynchronizes every
    /// offset after it.
    pub total_length: usize,
}

/// Decode one channel record at the given absolute offset.
pub fn read_channel<S: ByteStore>(store: &mut S, offset: u64) -> Result<Channel> {
    let mut header = [0u8; CHANNEL_HEADER_SIZE];
    store.read_exact_at(offset, &mut header)?;

    let name_offset = offset + CHANNEL_HEADER_SIZE as u64;
    let mut name_buf = [0u8; CHANNEL_NAME_WINDOW];
    let got = store.read_at(name_offset, &mut name_buf)?;
    let (name, name_length) = terminated_str(&name_buf[..got])
        .ok_or(CodeplugError::NoTerminator {
            offset: name_offset,
        })?;

    // The trailing block may be cut short at end-of-file, but only past
    // `auto_scan`: the two diagnostic flags at the end decode as zero,
    // everything before them must be present.
    let trailer_offset = name_offset + name_length as u64;
    let mut trailer_buf = [0u8; CHANNEL_TRAILER_SIZE];
    store.read_exact_at(trailer_offset, &mut trailer_buf[..CHANNEL_TRAILER_REQUIRED])?;
    let got = store.read_at(
        trailer_offset + CHANNEL_TRAILER_REQUIRED as u64,
        &mut trailer_buf[CHANNEL_TRAILER_REQUIRED..],
    )?;

    let total_length = CHANNEL_HEADER_SIZE + name_length + CHANNEL_TRAILER_SIZE;
    trace!(offset, name = %name, total_length, "decoded channel record");

    let header = Block::new(&header);
    let trailer = Block::new(&trailer_buf[..CHANNEL_TRAILER_REQUIRED + got]);

    Ok(Channel {
        rx_freq: header.get(RX_FREQ),
        tx_freq_direction: header.get(TX_FREQ_DIRECTION),
        tx_freq: header.get(TX_FREQ),
        channel_type: header.get(CHANNEL_TYPE),
        tx_power: header.get(TX_POWER),
        bandwidth: header.get(BANDWIDTH),
        ptt_prohibit: header.get(PTT_PROHIBIT),
        call_confirmation: header.get(CALL_CONFIRMATION),
        talk_around: header.get(TALK_AROUND),
        ctcss_dcs_decode: header.get(CTCSS_DCS_DECODE),
        ctcss_dcs_decode_option: header.get(CTCSS_DCS_DECODE_OPTION),
        ctcss_dcs_encode: header.get(CTCSS_DCS_ENCODE),
        ctcss_dcs_encode_option: header.get(CTCSS_DCS_ENCODE_OPTION),
        contact: header.get(CONTACT),
        radio_id: header.get(RADIO_ID),
        tx_permit: header.get(TX_PERMIT),
        squelch_mode: header.get(SQUELCH_MODE),
        scan_list: header.get(SCAN_LIST),
        receive_group_list: header.get(RECEIVE_GROUP_LIST),
        rx_color_code: header.get(RX_COLOR_CODE),
        slot: header.get(SLOT),
        slot_suit: header.get(SLOT_SUIT),
        aprs_rx: header.get(APRS_RX),
        aes_encryption_key: header.get(AES_ENCRYPTION_KEY),
        work_alone: header.get(WORK_ALONE),
        name,
        ranging: trailer.get(RANGING),
        correct_freq: trailer.get(CORRECT_FREQ),
        sms_confirmation: trailer.get(SMS_CONFIRMATION),
        exclude_from_roaming: trailer.get(EXCLUDE_FROM_ROAMING),
        multiple_key: trailer.get(MULTIPLE_KEY),
        random_key: trailer.get(RANDOM_KEY),
        sms_forbid: trailer.get(SMS_FORBID),
        data_ack_disable: trailer.get(DATA_ACK_DISABLE),
        auto_scan: trailer.get(AUTO_SCAN),
        send_talker_alias: trailer.get_or_zero(SEND_TALKER_ALIAS),
        extend_encryption: trailer.get_or_zero(EXTEND_ENCRYPTION),
        name_offset,
        name_length,
        total_length,
    })
}

/// Lazy decode-and-advance iterator over the channel record sequence.
///
/// This is the single place record lengths turn into offsets; everything
/// that needs to walk channels (queries and the radio ID table locator)
/// drains one of these instead of repeating the arithmetic.
pub struct ChannelWalker<'a, S: ByteStore> {
    store: &'a mut S,
    offset: u64,
    remaining: usize,
    poisoned: bool,
}

impl<'a, S: ByteStore> ChannelWalker<'a, S> {
    pub(crate) fn new(store: &'a mut S, start: u64, count: u8) -> Self {
        Self {
            store,
            offset: start,
            remaining: count as usize,
            poisoned: false,
        }
    }

    /// Absolute offset of the next undecoded record. Once the walker is
    /// exhausted this is the end of the channel section.
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl<S: ByteStore> Iterator for ChannelWalker<'_, S> {
    type Item = Result<Channel>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.poisoned || self.remaining == 0 {
            return None;
        }
        match read_channel(self.store, self.offset) {
            Ok(channel) => {
                self.offset += channel.total_length as u64;
                self.remaining -= 1;
                Some(Ok(channel))
            }
            // One corrupt record invalidates every offset after it
            Err(e) => {
                self.poisoned = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Build one synthetic channel record with the interesting scalar
    /// fields populated.
    fn record(name: &str, rx_freq: u32, tx_freq: i32) -> Vec<u8> {
        let mut rec = vec![0u8; CHANNEL_HEADER_SIZE];
        rec[3..7].copy_from_slice(&rx_freq.to_le_bytes());
        rec[8..12].copy_from_slice(&tx_freq.to_le_bytes());
        rec[13] = 2; // tx_power
        rec[41] = 7; // rx_color_code
        rec[42] = 1; // slot
        rec.extend_from_slice(name.as_bytes());
        rec.push(0);
        let mut trailer = vec![0u8; CHANNEL_TRAILER_SIZE];
        trailer[2] = 1; // ranging
        trailer[8] = 0xFB; // correct_freq = -5
        rec.extend_from_slice(&trailer);
        rec
    }

    #[test]
    fn test_decode_fields() {
        let data = record("Calling", 43_937_500, 43_937_500);
        let mut store = Cursor::new(data.clone());

        let channel = read_channel(&mut store, 0).unwrap();
        assert_eq!(channel.rx_freq, 43_937_500);
        assert_eq!(channel.tx_freq, 43_937_500);
        assert_eq!(channel.tx_power, 2);
        assert_eq!(channel.rx_color_code, 7);
        assert_eq!(channel.slot, 1);
        assert_eq!(channel.name, "Calling");
        assert_eq!(channel.ranging, 1);
        assert_eq!(channel.correct_freq, -5);
        assert_eq!(channel.name_offset, CHANNEL_HEADER_SIZE as u64);
        assert_eq!(channel.name_length, 8);
        assert_eq!(channel.total_length, data.len());
    }

    #[test]
    fn test_total_length_tracks_name() {
        for name in ["A", "Repeater 1", "A name right at limit 12345678"] {
            let data = record(name, 0, 0);
            let mut store = Cursor::new(data.clone());
            let channel = read_channel(&mut store, 0).unwrap();
            assert_eq!(
                channel.total_length,
                CHANNEL_HEADER_SIZE + name.len() + 1 + CHANNEL_TRAILER_SIZE
            );
            assert_eq!(channel.total_length, data.len());
        }
    }

    #[test]
    fn test_missing_terminator_is_corrupt() {
        let mut data = vec![0u8; CHANNEL_HEADER_SIZE];
        // Fill the whole scan window and beyond with non-zero bytes
        data.extend_from_slice(&[b'X'; CHANNEL_NAME_WINDOW + 8]);
        let mut store = Cursor::new(data);

        let err = read_channel(&mut store, 0).unwrap_err();
        match err {
            CodeplugError::NoTerminator { offset } => {
                assert_eq!(offset, CHANNEL_HEADER_SIZE as u64)
            }
            other => panic!("expected NoTerminator, got {other:?}"),
        }
    }

    #[test]
    fn test_trailer_diagnostic_flags_tolerate_short_reads() {
        // Record ends right after auto_scan; the flags past it decode as
        // zero and the other trailer fields keep their values
        let full = record("Cut", 100, 100);
        let data = full[..CHANNEL_HEADER_SIZE + 4 + CHANNEL_TRAILER_REQUIRED].to_vec();
        let mut store = Cursor::new(data);

        let channel = read_channel(&mut store, 0).unwrap();
        assert_eq!(channel.ranging, 1);
        assert_eq!(channel.correct_freq, -5);
        assert_eq!(channel.send_talker_alias, 0);
        assert_eq!(channel.extend_encryption, 0);
        // Length accounting is unchanged by the short read
        assert_eq!(
            channel.total_length,
            CHANNEL_HEADER_SIZE + 4 + CHANNEL_TRAILER_SIZE
        );
    }

    #[test]
    fn test_trailer_truncated_before_auto_scan_errors() {
        // Cutting into the mandatory trailer fields must not silently
        // decode them as zero
        let full = record("Cut", 100, 100);
        let data = full[..CHANNEL_HEADER_SIZE + 4 + 20].to_vec();
        let mut store = Cursor::new(data);

        assert!(matches!(
            read_channel(&mut store, 0),
            Err(CodeplugError::Io(_))
        ));
    }

    #[test]
    fn test_walker_advances_by_record_length() {
        let mut data = Vec::new();
        let names = ["One", "Channel two", "3"];
        for name in names {
            data.extend_from_slice(&record(name, 1000, 1000));
        }
        let mut store = Cursor::new(data);

        let mut walker = ChannelWalker::new(&mut store, 0, names.len() as u8);
        let decoded: Vec<_> = walker.by_ref().collect::<Result<_>>().unwrap();
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded[1].name, "Channel two");

        let expected_end: usize = names
            .iter()
            .map(|n| CHANNEL_HEADER_SIZE + n.len() + 1 + CHANNEL_TRAILER_SIZE)
            .sum();
        assert_eq!(walker.offset(), expected_end as u64);
    }

    #[test]
    fn test_walker_stops_after_error() {
        // First record is fine, second has no name terminator
        let mut data = record("Good", 1, 1);
        data.extend_from_slice(&vec![0u8; CHANNEL_HEADER_SIZE]);
        data.extend_from_slice(&[b'X'; CHANNEL_NAME_WINDOW + 8]);
        let mut store = Cursor::new(data);

        let mut walker = ChannelWalker::new(&mut store, 0, 3);
        assert!(walker.next().unwrap().is_ok());
        assert!(walker.next().unwrap().is_err());
        assert!(walker.next().is_none());
    }
}
