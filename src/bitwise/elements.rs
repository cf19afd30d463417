// 24-bit little-endian scalar codec
// DMR radio IDs are stored as three bytes; no std integer width fits them

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ElementError {
    #[error("Insufficient data: expected {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, ElementError>;

/// Read a u24 (3 bytes) in little-endian format
pub fn read_u24_le(data: &[u8]) -> Result<u32> {
    if data.len() < 3 {
        return Err(ElementError::InsufficientData {
            expected: 3,
            actual: data.len(),
        });
    }
    Ok(u32::from_le_bytes([data[0], data[1], data[2], 0]))
}

/// Write a u24 (3 bytes) in little-endian format.
/// The upper 8 bits of the value are discarded.
pub fn write_u24_le(value: u32) -> [u8; 3] {
    let bytes = value.to_le_bytes();
    [bytes[0], bytes[1], bytes[2]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_u24_le() {
        assert_eq!(read_u24_le(&[0x01, 0x02, 0x03]).unwrap(), 0x030201);
        assert_eq!(read_u24_le(&[0xFF, 0xFF, 0xFF]).unwrap(), 0xFFFFFF);
        assert!(read_u24_le(&[0x01, 0x02]).is_err());
    }

    #[test]
    fn test_write_u24_le() {
        assert_eq!(write_u24_le(0x030201), [0x01, 0x02, 0x03]);
        // Upper byte is dropped
        assert_eq!(write_u24_le(0xAA030201), [0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_u24_round_trip() {
        for value in [0u32, 1, 0x1234, 3_100_001, 0xFFFFFF] {
            let bytes = write_u24_le(value);
            assert_eq!(read_u24_le(&bytes).unwrap(), value);
        }
    }
}
