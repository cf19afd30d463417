// Declarative fixed-offset field layout for record blocks
// Each record block is described once as a table of typed Field constants
// instead of scattering offset arithmetic through the decoder

use std::marker::PhantomData;

/// Scalar kinds that occupy a fixed-width slot in a record block.
/// Multi-byte values are little-endian, matching the RDT format.
pub(crate) trait Scalar: Copy + Default {
    const WIDTH: usize;
    fn decode(data: &[u8]) -> Self;
}

impl Scalar for u8 {
    const WIDTH: usize = 1;
    fn decode(data: &[u8]) -> Self {
        data[0]
    }
}

impl Scalar for i8 {
    const WIDTH: usize = 1;
    fn decode(data: &[u8]) -> Self {
        data[0] as i8
    }
}

impl Scalar for u32 {
    const WIDTH: usize = 4;
    fn decode(data: &[u8]) -> Self {
        u32::from_le_bytes([data[0], data[1], data[2], data[3]])
    }
}

impl Scalar for i32 {
    const WIDTH: usize = 4;
    fn decode(data: &[u8]) -> Self {
        i32::from_le_bytes([data[0], data[1], data[2], data[3]])
    }
}

/// One fixed-position field inside a record block: a constant byte offset
/// plus the scalar kind that lives there. Offsets not covered by any field
/// are padding; they still count toward the block size.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Field<T> {
    offset: usize,
    _kind: PhantomData<T>,
}

impl<T: Scalar> Field<T> {
    pub(crate) const fn at(offset: usize) -> Self {
        Self {
            offset,
            _kind: PhantomData,
        }
    }
}

/// Read-only view over one fixed-size block of a record.
/// Callers hand it a buffer sized to the governing block constant, so `get`
/// on an in-block field cannot run out of bounds.
pub(crate) struct Block<'a> {
    data: &'a [u8],
}

impl<'a> Block<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub(crate) fn get<T: Scalar>(&self, field: Field<T>) -> T {
        T::decode(&self.data[field.offset..field.offset + T::WIDTH])
    }

    /// Like `get`, but substitutes zero when the field lies past the end of
    /// the block. Used for the optional diagnostic flags near the nominal
    /// end of the channel trailer, which some files cut short.
    pub(crate) fn get_or_zero<T: Scalar>(&self, field: Field<T>) -> T {
        if field.offset + T::WIDTH <= self.data.len() {
            self.get(field)
        } else {
            T::default()
        }
    }
}

/// Split a null-terminated string out of a bounded scan window. Returns the
/// decoded text and the number of bytes consumed including the terminator,
/// or None when the window holds no terminator.
pub(crate) fn terminated_str(window: &[u8]) -> Option<(String, usize)> {
    let nul = window.iter().position(|&b| b == 0)?;
    Some((String::from_utf8_lossy(&window[..nul]).into_owned(), nul + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_get() {
        let data = [0xFEu8, 0x01, 0x02, 0x03, 0x04, 0xFF];
        let block = Block::new(&data);

        assert_eq!(block.get(Field::<u8>::at(0)), 0xFE);
        assert_eq!(block.get(Field::<i8>::at(5)), -1);
        assert_eq!(block.get(Field::<u32>::at(1)), 0x04030201);
        assert_eq!(block.get(Field::<i32>::at(1)), 0x04030201);
    }

    #[test]
    fn test_get_or_zero_past_end() {
        let data = [0x11u8, 0x22];
        let block = Block::new(&data);

        assert_eq!(block.get_or_zero(Field::<u8>::at(1)), 0x22);
        assert_eq!(block.get_or_zero(Field::<u8>::at(2)), 0);
        assert_eq!(block.get_or_zero(Field::<u32>::at(0)), 0);
    }

    #[test]
    fn test_terminated_str() {
        let (name, len) = terminated_str(b"Simplex\0junk").unwrap();
        assert_eq!(name, "Simplex");
        assert_eq!(len, 8);

        // Empty name is a single terminator byte
        let (name, len) = terminated_str(b"\0rest").unwrap();
        assert_eq!(name, "");
        assert_eq!(len, 1);

        // No terminator in the window
        assert!(terminated_str(b"no terminator here").is_none());
    }
}
