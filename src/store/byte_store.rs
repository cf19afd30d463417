// Positioned reads and writes over an already-open codeplug byte source

use std::io::{self, Read, Seek, SeekFrom, Write};

/// Random-access byte source backing one codeplug handle.
///
/// Blanket-implemented for anything that is `Read + Write + Seek`, so the
/// library decodes a `std::fs::File` in production and a
/// `io::Cursor<Vec<u8>>` in tests without changing any codec code.
pub trait ByteStore {
    /// Read up to `buf.len()` bytes at `offset`, returning how many bytes
    /// were actually read. A read past end-of-store returns fewer bytes (or
    /// zero) instead of failing; callers that need a full block use
    /// `read_exact_at`.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Read exactly `buf.len()` bytes at `offset`, failing with
    /// `UnexpectedEof` if the store is shorter than required.
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()>;

    /// Write all of `buf` at `offset`, overwriting exactly that many bytes.
    fn write_all_at(&mut self, offset: u64, buf: &[u8]) -> io::Result<()>;

    /// Total length of the store in bytes.
    fn len(&mut self) -> io::Result<u64>;
}

impl<T: Read + Write + Seek> ByteStore for T {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.seek(SeekFrom::Start(offset))?;
        let mut total = 0;
        while total < buf.len() {
            match self.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(total)
    }

    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        self.seek(SeekFrom::Start(offset))?;
        self.read_exact(buf)
    }

    fn write_all_at(&mut self, offset: u64, buf: &[u8]) -> io::Result<()> {
        self.seek(SeekFrom::Start(offset))?;
        self.write_all(buf)
    }

    fn len(&mut self) -> io::Result<u64> {
        self.seek(SeekFrom::End(0))
    }
}
