use crate::error::{FormatError, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Map a file read-only. The map must be dropped before the file can be
/// considered released.
pub fn read_binary_file_mmap(path: impl AsRef<Path>) -> io::Result<Mmap> {
    let file = File::open(path)?;
    // Safety: the file is not modified while the mmap is active
    unsafe { Mmap::map(&file) }
}

/// Seek to `offset` and read exactly `len` bytes.
///
/// The cursor position beforehand does not matter. A short read is reported
/// as [`FormatError::Truncated`] rather than an I/O error.
pub fn read_at<R: Read + Seek>(reader: &mut R, offset: u64, len: usize) -> Result<Vec<u8>> {
    reader.seek(SeekFrom::Start(offset))?;
    read_next(reader, offset, len)
}

/// Read exactly `len` bytes from the current position, which the caller
/// reports as `offset` in errors.
///
/// The buffer grows with what is actually read, so an oversized `len` from
/// a corrupt file costs nothing beyond the bytes present.
pub fn read_next<R: Read>(reader: &mut R, offset: u64, len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut buf)?;
    if buf.len() < len {
        return Err(FormatError::Truncated {
            offset,
            needed: len as u64,
            available: buf.len() as u64,
        });
    }
    Ok(buf)
}

/// Seek to `offset` and read everything up to end-of-stream.
pub fn read_to_end_at<R: Read + Seek>(reader: &mut R, offset: u64) -> Result<Vec<u8>> {
    let end = reader.seek(SeekFrom::End(0))?;
    if offset > end {
        return Err(FormatError::Truncated {
            offset,
            needed: 1,
            available: 0,
        });
    }
    reader.seek(SeekFrom::Start(offset))?;
    let mut buf = Vec::with_capacity((end - offset) as usize);
    reader.read_to_end(&mut buf)?;
    Ok(buf)
}
