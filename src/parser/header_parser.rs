use crate::error::{FormatError, Result};
use crate::types::header::Header;
use crate::utils::file_utils::read_at;
use crate::utils::misc::{
    DTYPE_OFFSET, FOOTER_OFFSET_OFFSET, FRAME_COUNT_OFFSET, MIN_VERSION, VERSION_OFFSET,
    XDIM_OFFSET, YDIM_OFFSET, parse_values,
};
use std::io::{Read, Seek};
use winnow::{
    binary::{le_f32, le_u16, le_u64},
    error::ContextError,
};

/// Seek to `offset`, read `count` elements of `width` bytes and decode them.
fn read_values_at<R, O>(
    reader: &mut R,
    offset: u64,
    count: usize,
    width: usize,
    element: impl FnMut(&mut &[u8]) -> std::result::Result<O, ContextError>,
) -> Result<Vec<O>>
where
    R: Read + Seek,
{
    let bytes = read_at(reader, offset, count * width)?;
    parse_values(&bytes, count, element).map_err(|_| FormatError::Truncated {
        offset,
        needed: (count * width) as u64,
        available: bytes.len() as u64,
    })
}

fn read_u16_at<R: Read + Seek>(reader: &mut R, offset: u64) -> Result<u16> {
    let values = read_values_at(reader, offset, 1, 2, |i| le_u16(i))?;
    Ok(values[0])
}

/// Reads the scalar header fields.
///
/// Field offsets in the 4100-byte header:
/// - 108: u16 pixel data type code
/// - 678: u64 byte offset of the XML footer
/// - 1446: u16 frame count
/// - 1992: 3 × f32 version, first element used
/// - 42 / 656: legacy u16 x / y dimensions
///
/// Fails with [`FormatError::UnsupportedVersion`] below version 3.0, before
/// any other field is read.
pub fn parse_header<R: Read + Seek>(reader: &mut R) -> Result<Header> {
    let version = read_values_at(reader, VERSION_OFFSET, 3, 4, |i| le_f32(i))?[0];
    if version.is_nan() || version < MIN_VERSION {
        return Err(FormatError::UnsupportedVersion { version });
    }

    let frame_count = read_u16_at(reader, FRAME_COUNT_OFFSET)?;
    let dtype_code = read_u16_at(reader, DTYPE_OFFSET)?;
    let footer_offset = read_values_at(reader, FOOTER_OFFSET_OFFSET, 1, 8, |i| le_u64(i))?[0];
    let xdim = read_u16_at(reader, XDIM_OFFSET)?;
    let ydim = read_u16_at(reader, YDIM_OFFSET)?;

    let header = Header::builder()
        .version(version)
        .frame_count(frame_count)
        .dtype_code(dtype_code)
        .footer_offset(footer_offset)
        .xdim(xdim)
        .ydim(ydim)
        .build();
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn header_bytes(version: f32, frames: u16, dtype: u16, footer: u64) -> Vec<u8> {
        let mut bytes = vec![0u8; 4100];
        bytes[1992..1996].copy_from_slice(&version.to_le_bytes());
        bytes[1446..1448].copy_from_slice(&frames.to_le_bytes());
        bytes[108..110].copy_from_slice(&dtype.to_le_bytes());
        bytes[678..686].copy_from_slice(&footer.to_le_bytes());
        bytes[42..44].copy_from_slice(&64u16.to_le_bytes());
        bytes[656..658].copy_from_slice(&32u16.to_le_bytes());
        bytes
    }

    #[test]
    fn test_parse_header() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut cursor = Cursor::new(header_bytes(3.0, 10, 3, 12345));
        let header = parse_header(&mut cursor)?;
        assert_eq!(header.version, 3.0);
        assert_eq!(header.frame_count, 10);
        assert_eq!(header.dtype_code, 3);
        assert_eq!(header.footer_offset, 12345);
        assert_eq!((header.xdim, header.ydim), (64, 32));
        Ok(())
    }

    #[test]
    fn test_legacy_version_rejected() {
        let mut cursor = Cursor::new(header_bytes(2.5, 1, 3, 0));
        assert!(matches!(
            parse_header(&mut cursor),
            Err(FormatError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_truncated_header() {
        let mut cursor = Cursor::new(vec![0u8; 1000]);
        assert!(matches!(
            parse_header(&mut cursor),
            Err(FormatError::Truncated { offset: 1992, .. })
        ));
    }
}
