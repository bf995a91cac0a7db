use winnow::{Parser, combinator::repeat, error::ContextError};

/// Byte offset of the 3 × f32 header version field.
pub const VERSION_OFFSET: u64 = 1992;
/// Byte offset of the u16 frame count.
pub const FRAME_COUNT_OFFSET: u64 = 1446;
/// Byte offset of the u16 pixel data type code.
pub const DTYPE_OFFSET: u64 = 108;
/// Byte offset of the u64 footer position.
pub const FOOTER_OFFSET_OFFSET: u64 = 678;
/// Byte offsets of the legacy u16 x/y dimensions.
pub const XDIM_OFFSET: u64 = 42;
pub const YDIM_OFFSET: u64 = 656;
/// The data section starts right after the fixed header.
pub const DATA_START_OFFSET: u64 = 4100;

/// Lowest header version this crate decodes.
pub const MIN_VERSION: f32 = 3.0;

/// Binned pixel coordinates along one axis: `start, start + binning, ...`
/// while below `start + extent`.
///
/// `binning` must be non-zero.
pub fn binned_coordinates(start: u32, extent: u32, binning: u32) -> Vec<u32> {
    debug_assert!(binning > 0);
    let end = start.saturating_add(extent);
    (start..end).step_by(binning as usize).collect()
}

/// Number of entries [`binned_coordinates`] would return, without building
/// the progression.
pub fn binned_len(start: u32, extent: u32, binning: u32) -> usize {
    debug_assert!(binning > 0);
    let end = start.saturating_add(extent);
    (start..end).step_by(binning.max(1) as usize).len()
}

/// Parse `count` consecutive little-endian values out of `bytes`.
pub(crate) fn parse_values<O>(
    bytes: &[u8],
    count: usize,
    mut element: impl FnMut(&mut &[u8]) -> Result<O, ContextError>,
) -> Result<Vec<O>, ContextError> {
    let mut input = bytes;
    repeat(count, |i: &mut &[u8]| element(i)).parse_next(&mut input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_binning() {
        assert_eq!(binned_coordinates(0, 8, 2), vec![0, 2, 4, 6]);
    }

    #[test]
    fn test_uneven_binning_rounds_up() {
        // 10 / 4 would give 2, the progression has 3 entries
        assert_eq!(binned_coordinates(3, 10, 4), vec![3, 7, 11]);
    }

    #[test]
    fn test_zero_extent() {
        assert!(binned_coordinates(5, 0, 1).is_empty());
        assert_eq!(binned_len(5, 0, 1), 0);
    }

    #[test]
    fn test_len_matches_progression() {
        for (start, extent, binning) in [(0, 8, 2), (3, 10, 4), (100, 320, 4), (7, 1, 3)] {
            assert_eq!(
                binned_len(start, extent, binning),
                binned_coordinates(start, extent, binning).len()
            );
        }
    }

    #[test]
    fn test_len_of_huge_extent() {
        assert_eq!(binned_len(0, 4_000_000_000, 1), 4_000_000_000);
        assert_eq!(binned_len(0, 4_000_000_000, 4), 1_000_000_000);
    }

    #[test]
    fn test_parse_values_exact_count() {
        use winnow::binary::le_u16;
        let bytes = [1, 0, 2, 0, 3];
        let values = parse_values(&bytes, 2, |i| le_u16(i)).unwrap();
        assert_eq!(values, vec![1, 2]);
        assert!(parse_values(&bytes, 3, |i| le_u16(i)).is_err());
    }
}
