use crate::error::{FormatError, Result};
use crate::parser::metadata_parser::record_size;
use crate::types::metadata::{MetaField, MetaType, MetaValue};
use crate::types::pixel_data::{Frame, PixelType, RegionData};
use crate::utils::file_utils::read_next;
use crate::utils::misc::parse_values;
use ndarray::Array2;
use std::io::{Read, Seek, SeekFrom};
use tracing::{trace, warn};
use winnow::{
    Parser,
    binary::{le_f32, le_f64, le_i16, le_i32, le_i64, le_u16, le_u32},
    error::ContextError,
};

/// What the decoder needs to walk the data section.
#[derive(Debug, Clone)]
pub struct FrameStreamLayout<'a> {
    pub pixel_type: PixelType,
    /// (rows, columns) per region, in region order
    pub region_dims: &'a [(usize, usize)],
    pub frame_count: usize,
    /// Bytes per frame, including metadata and padding
    pub stride: u64,
    pub schema: Option<&'a [MetaField]>,
    /// Reject frames whose regions and metadata leave unread bytes in the stride
    pub strict: bool,
}

impl FrameStreamLayout<'_> {
    /// Bytes of one frame the decoder actually interprets, `None` when the
    /// declared region dimensions overflow.
    pub fn consumed_per_frame(&self) -> Option<u64> {
        let pixels = self.region_dims.iter().try_fold(0usize, |total, &(rows, cols)| {
            total.checked_add(region_bytes(rows, cols, self.pixel_type)?)
        })?;
        let metadata = self.schema.map(record_size).unwrap_or(0);
        u64::try_from(pixels.checked_add(metadata)?).ok()
    }

    fn overflow(&self) -> FormatError {
        FormatError::InconsistentLayout {
            consumed: u64::MAX,
            stride: self.stride,
        }
    }
}

/// Bytes of a `rows` × `cols` region, `None` on overflow.
fn region_bytes(rows: usize, cols: usize, pixel_type: PixelType) -> Option<usize> {
    rows.checked_mul(cols)?.checked_mul(pixel_type.size_bytes())
}

/// Decode every frame from a reader positioned at the start of the data
/// section, which sits at `data_offset` in the file.
///
/// Each frame is read with one exact `stride`-byte read; regions are sliced
/// off in order, then the metadata record. A short read anywhere fails the
/// whole decode with [`FormatError::Truncated`], so no partial frame list
/// is ever returned. The total `frame_count × stride` is checked against
/// what the stream still holds before any frame buffer is allocated.
pub fn parse_frames<R: Read + Seek>(
    reader: &mut R,
    data_offset: u64,
    layout: &FrameStreamLayout<'_>,
) -> Result<Vec<Frame>> {
    let consumed = layout.consumed_per_frame().ok_or_else(|| layout.overflow())?;
    if consumed > layout.stride || (layout.strict && consumed != layout.stride) {
        return Err(FormatError::InconsistentLayout {
            consumed,
            stride: layout.stride,
        });
    }
    if consumed < layout.stride {
        warn!(
            consumed,
            stride = layout.stride,
            "frame stride has bytes beyond regions and metadata; skipping them"
        );
    }

    let start = reader.stream_position()?;
    let end = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(start))?;
    let available = end.saturating_sub(start);
    let truncated = |needed: u64| FormatError::Truncated {
        offset: data_offset,
        needed,
        available,
    };
    let needed = (layout.frame_count as u64)
        .checked_mul(layout.stride)
        .ok_or_else(|| truncated(u64::MAX))?;
    if needed > available {
        return Err(truncated(needed));
    }
    let stride = usize::try_from(layout.stride).map_err(|_| truncated(needed))?;

    let mut frames = Vec::with_capacity(layout.frame_count);
    for index in 0..layout.frame_count {
        let frame_offset = data_offset + index as u64 * layout.stride;
        let bytes = read_next(reader, frame_offset, stride)?;
        trace!(frame = index, offset = frame_offset, "decoding frame");
        frames.push(parse_frame(&bytes, frame_offset, layout)?);
    }
    Ok(frames)
}

/// Decode one frame's bytes.
pub fn parse_frame(bytes: &[u8], frame_offset: u64, layout: &FrameStreamLayout<'_>) -> Result<Frame> {
    let mut position = 0usize;
    let mut regions = Vec::with_capacity(layout.region_dims.len());
    for &(rows, cols) in layout.region_dims {
        let len = region_bytes(rows, cols, layout.pixel_type).ok_or_else(|| layout.overflow())?;
        let block = slice(bytes, position, len, frame_offset)?;
        regions.push(parse_region(block, layout.pixel_type, rows, cols, frame_offset + position as u64)?);
        position += len;
    }

    let metadata = match layout.schema {
        Some(schema) => {
            let block = slice(bytes, position, record_size(schema), frame_offset)?;
            Some(parse_metadata_record(block, schema, frame_offset + position as u64)?)
        }
        None => None,
    };

    Ok(Frame { regions, metadata })
}

fn slice(bytes: &[u8], position: usize, len: usize, frame_offset: u64) -> Result<&[u8]> {
    position
        .checked_add(len)
        .and_then(|end| bytes.get(position..end))
        .ok_or(FormatError::Truncated {
            offset: frame_offset + position as u64,
            needed: len as u64,
            available: bytes.len().saturating_sub(position) as u64,
        })
}

/// Decode one region block into a row-major (rows, cols) array.
pub fn parse_region(
    block: &[u8],
    pixel_type: PixelType,
    rows: usize,
    cols: usize,
    offset: u64,
) -> Result<RegionData> {
    let count = rows.checked_mul(cols).ok_or(FormatError::Truncated {
        offset,
        needed: u64::MAX,
        available: block.len() as u64,
    })?;
    let region = match pixel_type {
        PixelType::Float32 => RegionData::Float32(shaped(parse_block(block, count, offset, |i| le_f32(i))?, rows, cols, offset)?),
        PixelType::Int32 => RegionData::Int32(shaped(parse_block(block, count, offset, |i| le_i32(i))?, rows, cols, offset)?),
        PixelType::Int16 => RegionData::Int16(shaped(parse_block(block, count, offset, |i| le_i16(i))?, rows, cols, offset)?),
        PixelType::UInt16 => RegionData::UInt16(shaped(parse_block(block, count, offset, |i| le_u16(i))?, rows, cols, offset)?),
        PixelType::UInt32 => RegionData::UInt32(shaped(parse_block(block, count, offset, |i| le_u32(i))?, rows, cols, offset)?),
    };
    Ok(region)
}

fn parse_block<O>(
    block: &[u8],
    count: usize,
    offset: u64,
    element: impl FnMut(&mut &[u8]) -> std::result::Result<O, ContextError>,
) -> Result<Vec<O>> {
    parse_values(block, count, element).map_err(|_| FormatError::Truncated {
        offset,
        needed: block.len() as u64,
        available: block.len() as u64,
    })
}

fn shaped<T>(values: Vec<T>, rows: usize, cols: usize, offset: u64) -> Result<Array2<T>> {
    let available = values.len() as u64;
    Array2::from_shape_vec((rows, cols), values).map_err(|_| FormatError::Truncated {
        offset,
        needed: (rows * cols) as u64,
        available,
    })
}

/// Decode one metadata record, one scalar per schema entry in schema order.
pub fn parse_metadata_record(block: &[u8], schema: &[MetaField], offset: u64) -> Result<Vec<MetaValue>> {
    let mut input = block;
    schema
        .iter()
        .map(|field| {
            let value = match field.kind {
                MetaType::Int64 => le_i64.map(MetaValue::Int64).parse_next(&mut input),
                MetaType::Float64 => le_f64.map(MetaValue::Float64).parse_next(&mut input),
            };
            value.map_err(|_: ContextError| FormatError::Truncated {
                offset,
                needed: record_size(schema) as u64,
                available: block.len() as u64,
            })
        })
        .collect()
}
