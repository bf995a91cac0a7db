//! Types for representing decoded pixel data

use crate::error::{FormatError, Result};
use crate::types::metadata::MetaValue;
use ndarray::Array2;
use serde::Serialize;

/// Pixel element type, selected by the header's dtype code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PixelType {
    Float32,
    Int32,
    Int16,
    UInt16,
    UInt32,
}

impl PixelType {
    /// Map a raw header code. Codes outside {0, 1, 2, 3, 8} are rejected.
    pub fn from_code(code: u16) -> Result<Self> {
        match code {
            0 => Ok(PixelType::Float32),
            1 => Ok(PixelType::Int32),
            2 => Ok(PixelType::Int16),
            3 => Ok(PixelType::UInt16),
            8 => Ok(PixelType::UInt32),
            _ => Err(FormatError::UnrecognizedDtypeCode { code }),
        }
    }

    pub fn code(self) -> u16 {
        match self {
            PixelType::Float32 => 0,
            PixelType::Int32 => 1,
            PixelType::Int16 => 2,
            PixelType::UInt16 => 3,
            PixelType::UInt32 => 8,
        }
    }

    /// Size of one element in bytes.
    pub fn size_bytes(self) -> usize {
        match self {
            PixelType::Int16 | PixelType::UInt16 => 2,
            PixelType::Float32 | PixelType::Int32 | PixelType::UInt32 => 4,
        }
    }
}

/// One region's pixels for one frame, row-major with shape (rows, columns).
#[derive(Debug, Clone, PartialEq)]
pub enum RegionData {
    Float32(Array2<f32>),
    Int32(Array2<i32>),
    Int16(Array2<i16>),
    UInt16(Array2<u16>),
    UInt32(Array2<u32>),
}

impl RegionData {
    pub fn pixel_type(&self) -> PixelType {
        match self {
            RegionData::Float32(_) => PixelType::Float32,
            RegionData::Int32(_) => PixelType::Int32,
            RegionData::Int16(_) => PixelType::Int16,
            RegionData::UInt16(_) => PixelType::UInt16,
            RegionData::UInt32(_) => PixelType::UInt32,
        }
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        match self {
            RegionData::Float32(a) => a.dim(),
            RegionData::Int32(a) => a.dim(),
            RegionData::Int16(a) => a.dim(),
            RegionData::UInt16(a) => a.dim(),
            RegionData::UInt32(a) => a.dim(),
        }
    }

    /// Widen to f64 for plotting or arithmetic across element types.
    pub fn to_f64(&self) -> Array2<f64> {
        match self {
            RegionData::Float32(a) => a.mapv(f64::from),
            RegionData::Int32(a) => a.mapv(f64::from),
            RegionData::Int16(a) => a.mapv(f64::from),
            RegionData::UInt16(a) => a.mapv(f64::from),
            RegionData::UInt32(a) => a.mapv(f64::from),
        }
    }

    pub fn as_f32(&self) -> Option<&Array2<f32>> {
        match self {
            RegionData::Float32(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<&Array2<i32>> {
        match self {
            RegionData::Int32(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<&Array2<i16>> {
        match self {
            RegionData::Int16(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<&Array2<u16>> {
        match self {
            RegionData::UInt16(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<&Array2<u32>> {
        match self {
            RegionData::UInt32(a) => Some(a),
            _ => None,
        }
    }
}

/// All regions of one frame plus its trailing metadata record, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub regions: Vec<RegionData>,
    pub metadata: Option<Vec<MetaValue>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_codes() {
        for code in [0u16, 1, 2, 3, 8] {
            let ty = PixelType::from_code(code).unwrap();
            assert_eq!(ty.code(), code);
        }
        let types: Vec<_> = [0u16, 1, 2, 3, 8]
            .iter()
            .map(|&c| PixelType::from_code(c).unwrap())
            .collect();
        assert_eq!(
            types,
            vec![
                PixelType::Float32,
                PixelType::Int32,
                PixelType::Int16,
                PixelType::UInt16,
                PixelType::UInt32
            ]
        );
    }

    #[test]
    fn test_unknown_dtype_codes_fail() {
        for code in [4u16, 5, 6, 7, 9, 255, u16::MAX] {
            assert!(matches!(
                PixelType::from_code(code),
                Err(FormatError::UnrecognizedDtypeCode { code: c }) if c == code
            ));
        }
    }

    #[test]
    fn test_region_shape_and_widening() {
        let region = RegionData::Int16(Array2::from_shape_vec((2, 3), vec![-1, 0, 1, 2, 3, 4]).unwrap());
        assert_eq!(region.shape(), (2, 3));
        assert_eq!(region.pixel_type(), PixelType::Int16);
        assert_eq!(region.to_f64()[[0, 0]], -1.0);
        assert!(region.as_u16().is_none());
    }
}
