use crate::error::Result;
use crate::types::pixel_data::PixelType;
use bon::Builder;
use serde::Serialize;

/// Scalar fields read from fixed offsets in the 4100-byte binary header.
///
/// Only `frame_count` and `dtype_code` drive decoding; geometry comes from
/// the XML footer. `xdim`/`ydim` are the legacy header dimensions and are
/// kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Builder, Serialize)]
pub struct Header {
    pub version: f32,
    pub frame_count: u16,
    pub dtype_code: u16,
    pub footer_offset: u64,
    #[builder(default)]
    pub xdim: u16,
    #[builder(default)]
    pub ydim: u16,
}

impl Header {
    /// Element type of the pixel data.
    pub fn pixel_type(&self) -> Result<PixelType> {
        PixelType::from_code(self.dtype_code)
    }
}
