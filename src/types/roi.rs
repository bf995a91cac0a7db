//! Region-of-interest geometry and calibration types

use crate::utils::misc::{binned_coordinates, binned_len};
use bon::Builder;
use serde::Serialize;

/// A rectangular sensor window as described by the camera readout settings.
///
/// `width`/`height` are the extent in sensor pixels; the number of stored
/// pixels per axis is the length of the binned coordinate progression.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize)]
pub struct RegionOfInterest {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    #[builder(default = 1)]
    pub x_binning: u32,
    #[builder(default = 1)]
    pub y_binning: u32,
}

impl RegionOfInterest {
    /// Sensor x coordinate of every stored column.
    pub fn xcoords(&self) -> Vec<u32> {
        binned_coordinates(self.x, self.width, self.x_binning)
    }

    /// Sensor y coordinate of every stored row.
    pub fn ycoords(&self) -> Vec<u32> {
        binned_coordinates(self.y, self.height, self.y_binning)
    }

    /// (rows, columns) implied by the binning progression.
    pub fn binned_dims(&self) -> (usize, usize) {
        (
            binned_len(self.y, self.height, self.y_binning),
            binned_len(self.x, self.width, self.x_binning),
        )
    }
}

/// Width/height declared on a per-region `DataBlock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegionBlock {
    pub width: usize,
    pub height: usize,
}

/// Byte layout of one frame in the data section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataLayout {
    /// Bytes per frame including any metadata record
    pub stride: u64,
    /// Bytes of pixel data per frame
    pub size: u64,
    pub region_blocks: Vec<RegionBlock>,
}

impl DataLayout {
    /// Bytes of trailing metadata per frame. Zero when `size >= stride`.
    pub fn metadata_size(&self) -> u64 {
        self.stride.saturating_sub(self.size)
    }

    pub fn has_metadata(&self) -> bool {
        self.metadata_size() > 0
    }
}

/// Everything the frame decoder needs to know about region shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Geometry {
    pub rois: Vec<RegionOfInterest>,
    pub layout: DataLayout,
    /// (rows, columns) each region is decoded with, in region order
    pub region_dims: Vec<(usize, usize)>,
}

impl Geometry {
    pub fn nroi(&self) -> usize {
        self.rois.len()
    }

    /// Pixels per frame summed over all regions, `None` on overflow.
    pub fn pixels_per_frame(&self) -> Option<usize> {
        self.region_dims
            .iter()
            .try_fold(0usize, |total, (rows, cols)| total.checked_add(rows.checked_mul(*cols)?))
    }
}

/// Space-separated `wavelength,error` pairs from `WavelengthError`.
///
/// Some footers carry this instead of a plain `Wavelength` list. It is never
/// substituted for the wavelength calibration automatically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WavelengthErrorTable {
    pub pairs: Vec<(f64, f64)>,
}

impl WavelengthErrorTable {
    /// First column of the table.
    pub fn wavelengths(&self) -> Vec<f64> {
        self.pairs.iter().map(|(wavelength, _)| *wavelength).collect()
    }

    pub fn errors(&self) -> Vec<f64> {
        self.pairs.iter().map(|(_, error)| *error).collect()
    }
}
