use crate::error::{FormatError, Result};
use crate::parser::{
    FrameStreamLayout, parse_frames, parse_header, parse_metadata_schema, parse_wavelength,
    parse_wavelength_error, read_footer, resolve_geometry,
};
use crate::types::{
    Element, Frame, Geometry, Header, MetaField, MetaValue, PixelType, RegionData,
    RegionOfInterest, WavelengthErrorTable,
};
use crate::utils::file_utils::read_binary_file_mmap;
use crate::utils::misc::DATA_START_OFFSET;
use bon::Builder;
use itertools::Itertools;
use ndarray::Array2;
use serde::Serialize;
use std::fmt::Write;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Knobs for a decode pass.
#[derive(Debug, Clone, Builder)]
pub struct DecodeOptions {
    /// Keep the parsed XML footer on the result for inspection
    #[builder(default = true)]
    pub retain_footer: bool,
    /// Fail when a frame's regions and metadata do not fill the stride exactly
    #[builder(default)]
    pub strict_layout: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A fully decoded SPE 3.0 file.
///
/// Either every frame decoded or the file was rejected; there is no partial
/// state. The file handle is closed by the time a value exists.
#[derive(Debug, Clone)]
pub struct SpeFile {
    pub filepath: Option<PathBuf>,
    pub header: Header,
    pub pixel_type: PixelType,
    pub footer: Option<Element>,
    pub geometry: Geometry,
    pub wavelength: Option<Vec<f64>>,
    pub wavelength_error: Option<WavelengthErrorTable>,
    pub metadata_schema: Option<Vec<MetaField>>,
    pub frames: Vec<Frame>,
}

/// Serializable description of a decoded file, without pixel data.
#[derive(Debug, Serialize)]
pub struct SpeSummary<'a> {
    pub filepath: Option<&'a Path>,
    pub header: &'a Header,
    pub pixel_type: PixelType,
    pub nframes: usize,
    pub rois: &'a [RegionOfInterest],
    pub region_dims: &'a [(usize, usize)],
    pub stride: u64,
    pub size: u64,
    pub wavelength_points: Option<usize>,
    pub has_wavelength_error: bool,
    pub metadata: Option<&'a [MetaField]>,
}

impl SpeFile {
    /// Open and decode the file at `path` with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, DecodeOptions::default())
    }

    pub fn open_with(path: impl AsRef<Path>, options: DecodeOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut spe = Self::from_reader(BufReader::new(file), options)?;
        spe.filepath = Some(path.to_path_buf());
        Ok(spe)
    }

    /// Decode through a read-only memory map instead of buffered reads.
    pub fn open_mmap(path: impl AsRef<Path>, options: DecodeOptions) -> Result<Self> {
        let path = path.as_ref();
        let mmap_data = read_binary_file_mmap(path)?;
        let mut spe = Self::from_reader(Cursor::new(&mmap_data[..]), options)?;
        drop(mmap_data);
        spe.filepath = Some(path.to_path_buf());
        Ok(spe)
    }

    /// Decode from any seekable source. The reader is consumed and dropped
    /// before returning, on success and on every error path.
    pub fn from_reader<R: Read + Seek>(mut reader: R, options: DecodeOptions) -> Result<Self> {
        let header = parse_header(&mut reader)?;
        debug!(
            version = header.version,
            frames = header.frame_count,
            dtype = header.dtype_code,
            footer_offset = header.footer_offset,
            "parsed SPE header"
        );
        let pixel_type = header.pixel_type()?;

        let footer = read_footer(&mut reader, header.footer_offset)?;
        let geometry = resolve_geometry(&footer)?;
        let wavelength = parse_wavelength(&footer)?;
        let wavelength_error = parse_wavelength_error(&footer)?;
        let metadata_schema = if geometry.layout.has_metadata() {
            Some(parse_metadata_schema(&footer)?)
        } else {
            None
        };

        reader.seek(SeekFrom::Start(DATA_START_OFFSET))?;
        let layout = FrameStreamLayout {
            pixel_type,
            region_dims: &geometry.region_dims,
            frame_count: header.frame_count as usize,
            stride: geometry.layout.stride,
            schema: metadata_schema.as_deref(),
            strict: options.strict_layout,
        };
        let frames = parse_frames(&mut reader, DATA_START_OFFSET, &layout)?;
        drop(reader);

        info!(
            frames = frames.len(),
            regions = geometry.nroi(),
            "decoded SPE file"
        );
        Ok(Self {
            filepath: None,
            header,
            pixel_type,
            footer: options.retain_footer.then_some(footer),
            geometry,
            wavelength,
            wavelength_error,
            metadata_schema,
            frames,
        })
    }

    pub fn nframes(&self) -> usize {
        self.frames.len()
    }

    pub fn nroi(&self) -> usize {
        self.geometry.nroi()
    }

    pub fn rois(&self) -> &[RegionOfInterest] {
        &self.geometry.rois
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Pixels of region `roi` in frame `frame`.
    pub fn region(&self, frame: usize, roi: usize) -> Option<&RegionData> {
        self.frames.get(frame)?.regions.get(roi)
    }

    /// Binned sensor x coordinate of each column, per region.
    pub fn xcoords(&self) -> Vec<Vec<u32>> {
        self.geometry.rois.iter().map(RegionOfInterest::xcoords).collect()
    }

    /// Binned sensor y coordinate of each row, per region.
    pub fn ycoords(&self) -> Vec<Vec<u32>> {
        self.geometry.rois.iter().map(RegionOfInterest::ycoords).collect()
    }

    pub fn wavelength(&self) -> Option<&[f64]> {
        self.wavelength.as_deref()
    }

    pub fn wavelength_error(&self) -> Option<&WavelengthErrorTable> {
        self.wavelength_error.as_ref()
    }

    pub fn footer(&self) -> Option<&Element> {
        self.footer.as_ref()
    }

    /// Names of the per-frame metadata fields, in record order.
    pub fn metadata_names(&self) -> Option<Vec<&str>> {
        self.metadata_schema
            .as_ref()
            .map(|schema| schema.iter().map(|field| field.name.as_str()).collect())
    }

    /// Metadata as an (nframes, nfields) matrix widened to f64.
    pub fn metadata_matrix(&self) -> Option<Array2<f64>> {
        let schema = self.metadata_schema.as_ref()?;
        let mut matrix = Array2::zeros((self.frames.len(), schema.len()));
        for (row, frame) in self.frames.iter().enumerate() {
            for (col, value) in frame.metadata.iter().flatten().enumerate() {
                matrix[[row, col]] = value.as_f64();
            }
        }
        Some(matrix)
    }

    /// One metadata field across all frames.
    pub fn metadata_column(&self, name: &str) -> Result<Vec<MetaValue>> {
        let schema = self
            .metadata_schema
            .as_ref()
            .ok_or_else(|| FormatError::missing("SpeFormat/MetaFormat/MetaBlock"))?;
        let index = schema
            .iter()
            .position(|field| field.name == name)
            .ok_or_else(|| FormatError::missing(format!("SpeFormat/MetaFormat/MetaBlock/{name}")))?;
        Ok(self
            .frames
            .iter()
            .filter_map(|frame| frame.metadata.as_ref().and_then(|m| m.get(index)).copied())
            .collect())
    }

    pub fn to_summary(&self) -> SpeSummary<'_> {
        SpeSummary {
            filepath: self.filepath.as_deref(),
            header: &self.header,
            pixel_type: self.pixel_type,
            nframes: self.frames.len(),
            rois: &self.geometry.rois,
            region_dims: &self.geometry.region_dims,
            stride: self.geometry.layout.stride,
            size: self.geometry.layout.size,
            wavelength_points: self.wavelength.as_ref().map(Vec::len),
            has_wavelength_error: self.wavelength_error.is_some(),
            metadata: self.metadata_schema.as_deref(),
        }
    }

    pub fn summary_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.to_summary())
    }

    /// Get a summary of the file contents
    pub fn summary(&self) -> String {
        let mut result = String::new();

        let _ = writeln!(result, "Header:");
        if let Some(path) = &self.filepath {
            let _ = writeln!(result, "  File: {}", path.display());
        }
        let _ = writeln!(result, "  Version: {:.1}", self.header.version);
        let _ = writeln!(result, "  Frames: {}", self.header.frame_count);
        let _ = writeln!(result, "  Pixel type: {:?}", self.pixel_type);

        let _ = writeln!(result, "\nRegions:");
        for (index, (roi, (rows, cols))) in self
            .geometry
            .rois
            .iter()
            .zip(&self.geometry.region_dims)
            .enumerate()
        {
            let _ = writeln!(
                result,
                "  {index}: origin ({}, {}), extent {}x{}, binning {}x{}, decoded {rows}x{cols}",
                roi.x, roi.y, roi.width, roi.height, roi.x_binning, roi.y_binning
            );
        }

        if let Some(wavelength) = &self.wavelength {
            if let (Some(first), Some(last)) = (wavelength.first(), wavelength.last()) {
                let _ = writeln!(
                    result,
                    "\nWavelength calibration: {} points, {first} to {last}",
                    wavelength.len()
                );
            }
        }

        if let Some(names) = self.metadata_names() {
            let _ = writeln!(result, "\nMetadata: {}", names.iter().join(", "));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = DecodeOptions::default();
        assert!(options.retain_footer);
        assert!(!options.strict_layout);

        let options = DecodeOptions::builder().retain_footer(false).strict_layout(true).build();
        assert!(!options.retain_footer);
        assert!(options.strict_layout);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SpeFile::open("/nonexistent/definitely/missing.spe").unwrap_err();
        assert!(matches!(err, FormatError::Io(_)));
    }

    #[test]
    fn test_legacy_file_rejected() {
        let mut bytes = vec![0u8; 4100];
        bytes[1992..1996].copy_from_slice(&2.0f32.to_le_bytes());
        let err = SpeFile::from_reader(Cursor::new(bytes), DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, FormatError::UnsupportedVersion { .. }));
    }
}
