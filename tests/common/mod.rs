//! Builds synthetic SPE 3.0 byte images for the integration tests.

#![allow(dead_code)]

use std::fmt::Write;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, Copy)]
pub struct Roi {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub x_binning: u32,
    pub y_binning: u32,
}

impl Roi {
    pub fn new(x: u32, y: u32, width: u32, height: u32, x_binning: u32, y_binning: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            x_binning,
            y_binning,
        }
    }

    /// (rows, columns) from the binning progression.
    pub fn dims(&self) -> (usize, usize) {
        let rows = (self.y..self.y + self.height).step_by(self.y_binning as usize).count();
        let cols = (self.x..self.x + self.width).step_by(self.x_binning as usize).count();
        (rows, cols)
    }
}

/// One `MetaBlock` child: tag, optional (attribute, value) variant, type.
#[derive(Debug, Clone)]
pub struct MetaEntry {
    pub tag: &'static str,
    pub variant: Option<(&'static str, &'static str)>,
    pub declared: &'static str,
}

pub fn time_stamp(event: &'static str) -> MetaEntry {
    MetaEntry {
        tag: "TimeStamp",
        variant: Some(("event", event)),
        declared: "Int64",
    }
}

pub fn gate_tracking(component: &'static str) -> MetaEntry {
    MetaEntry {
        tag: "GateTracking",
        variant: Some(("component", component)),
        declared: "Double",
    }
}

pub fn plain(tag: &'static str, declared: &'static str) -> MetaEntry {
    MetaEntry {
        tag,
        variant: None,
        declared,
    }
}

#[derive(Debug, Clone)]
pub struct SpeFixture {
    pub version: f32,
    pub dtype_code: u16,
    pub frames: u16,
    pub rois: Vec<Roi>,
    /// (width, height) per nested region `DataBlock`; defaults to the ROI dims
    pub declared_blocks: Option<Vec<(usize, usize)>>,
    pub metadata: Vec<MetaEntry>,
    pub wavelength: Option<String>,
    pub wavelength_error: Option<String>,
    /// Extra bytes at the end of every frame
    pub padding: usize,
}

impl SpeFixture {
    pub fn new(frames: u16, rois: Vec<Roi>) -> Self {
        Self {
            version: 3.0,
            dtype_code: 3,
            frames,
            rois,
            declared_blocks: None,
            metadata: Vec::new(),
            wavelength: None,
            wavelength_error: None,
            padding: 0,
        }
    }

    pub fn element_size(&self) -> usize {
        match self.dtype_code {
            2 | 3 => 2,
            _ => 4,
        }
    }

    fn blocks(&self) -> Vec<(usize, usize)> {
        self.declared_blocks.clone().unwrap_or_else(|| {
            self.rois
                .iter()
                .map(|roi| {
                    let (rows, cols) = roi.dims();
                    (cols, rows)
                })
                .collect()
        })
    }

    /// (rows, columns) the data section is written with.
    pub fn region_dims(&self) -> Vec<(usize, usize)> {
        let blocks = self.blocks();
        if self.rois.len() == 1 && !blocks.is_empty() {
            vec![(blocks[0].1, blocks[0].0)]
        } else {
            self.rois.iter().map(Roi::dims).collect()
        }
    }

    pub fn pixel_bytes(&self) -> usize {
        self.region_dims()
            .iter()
            .map(|(rows, cols)| rows * cols * self.element_size())
            .sum()
    }

    pub fn stride(&self) -> usize {
        self.pixel_bytes() + self.metadata.len() * 8 + self.padding
    }

    /// Pixel value written at `index` (row-major) of `region` in `frame`.
    pub fn pixel(frame: usize, region: usize, index: usize) -> i64 {
        ((frame * 7919 + region * 503 + index * 31) % 30_000) as i64
    }

    pub fn int_meta(frame: usize, field: usize) -> i64 {
        (frame * 1_000_000 + field) as i64
    }

    pub fn float_meta(frame: usize, field: usize) -> f64 {
        frame as f64 + field as f64 / 4.0
    }

    pub fn footer_xml(&self) -> String {
        let mut xml = String::new();
        let _ = write!(
            xml,
            r#"<?xml version="1.0" encoding="utf-8"?><SpeFormat version="3.0" xmlns="http://www.princetoninstruments.com/spe/2009"><DataFormat><DataBlock type="Frame" count="{}" size="{}" stride="{}">"#,
            self.frames,
            self.pixel_bytes(),
            self.stride()
        );
        for (width, height) in self.blocks() {
            let _ = write!(
                xml,
                r#"<DataBlock type="Region" count="1" width="{width}" height="{height}" size="{}" stride="{}"/>"#,
                width * height * self.element_size(),
                width * height * self.element_size()
            );
        }
        xml.push_str("</DataBlock></DataFormat>");

        if !self.metadata.is_empty() {
            xml.push_str(r#"<MetaFormat><MetaBlock type="Frame">"#);
            for entry in &self.metadata {
                let variant = entry
                    .variant
                    .map(|(attr, value)| format!(r#" {attr}="{value}""#))
                    .unwrap_or_default();
                let _ = write!(
                    xml,
                    r#"<{}{variant} type="{}" bitDepth="64"/>"#,
                    entry.tag, entry.declared
                );
            }
            xml.push_str("</MetaBlock></MetaFormat>");
        }

        xml.push_str("<Calibrations><WavelengthMapping>");
        if let Some(wavelength) = &self.wavelength {
            let _ = write!(xml, "<Wavelength>{wavelength}</Wavelength>");
        }
        if let Some(table) = &self.wavelength_error {
            let _ = write!(xml, "<WavelengthError>{table}</WavelengthError>");
        }
        xml.push_str("</WavelengthMapping></Calibrations>");

        xml.push_str("<DataHistories><DataHistory><Origin><Experiment><Devices><Cameras><Camera><ReadoutControl><RegionsOfInterest><CustomRegions>");
        for roi in &self.rois {
            let _ = write!(
                xml,
                r#"<RegionOfInterest x="{}" y="{}" width="{}" height="{}" xBinning="{}" yBinning="{}"/>"#,
                roi.x, roi.y, roi.width, roi.height, roi.x_binning, roi.y_binning
            );
        }
        xml.push_str("</CustomRegions></RegionsOfInterest></ReadoutControl></Camera></Cameras></Devices></Experiment></Origin></DataHistory></DataHistories></SpeFormat>");
        xml
    }

    fn push_pixel(&self, out: &mut Vec<u8>, value: i64) {
        match self.dtype_code {
            0 => out.extend_from_slice(&(value as f32).to_le_bytes()),
            1 => out.extend_from_slice(&(value as i32 - 15_000).to_le_bytes()),
            2 => out.extend_from_slice(&(value as i16 - 15_000).to_le_bytes()),
            3 => out.extend_from_slice(&(value as u16).to_le_bytes()),
            _ => out.extend_from_slice(&(value as u32).to_le_bytes()),
        }
    }

    pub fn data_section(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.frames as usize * self.stride());
        for frame in 0..self.frames as usize {
            for (region, (rows, cols)) in self.region_dims().into_iter().enumerate() {
                for index in 0..rows * cols {
                    self.push_pixel(&mut data, Self::pixel(frame, region, index));
                }
            }
            for (field, entry) in self.metadata.iter().enumerate() {
                if entry.declared == "Int64" {
                    data.extend_from_slice(&Self::int_meta(frame, field).to_le_bytes());
                } else {
                    data.extend_from_slice(&Self::float_meta(frame, field).to_le_bytes());
                }
            }
            data.extend(std::iter::repeat_n(0xAAu8, self.padding));
        }
        data
    }

    pub fn build(&self) -> Vec<u8> {
        let data = self.data_section();
        let footer_offset = (4100 + data.len()) as u64;

        let mut bytes = vec![0u8; 4100];
        bytes[108..110].copy_from_slice(&self.dtype_code.to_le_bytes());
        bytes[678..686].copy_from_slice(&footer_offset.to_le_bytes());
        bytes[1446..1448].copy_from_slice(&self.frames.to_le_bytes());
        for (i, version) in [self.version, 0.0, 0.0].iter().enumerate() {
            bytes[1992 + i * 4..1996 + i * 4].copy_from_slice(&version.to_le_bytes());
        }
        bytes.extend_from_slice(&data);
        bytes.extend_from_slice(self.footer_xml().as_bytes());
        bytes
    }
}
