//! Region, layout and calibration resolution from the footer tree

use crate::error::{FormatError, Result};
use crate::types::footer::{Children, Element};
use crate::types::roi::{DataLayout, Geometry, RegionBlock, RegionOfInterest, WavelengthErrorTable};
use tracing::{debug, warn};

pub const ROI_PATH: &[&str] = &[
    "SpeFormat",
    "DataHistories",
    "DataHistory",
    "Origin",
    "Experiment",
    "Devices",
    "Cameras",
    "Camera",
    "ReadoutControl",
    "RegionsOfInterest",
    "CustomRegions",
    "RegionOfInterest",
];
pub const FRAME_BLOCK_PATH: &[&str] = &["SpeFormat", "DataFormat", "DataBlock"];
pub const WAVELENGTH_PATH: &[&str] = &["SpeFormat", "Calibrations", "WavelengthMapping", "Wavelength"];
pub const WAVELENGTH_ERROR_PATH: &[&str] = &[
    "SpeFormat",
    "Calibrations",
    "WavelengthMapping",
    "WavelengthError",
];

/// Custom regions from the camera readout settings, in region-index order.
pub fn parse_rois(footer: &Element) -> Result<Vec<RegionOfInterest>> {
    let path = ROI_PATH.join("/");
    let nodes = match footer.select(ROI_PATH)? {
        Children::None => return Err(FormatError::missing(path)),
        found => found.to_vec(),
    };

    nodes
        .into_iter()
        .enumerate()
        .map(|(index, node)| -> Result<RegionOfInterest> {
            let at = format!("{path}[{index}]");
            let roi = RegionOfInterest::builder()
                .x(node.parse_attr("x", &at)?)
                .y(node.parse_attr("y", &at)?)
                .width(node.parse_attr("width", &at)?)
                .height(node.parse_attr("height", &at)?)
                .x_binning(positive(node, "xBinning", &at)?)
                .y_binning(positive(node, "yBinning", &at)?)
                .build();
            Ok(roi)
        })
        .collect()
}

fn positive(node: &Element, attribute: &str, at: &str) -> Result<u32> {
    let value: u32 = node.parse_attr(attribute, at)?;
    if value == 0 {
        return Err(FormatError::malformed(at, attribute, "0"));
    }
    Ok(value)
}

/// Frame stride and size from the outer `DataBlock`, plus the declared
/// width/height of each nested region block.
pub fn parse_layout(footer: &Element) -> Result<DataLayout> {
    let path = FRAME_BLOCK_PATH.join("/");
    let frame_block = footer.select_one(FRAME_BLOCK_PATH)?;
    let stride: u64 = frame_block.parse_attr("stride", &path)?;
    let size: u64 = frame_block.parse_attr("size", &path)?;
    if size > stride {
        return Err(FormatError::InconsistentLayout {
            consumed: size,
            stride,
        });
    }

    let region_path = format!("{path}/DataBlock");
    let region_blocks = frame_block
        .children_named("DataBlock")
        .enumerate()
        .map(|(index, block)| -> Result<RegionBlock> {
            let at = format!("{region_path}[{index}]");
            Ok(RegionBlock {
                width: block.parse_attr("width", &at)?,
                height: block.parse_attr("height", &at)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DataLayout {
        stride,
        size,
        region_blocks,
    })
}

/// Wavelength of every pixel column, if the footer carries a calibration.
///
/// An absent path or empty text is `Ok(None)`; text that does not parse as
/// a comma-separated list of numbers is an error.
pub fn parse_wavelength(footer: &Element) -> Result<Option<Vec<f64>>> {
    let Some(node) = footer.select_optional(WAVELENGTH_PATH)? else {
        return Ok(None);
    };
    let text = node.text().unwrap_or_default();
    let path = WAVELENGTH_PATH.join("/");
    let values = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| FormatError::malformed(&path, "text", token))
        })
        .collect::<Result<Vec<_>>>()?;
    if values.is_empty() {
        return Ok(None);
    }
    Ok(Some(values))
}

/// `wavelength,error` pairs from `WavelengthError`, if present.
pub fn parse_wavelength_error(footer: &Element) -> Result<Option<WavelengthErrorTable>> {
    let Some(node) = footer.select_optional(WAVELENGTH_ERROR_PATH)? else {
        return Ok(None);
    };
    let path = WAVELENGTH_ERROR_PATH.join("/");
    let pairs = node
        .text()
        .unwrap_or_default()
        .split_whitespace()
        .map(|pair| -> Result<(f64, f64)> {
            let malformed = || FormatError::malformed(&path, "text", pair);
            let (wavelength, error) = pair.split_once(',').ok_or_else(malformed)?;
            let wavelength = wavelength.trim().parse::<f64>().map_err(|_| malformed())?;
            let error = error.trim().parse::<f64>().map_err(|_| malformed())?;
            Ok((wavelength, error))
        })
        .collect::<Result<Vec<_>>>()?;
    if pairs.is_empty() {
        return Ok(None);
    }
    Ok(Some(WavelengthErrorTable { pairs }))
}

/// Resolve regions, layout and the (rows, columns) each region is decoded
/// with.
///
/// A single-region file uses the declared region block dimensions when the
/// footer has them: step-and-glue spectra describe the camera window in the
/// ROI settings, not the stitched data. With several regions the binning
/// progression of each ROI is authoritative.
pub fn resolve_geometry(footer: &Element) -> Result<Geometry> {
    let rois = parse_rois(footer)?;
    let layout = parse_layout(footer)?;

    let binned = rois.iter().map(RegionOfInterest::binned_dims).collect::<Vec<_>>();
    let region_dims = match (rois.len(), layout.region_blocks.first()) {
        (1, Some(block)) => {
            let declared = (block.height, block.width);
            if declared != binned[0] {
                warn!(
                    ?declared,
                    binned = ?binned[0],
                    "single region: declared block disagrees with binning progression, using declared"
                );
            }
            vec![declared]
        }
        _ => {
            if layout.region_blocks.len() == rois.len() {
                for (index, (block, dims)) in layout.region_blocks.iter().zip(&binned).enumerate() {
                    if (block.height, block.width) != *dims {
                        warn!(
                            region = index,
                            declared = ?(block.height, block.width),
                            binned = ?dims,
                            "declared region block disagrees with binning progression"
                        );
                    }
                }
            }
            binned
        }
    };

    debug!(nroi = rois.len(), ?region_dims, stride = layout.stride, size = layout.size, "resolved geometry");
    Ok(Geometry {
        rois,
        layout,
        region_dims,
    })
}
