//! Type definitions for the SPE 3.0 file format

pub mod footer;
pub mod header;
pub mod metadata;
pub mod pixel_data;
pub mod roi;

// Re-export the main types for convenience
pub use footer::{Children, Element};
pub use header::Header;
pub use metadata::{MetaFamily, MetaField, MetaType, MetaValue};
pub use pixel_data::{Frame, PixelType, RegionData};
pub use roi::{DataLayout, Geometry, RegionBlock, RegionOfInterest, WavelengthErrorTable};
