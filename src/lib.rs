//! # spe-reader
//!
//! Decoder for Princeton Instruments LightField SPE 3.0 files.
//!
//! An SPE 3.0 file is a 4100-byte binary header, a data section holding one
//! pixel block per region of interest for every frame (optionally followed
//! by a per-frame metadata record), and a trailing XML footer. The footer is
//! the authority on region geometry, frame stride and the metadata layout;
//! the header supplies the frame count, pixel type and where the footer
//! starts.
//!
//! ```ignore
//! use spe_reader::SpeFile;
//!
//! let spe = SpeFile::open("ten_frames_two_rois.spe")?;
//! for frame in &spe.frames {
//!     for region in &frame.regions {
//!         println!("{:?}", region.shape());
//!     }
//! }
//! ```

pub mod error;
pub mod parser;
pub mod spe_file;
pub mod types;
pub mod utils;

pub use error::{FormatError, Result};
pub use spe_file::{DecodeOptions, SpeFile, SpeSummary};
pub use types::{
    Children, DataLayout, Element, Frame, Geometry, Header, MetaFamily, MetaField, MetaType,
    MetaValue, PixelType, RegionData, RegionOfInterest, WavelengthErrorTable,
};
