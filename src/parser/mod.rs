//! SPE file parsing, one module per decode stage

mod header_parser;
pub mod footer_parser;
pub mod geometry_parser;
pub mod metadata_parser;
pub mod frame_parser;

// Re-export the parsing functions
pub use header_parser::parse_header;
pub use footer_parser::{parse_footer, read_footer};
pub use geometry_parser::{parse_wavelength, parse_wavelength_error, resolve_geometry};
pub use metadata_parser::parse_metadata_schema;
pub use frame_parser::{FrameStreamLayout, parse_frames};
