//! uasset-core: reader for Unreal Engine `.uasset` package files
//!
//! Decodes the version-gated package summary, the name table and the
//! thumbnail table from an in-memory byte buffer. Everything else in the
//! package (imports, exports, dependency and registry sections) stays
//! addressable through offsets retained in the header but is never parsed.
//! Also included:
//! - JSON projection of a decode result for CLI/tooling use
//! - candidate-file discovery for batch scans
//! - synthetic package builder used by the test suite
//!
pub mod error;
pub mod header;
pub mod json;
pub mod names;
pub mod package;
pub mod reader;
pub mod scan;
pub mod synth;
pub mod thumbnails;

pub use error::{DecodeError, DecodeResult, UnsupportedFeature};
pub use header::{EngineVersion, EngineVersionInfo, PackageHeader, SectionRef};
pub use names::NameEntry;
pub use package::{DecodeOpts, DecodedPackage, decode_bytes, decode_file};
pub use thumbnails::{Thumbnail, ThumbnailFormat};
