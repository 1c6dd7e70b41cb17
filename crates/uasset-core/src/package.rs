use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::DecodeResult;
use crate::header::{PackageHeader, read_header};
use crate::names::{NameEntry, read_names};
use crate::reader::Reader;
use crate::thumbnails::{Thumbnail, read_thumbnails};

/// Per-decode behavior switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOpts {
    /// Skip thumbnail rows that fail to decode instead of failing the
    /// whole decode. Skipped rows are logged at warn level.
    pub lenient_thumbnails: bool,
}

/// Result of one decode: the package summary plus the two decoded
/// tables. Produced once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPackage {
    pub header: PackageHeader,
    pub names: Vec<NameEntry>,
    pub thumbnails: Vec<Thumbnail>,
}

impl DecodedPackage {
    /// Interned string for a name-table index.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(|n| n.name.as_str())
    }

    /// Asset class recorded by the first thumbnail, when any.
    pub fn asset_class(&self) -> Option<&str> {
        self.thumbnails.first().map(|t| t.asset_class_name.as_str())
    }
}

/// Decode one package from an in-memory buffer: header first, then the
/// name and thumbnail tables at their header-supplied offsets.
pub fn decode_bytes(data: &[u8], opts: &DecodeOpts) -> DecodeResult<DecodedPackage> {
    let mut r = Reader::new(data);
    let header = read_header(&mut r)?;
    debug!(
        ue4_version = header.ue4_version,
        ue5_version = header.ue5_version,
        big_endian = r.is_big_endian(),
        "package summary decoded"
    );
    let names = read_names(&mut r, &header)?;
    let thumbnails = read_thumbnails(&mut r, &header, opts)?;
    Ok(DecodedPackage {
        header,
        names,
        thumbnails,
    })
}

/// Read a package file into memory and decode it. The file handle is
/// released before decoding starts, on success and failure alike.
pub fn decode_file(path: &Path, opts: &DecodeOpts) -> DecodeResult<DecodedPackage> {
    let data = fs::read(path)?;
    decode_bytes(&data, opts)
}
