use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::error::{DecodeError, DecodeResult};
use crate::header::PackageHeader;
use crate::package::DecodeOpts;
use crate::reader::Reader;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThumbnailFormat {
    Jpeg,
    Png,
}

impl ThumbnailFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

impl fmt::Display for ThumbnailFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
        })
    }
}

/// One embedded preview image: its directory row plus the decoded
/// payload header and bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub asset_class_name: String,
    pub object_path: String,
    pub file_offset: i32,
    pub width: i32,
    /// Stored height is the magnitude of the raw value; the raw sign
    /// selects `format`.
    pub height: u32,
    pub format: ThumbnailFormat,
    pub size: i32,
    /// Absent when `size` is 0.
    pub bytes: Option<Vec<u8>>,
}

struct DirectoryRow {
    asset_class_name: String,
    object_path: String,
    file_offset: i32,
}

/// Read the thumbnail directory at `header.thumbnail_table_offset`, then
/// follow each row's offset to its payload. An offset of 0 (or negative)
/// means the package carries no thumbnail table.
pub fn read_thumbnails(
    r: &mut Reader<'_>,
    header: &PackageHeader,
    opts: &DecodeOpts,
) -> DecodeResult<Vec<Thumbnail>> {
    if header.thumbnail_table_offset <= 0 {
        return Ok(Vec::new());
    }

    r.seek(header.thumbnail_table_offset as usize);
    let count = r.read_i32()?;
    if count < 0 {
        return Err(DecodeError::format(
            r.current_index() - 4,
            format!("negative thumbnail count {count}"),
        ));
    }
    let mut rows = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let asset_class_name = r.read_fstring()?;
        let object_path = r.read_fstring()?;
        let file_offset = r.read_i32()?;
        rows.push(DirectoryRow {
            asset_class_name,
            object_path,
            file_offset,
        });
    }

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        match read_payload(r, &row) {
            Ok(t) => out.push(t),
            Err(e) if opts.lenient_thumbnails => {
                warn!(object_path = %row.object_path, "skipping thumbnail row: {e}");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}

fn read_payload(r: &mut Reader<'_>, row: &DirectoryRow) -> DecodeResult<Thumbnail> {
    if row.file_offset < 0 {
        return Err(DecodeError::format(
            r.current_index(),
            format!("negative thumbnail payload offset {}", row.file_offset),
        ));
    }
    r.seek(row.file_offset as usize);
    let width = r.read_i32()?;
    let raw_height = r.read_i32()?;
    let format = if raw_height < 0 {
        ThumbnailFormat::Jpeg
    } else {
        ThumbnailFormat::Png
    };
    let height = raw_height.unsigned_abs();
    let size = r.read_i32()?;
    if size < 0 {
        return Err(DecodeError::format(
            r.current_index() - 4,
            format!("negative thumbnail payload size {size}"),
        ));
    }
    let bytes = if size > 0 {
        Some(r.read_bytes(size as usize)?)
    } else {
        None
    };
    Ok(Thumbnail {
        asset_class_name: row.asset_class_name.clone(),
        object_path: row.object_path.clone(),
        file_offset: row.file_offset,
        width,
        height,
        format,
        size,
        bytes,
    })
}
