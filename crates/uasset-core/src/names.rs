use serde::Serialize;

use crate::error::{DecodeError, DecodeResult};
use crate::header::PackageHeader;
use crate::reader::Reader;

/// One interned-string entry. Position in the table is the name index
/// that other package sections refer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameEntry {
    pub name: String,
    pub non_case_preserving_hash: u16,
    pub case_preserving_hash: u16,
}

/// Read exactly `header.names.count` entries starting at
/// `header.names.offset`.
pub fn read_names(r: &mut Reader<'_>, header: &PackageHeader) -> DecodeResult<Vec<NameEntry>> {
    let count = header.names.count;
    if count < 0 {
        return Err(DecodeError::format(
            r.current_index(),
            format!("negative name count {count}"),
        ));
    }
    if count == 0 {
        return Ok(Vec::new());
    }
    if header.names.offset < 0 {
        return Err(DecodeError::format(
            r.current_index(),
            format!("negative name table offset {}", header.names.offset),
        ));
    }

    r.seek(header.names.offset as usize);
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name = r.read_fstring()?;
        let non_case_preserving_hash = r.read_u16()?;
        let case_preserving_hash = r.read_u16()?;
        out.push(NameEntry {
            name,
            non_case_preserving_hash,
            case_preserving_hash,
        });
    }
    Ok(out)
}
