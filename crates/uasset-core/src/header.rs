use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{DecodeError, DecodeResult, UnsupportedFeature};
use crate::reader::Reader;

pub const PACKAGE_FILE_TAG: u32 = 0x9E2A_83C1;
pub const PACKAGE_FILE_TAG_SWAPPED: u32 = 0xC183_2A9E;

// Engine serialization version thresholds, in the engine's own naming.
pub const VER_UE4_OLDEST_LOADABLE_PACKAGE: i32 = 214;
pub const VER_UE4_WORLD_LEVEL_INFO: i32 = 224;
pub const VER_UE4_ADDED_CHUNKID_TO_ASSETDATA_AND_UPACKAGE: i32 = 278;
pub const VER_UE4_CHANGED_CHUNKID_TO_BE_AN_ARRAY_OF_CHUNKIDS: i32 = 326;
pub const VER_UE4_ENGINE_VERSION_OBJECT: i32 = 336;
pub const VER_UE4_ADD_STRING_ASSET_REFERENCES_MAP: i32 = 384;
pub const VER_UE4_PACKAGE_SUMMARY_HAS_COMPATIBLE_ENGINE_VERSION: i32 = 444;
pub const VER_UE4_SERIALIZE_TEXT_IN_PACKAGES: i32 = 459;
pub const VER_UE4_PRELOAD_DEPENDENCIES_IN_COOKED_EXPORTS: i32 = 507;
pub const VER_UE4_ADDED_SEARCHABLE_NAMES: i32 = 510;
pub const VER_UE4_ADDED_PACKAGE_SUMMARY_LOCALIZATION_ID: i32 = 516;
pub const VER_UE4_ADDED_PACKAGE_OWNER: i32 = 518;
pub const VER_UE4_NON_OUTER_PACKAGE_IMPORT: i32 = 520;
pub const VER_UE5_NAMES_REFERENCED_FROM_EXPORT_DATA: i32 = 1001;
pub const VER_UE5_PAYLOAD_TOC: i32 = 1002;
pub const VER_UE5_OPTIONAL_RESOURCES: i32 = 1003;
pub const VER_UE5_ADD_SOFTOBJECTPATH_LIST: i32 = 1008;
pub const VER_UE5_DATA_RESOURCES: i32 = 1009;

/// Count/offset pair addressing a package section. Sections this reader
/// does not decode keep their `SectionRef` so a future decoder can seek
/// straight to them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SectionRef {
    pub count: i32,
    pub offset: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomVersion {
    /// Slotted-GUID key, uppercase hex.
    pub key: String,
    pub version: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Generation {
    pub export_count: i32,
    pub name_count: i32,
}

/// Structured engine version, rendered
/// `"{major}.{minor}.{patch}-{changelist}+{branch}"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
    pub changelist: u32,
    pub branch: String,
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}-{}+{}",
            self.major, self.minor, self.patch, self.changelist, self.branch
        )
    }
}

/// Either the structured engine version or, on streams predating it, the
/// bare changelist number that stood in for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineVersionInfo {
    Version(EngineVersion),
    Changelist(i32),
}

impl Default for EngineVersionInfo {
    fn default() -> Self {
        Self::Changelist(0)
    }
}

impl fmt::Display for EngineVersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Version(v) => v.fmt(f),
            Self::Changelist(c) => write!(f, "{c}"),
        }
    }
}

impl Serialize for EngineVersionInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Version(v) => serializer.collect_str(v),
            Self::Changelist(c) => serializer.serialize_i32(*c),
        }
    }
}

/// The decoded package summary. Field presence mirrors the stream: gated
/// fields that the stream's versions exclude stay `None` (or keep their
/// documented defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PackageHeader {
    pub file_tag: u32,
    /// True when the byte-swapped tag was seen and the rest of the stream
    /// decoded big-endian.
    pub byte_swapped: bool,
    pub legacy_file_version: i32,
    pub legacy_ue3_version: i32,
    pub ue4_version: i32,
    /// 0 when the stream predates the field.
    pub ue5_version: i32,
    pub licensee_ue4_version: i32,
    pub custom_versions: Vec<CustomVersion>,
    pub total_header_size: i32,
    pub folder_name: String,
    pub package_flags: u32,
    pub names: SectionRef,
    pub soft_object_paths: Option<SectionRef>,
    pub localization_id: Option<String>,
    pub gatherable_text_data: Option<SectionRef>,
    pub exports: SectionRef,
    pub imports: SectionRef,
    pub depends_offset: i32,
    pub soft_package_references: Option<SectionRef>,
    pub searchable_names_offset: Option<i32>,
    pub thumbnail_table_offset: i32,
    pub guid: String,
    pub persistent_guid: Option<String>,
    pub owner_persistent_guid: Option<String>,
    pub generations: Vec<Generation>,
    pub saved_by_engine_version: EngineVersionInfo,
    pub compatible_with_engine_version: EngineVersionInfo,
    pub compression_flags: u32,
    pub package_source: u32,
    pub num_texture_allocations: Option<i32>,
    pub asset_registry_data_offset: i32,
    pub bulk_data_start_offset: i64,
    pub world_tile_info_offset: Option<i32>,
    /// Single legacy chunk id; the array form that replaced it must be
    /// empty for the package to be supported at all.
    pub chunk_id: Option<i32>,
    /// `{count: -1, offset: 0}` when the stream predates the field.
    pub preload_dependencies: SectionRef,
    pub names_referenced_from_export_data_count: Option<i32>,
    /// -1 when the stream predates the field.
    pub payload_toc_offset: i64,
    pub data_resource_offset: Option<i32>,
}

fn read_section(r: &mut Reader<'_>) -> DecodeResult<SectionRef> {
    let count = r.read_i32()?;
    let offset = r.read_i32()?;
    Ok(SectionRef { count, offset })
}

fn read_engine_version(r: &mut Reader<'_>) -> DecodeResult<EngineVersion> {
    let major = r.read_u16()?;
    let minor = r.read_u16()?;
    let patch = r.read_u16()?;
    let changelist = r.read_u32()?;
    let branch = r.read_fstring()?;
    Ok(EngineVersion {
        major,
        minor,
        patch,
        changelist,
        branch,
    })
}

/// Decode the package summary in one strict top-to-bottom pass.
///
/// The field order is load-bearing: every gate below compares against
/// values decoded earlier in the same pass, so steps cannot be reordered.
pub fn read_header(r: &mut Reader<'_>) -> DecodeResult<PackageHeader> {
    let mut h = PackageHeader::default();

    h.file_tag = r.read_u32()?;
    if h.file_tag == PACKAGE_FILE_TAG_SWAPPED {
        h.byte_swapped = true;
        r.set_big_endian(true);
    } else if h.file_tag != PACKAGE_FILE_TAG {
        return Err(DecodeError::format(
            0,
            format!("bad package file tag {:#010x}", h.file_tag),
        ));
    }

    h.legacy_file_version = r.read_i32()?;
    if !matches!(h.legacy_file_version, -8..=-6) {
        return Err(DecodeError::format(
            r.current_index() - 4,
            format!("unsupported legacy file version {}", h.legacy_file_version),
        ));
    }

    h.legacy_ue3_version = r.read_i32()?;
    h.ue4_version = r.read_i32()?;
    if h.legacy_file_version <= -8 {
        h.ue5_version = r.read_i32()?;
    }
    h.licensee_ue4_version = r.read_i32()?;
    if h.ue4_version == 0 && h.ue5_version == 0 && h.licensee_ue4_version == 0 {
        return Err(DecodeError::format(
            r.current_index(),
            "asset is unversioned",
        ));
    }

    let custom_version_count = r.read_i32()?;
    if custom_version_count < 0 {
        return Err(DecodeError::format(
            r.current_index() - 4,
            format!("negative custom version count {custom_version_count}"),
        ));
    }
    for _ in 0..custom_version_count {
        let key = r.read_guid_slotted()?;
        let version = r.read_i32()?;
        h.custom_versions.push(CustomVersion { key, version });
    }

    h.total_header_size = r.read_i32()?;
    h.folder_name = r.read_fstring()?;
    h.package_flags = r.read_u32()?;
    h.names = read_section(r)?;

    if h.ue5_version >= VER_UE5_ADD_SOFTOBJECTPATH_LIST {
        h.soft_object_paths = Some(read_section(r)?);
    }
    if h.ue4_version >= VER_UE4_ADDED_PACKAGE_SUMMARY_LOCALIZATION_ID {
        h.localization_id = Some(r.read_fstring()?);
    }
    if h.ue4_version >= VER_UE4_SERIALIZE_TEXT_IN_PACKAGES {
        h.gatherable_text_data = Some(read_section(r)?);
    }

    h.exports = read_section(r)?;
    h.imports = read_section(r)?;
    h.depends_offset = r.read_i32()?;

    if h.ue4_version < VER_UE4_OLDEST_LOADABLE_PACKAGE {
        return Err(DecodeError::format(
            r.current_index(),
            format!(
                "asset version {} predates the oldest loadable package",
                h.ue4_version
            ),
        ));
    }

    if h.ue4_version >= VER_UE4_ADD_STRING_ASSET_REFERENCES_MAP {
        h.soft_package_references = Some(read_section(r)?);
    }
    if h.ue4_version >= VER_UE4_ADDED_SEARCHABLE_NAMES {
        h.searchable_names_offset = Some(r.read_i32()?);
    }

    h.thumbnail_table_offset = r.read_i32()?;
    h.guid = r.read_guid_hex()?;
    if h.ue4_version >= VER_UE4_ADDED_PACKAGE_OWNER {
        h.persistent_guid = Some(r.read_guid_hex()?);
    }
    if h.ue4_version >= VER_UE4_ADDED_PACKAGE_OWNER
        && h.ue4_version < VER_UE4_NON_OUTER_PACKAGE_IMPORT
    {
        h.owner_persistent_guid = Some(r.read_guid_hex()?);
    }

    let generation_count = r.read_i32()?;
    if generation_count < 0 {
        return Err(DecodeError::format(
            r.current_index() - 4,
            format!("negative generation count {generation_count}"),
        ));
    }
    for _ in 0..generation_count {
        let export_count = r.read_i32()?;
        let name_count = r.read_i32()?;
        h.generations.push(Generation {
            export_count,
            name_count,
        });
    }

    h.saved_by_engine_version = if h.ue4_version >= VER_UE4_ENGINE_VERSION_OBJECT {
        EngineVersionInfo::Version(read_engine_version(r)?)
    } else {
        EngineVersionInfo::Changelist(r.read_i32()?)
    };
    h.compatible_with_engine_version =
        if h.ue4_version >= VER_UE4_PACKAGE_SUMMARY_HAS_COMPATIBLE_ENGINE_VERSION {
            EngineVersionInfo::Version(read_engine_version(r)?)
        } else {
            h.saved_by_engine_version.clone()
        };

    h.compression_flags = r.read_u32()?;
    let compressed_chunk_count = r.read_i32()?;
    if compressed_chunk_count > 0 {
        return Err(DecodeError::Unsupported {
            offset: r.current_index() - 4,
            feature: UnsupportedFeature::CompressedChunks,
        });
    }

    h.package_source = r.read_u32()?;
    let packages_to_cook_count = r.read_u32()?;
    if packages_to_cook_count > 0 {
        return Err(DecodeError::Unsupported {
            offset: r.current_index() - 4,
            feature: UnsupportedFeature::PackagesToCook,
        });
    }

    if h.legacy_file_version > -7 {
        h.num_texture_allocations = Some(r.read_i32()?);
    }

    h.asset_registry_data_offset = r.read_i32()?;
    h.bulk_data_start_offset = r.read_i64()?;

    if h.ue4_version >= VER_UE4_WORLD_LEVEL_INFO {
        h.world_tile_info_offset = Some(r.read_i32()?);
    }

    if h.ue4_version >= VER_UE4_CHANGED_CHUNKID_TO_BE_AN_ARRAY_OF_CHUNKIDS {
        let chunk_id_count = r.read_i32()?;
        if chunk_id_count > 0 {
            return Err(DecodeError::Unsupported {
                offset: r.current_index() - 4,
                feature: UnsupportedFeature::ChunkIds,
            });
        }
    } else if h.ue4_version >= VER_UE4_ADDED_CHUNKID_TO_ASSETDATA_AND_UPACKAGE {
        h.chunk_id = Some(r.read_i32()?);
    }

    h.preload_dependencies = if h.ue4_version >= VER_UE4_PRELOAD_DEPENDENCIES_IN_COOKED_EXPORTS {
        read_section(r)?
    } else {
        SectionRef {
            count: -1,
            offset: 0,
        }
    };

    if h.ue5_version >= VER_UE5_NAMES_REFERENCED_FROM_EXPORT_DATA {
        h.names_referenced_from_export_data_count = Some(r.read_i32()?);
    }
    h.payload_toc_offset = if h.ue5_version >= VER_UE5_PAYLOAD_TOC {
        r.read_i64()?
    } else {
        -1
    };
    if h.ue5_version >= VER_UE5_DATA_RESOURCES {
        h.data_resource_offset = Some(r.read_i32()?);
    }

    Ok(h)
}
