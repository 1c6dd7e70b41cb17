//! Synthetic package construction.
//!
//! Builds byte streams that satisfy the same version gates the header
//! decoder applies, in either byte order, back-patching the table
//! offsets once the tables are laid out. This is fixture machinery for
//! the test suite (and anyone needing deterministic sample packages),
//! not a re-encoder for decoded packages.

use crate::header::{
    PACKAGE_FILE_TAG, VER_UE4_ADD_STRING_ASSET_REFERENCES_MAP,
    VER_UE4_ADDED_CHUNKID_TO_ASSETDATA_AND_UPACKAGE, VER_UE4_ADDED_PACKAGE_OWNER,
    VER_UE4_ADDED_PACKAGE_SUMMARY_LOCALIZATION_ID, VER_UE4_ADDED_SEARCHABLE_NAMES,
    VER_UE4_CHANGED_CHUNKID_TO_BE_AN_ARRAY_OF_CHUNKIDS, VER_UE4_ENGINE_VERSION_OBJECT,
    VER_UE4_NON_OUTER_PACKAGE_IMPORT, VER_UE4_PACKAGE_SUMMARY_HAS_COMPATIBLE_ENGINE_VERSION,
    VER_UE4_PRELOAD_DEPENDENCIES_IN_COOKED_EXPORTS, VER_UE4_SERIALIZE_TEXT_IN_PACKAGES,
    VER_UE4_WORLD_LEVEL_INFO, VER_UE5_ADD_SOFTOBJECTPATH_LIST, VER_UE5_DATA_RESOURCES,
    VER_UE5_NAMES_REFERENCED_FROM_EXPORT_DATA, VER_UE5_PAYLOAD_TOC,
};

/// One thumbnail in a synthetic package.
pub struct ThumbnailSpec {
    pub asset_class_name: String,
    pub object_path: String,
    pub width: i32,
    /// Written as-is: negative marks a JPEG payload.
    pub raw_height: i32,
    pub bytes: Vec<u8>,
    /// When set, written into the directory row instead of the real
    /// payload offset. Lets tests point a row at garbage.
    pub directory_offset_override: Option<i32>,
}

impl ThumbnailSpec {
    pub fn png(class: &str, path: &str, width: i32, height: i32, bytes: Vec<u8>) -> Self {
        Self {
            asset_class_name: class.to_string(),
            object_path: path.to_string(),
            width,
            raw_height: height,
            bytes,
            directory_offset_override: None,
        }
    }

    pub fn jpeg(class: &str, path: &str, width: i32, height: i32, bytes: Vec<u8>) -> Self {
        Self {
            raw_height: -height,
            ..Self::png(class, path, width, height, bytes)
        }
    }
}

pub struct PackageBuilder {
    big_endian: bool,
    legacy_file_version: i32,
    legacy_ue3_version: i32,
    ue4_version: i32,
    ue5_version: i32,
    licensee_ue4_version: i32,
    folder_name: String,
    package_flags: u32,
    custom_versions: Vec<([u8; 16], i32)>,
    generations: Vec<(i32, i32)>,
    engine_version: (u16, u16, u16, u32, String),
    compatible_version: Option<(u16, u16, u16, u32, String)>,
    engine_changelist: i32,
    guid: [u8; 16],
    compressed_chunk_count: i32,
    packages_to_cook_count: u32,
    chunk_id_count: i32,
    names: Vec<(String, u16, u16)>,
    thumbnails: Vec<ThumbnailSpec>,
    write_thumbnail_table: bool,
}

impl Default for PackageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageBuilder {
    /// Defaults produce a minimal valid little-endian package with
    /// `legacy_file_version = -7` and a recent UE4 serialization version.
    pub fn new() -> Self {
        Self {
            big_endian: false,
            legacy_file_version: -7,
            legacy_ue3_version: 864,
            ue4_version: 522,
            ue5_version: 0,
            licensee_ue4_version: 0,
            folder_name: "None".to_string(),
            package_flags: 0,
            custom_versions: Vec::new(),
            generations: Vec::new(),
            engine_version: (5, 1, 0, 123_456, "++UE5+Release-5.1".to_string()),
            compatible_version: None,
            engine_changelist: 0,
            guid: [
                0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x1b, 0x1c,
                0x1d, 0x1e, 0x1f,
            ],
            compressed_chunk_count: 0,
            packages_to_cook_count: 0,
            chunk_id_count: 0,
            names: Vec::new(),
            thumbnails: Vec::new(),
            write_thumbnail_table: true,
        }
    }

    pub fn big_endian(mut self, on: bool) -> Self {
        self.big_endian = on;
        self
    }

    pub fn legacy_file_version(mut self, v: i32) -> Self {
        self.legacy_file_version = v;
        self
    }

    pub fn ue4_version(mut self, v: i32) -> Self {
        self.ue4_version = v;
        self
    }

    /// Only written to the stream when `legacy_file_version <= -8`.
    pub fn ue5_version(mut self, v: i32) -> Self {
        self.ue5_version = v;
        self
    }

    pub fn licensee_ue4_version(mut self, v: i32) -> Self {
        self.licensee_ue4_version = v;
        self
    }

    pub fn folder_name(mut self, name: &str) -> Self {
        self.folder_name = name.to_string();
        self
    }

    pub fn package_flags(mut self, flags: u32) -> Self {
        self.package_flags = flags;
        self
    }

    pub fn custom_version(mut self, key: [u8; 16], version: i32) -> Self {
        self.custom_versions.push((key, version));
        self
    }

    pub fn generation(mut self, export_count: i32, name_count: i32) -> Self {
        self.generations.push((export_count, name_count));
        self
    }

    pub fn engine_version(
        mut self,
        major: u16,
        minor: u16,
        patch: u16,
        changelist: u32,
        branch: &str,
    ) -> Self {
        self.engine_version = (major, minor, patch, changelist, branch.to_string());
        self
    }

    pub fn compatible_version(
        mut self,
        major: u16,
        minor: u16,
        patch: u16,
        changelist: u32,
        branch: &str,
    ) -> Self {
        self.compatible_version = Some((major, minor, patch, changelist, branch.to_string()));
        self
    }

    /// Written instead of the structured engine version on streams below
    /// the engine-version-object threshold.
    pub fn engine_changelist(mut self, changelist: i32) -> Self {
        self.engine_changelist = changelist;
        self
    }

    pub fn guid(mut self, guid: [u8; 16]) -> Self {
        self.guid = guid;
        self
    }

    pub fn compressed_chunk_count(mut self, count: i32) -> Self {
        self.compressed_chunk_count = count;
        self
    }

    pub fn packages_to_cook_count(mut self, count: u32) -> Self {
        self.packages_to_cook_count = count;
        self
    }

    pub fn chunk_id_count(mut self, count: i32) -> Self {
        self.chunk_id_count = count;
        self
    }

    pub fn name(mut self, name: &str, non_case_hash: u16, case_hash: u16) -> Self {
        self.names.push((name.to_string(), non_case_hash, case_hash));
        self
    }

    pub fn thumbnail(mut self, spec: ThumbnailSpec) -> Self {
        self.thumbnails.push(spec);
        self
    }

    /// Leave the thumbnail-table offset at 0, the "no table" marker.
    pub fn omit_thumbnail_table(mut self) -> Self {
        self.write_thumbnail_table = false;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        // Gates below must mirror the decoder's; a UE5 version on a
        // stream whose legacy version excludes the field is not written.
        let ue5 = if self.legacy_file_version <= -8 {
            self.ue5_version
        } else {
            0
        };
        let mut w = Out {
            buf: Vec::with_capacity(512),
            big_endian: self.big_endian,
        };

        w.u32(PACKAGE_FILE_TAG);
        w.i32(self.legacy_file_version);
        w.i32(self.legacy_ue3_version);
        w.i32(self.ue4_version);
        if self.legacy_file_version <= -8 {
            w.i32(ue5);
        }
        w.i32(self.licensee_ue4_version);

        w.i32(self.custom_versions.len() as i32);
        for (key, version) in &self.custom_versions {
            w.raw(key);
            w.i32(*version);
        }

        let total_header_size_at = w.placeholder_i32();
        w.fstring(&self.folder_name);
        w.u32(self.package_flags);
        w.i32(self.names.len() as i32);
        let name_offset_at = w.placeholder_i32();

        if ue5 >= VER_UE5_ADD_SOFTOBJECTPATH_LIST {
            w.u32(0); // soft object path count
            w.u32(0); // soft object path offset
        }
        if self.ue4_version >= VER_UE4_ADDED_PACKAGE_SUMMARY_LOCALIZATION_ID {
            w.fstring("");
        }
        if self.ue4_version >= VER_UE4_SERIALIZE_TEXT_IN_PACKAGES {
            w.i32(0); // gatherable text count
            w.i32(0); // gatherable text offset
        }
        w.i32(0); // export count
        w.i32(0); // export offset
        w.i32(0); // import count
        w.i32(0); // import offset
        w.i32(0); // depends offset
        if self.ue4_version >= VER_UE4_ADD_STRING_ASSET_REFERENCES_MAP {
            w.i32(0); // soft package reference count
            w.i32(0); // soft package reference offset
        }
        if self.ue4_version >= VER_UE4_ADDED_SEARCHABLE_NAMES {
            w.i32(0);
        }
        let thumbnail_offset_at = w.placeholder_i32();
        w.raw(&self.guid);
        if self.ue4_version >= VER_UE4_ADDED_PACKAGE_OWNER {
            w.raw(&self.guid);
        }
        if self.ue4_version >= VER_UE4_ADDED_PACKAGE_OWNER
            && self.ue4_version < VER_UE4_NON_OUTER_PACKAGE_IMPORT
        {
            w.raw(&self.guid);
        }

        w.i32(self.generations.len() as i32);
        for (export_count, name_count) in &self.generations {
            w.i32(*export_count);
            w.i32(*name_count);
        }

        if self.ue4_version >= VER_UE4_ENGINE_VERSION_OBJECT {
            write_engine_version(&mut w, &self.engine_version);
        } else {
            w.i32(self.engine_changelist);
        }
        if self.ue4_version >= VER_UE4_PACKAGE_SUMMARY_HAS_COMPATIBLE_ENGINE_VERSION {
            let compat = self.compatible_version.as_ref().unwrap_or(&self.engine_version);
            write_engine_version(&mut w, compat);
        }

        w.u32(0); // compression flags
        w.i32(self.compressed_chunk_count);
        w.u32(0); // package source
        w.u32(self.packages_to_cook_count);
        if self.legacy_file_version > -7 {
            w.i32(0); // texture allocations
        }
        w.i32(0); // asset registry data offset
        w.i64(0); // bulk data start offset
        if self.ue4_version >= VER_UE4_WORLD_LEVEL_INFO {
            w.i32(0);
        }
        if self.ue4_version >= VER_UE4_CHANGED_CHUNKID_TO_BE_AN_ARRAY_OF_CHUNKIDS {
            w.i32(self.chunk_id_count);
        } else if self.ue4_version >= VER_UE4_ADDED_CHUNKID_TO_ASSETDATA_AND_UPACKAGE {
            w.i32(0); // single legacy chunk id
        }
        if self.ue4_version >= VER_UE4_PRELOAD_DEPENDENCIES_IN_COOKED_EXPORTS {
            w.i32(0); // preload dependency count
            w.i32(0); // preload dependency offset
        }
        if ue5 >= VER_UE5_NAMES_REFERENCED_FROM_EXPORT_DATA {
            w.i32(0);
        }
        if ue5 >= VER_UE5_PAYLOAD_TOC {
            w.i64(-1);
        }
        if ue5 >= VER_UE5_DATA_RESOURCES {
            w.i32(0);
        }

        let header_len = w.buf.len() as i32;
        w.patch_i32(total_header_size_at, header_len);

        let name_off = w.buf.len() as i32;
        w.patch_i32(name_offset_at, name_off);
        for (name, non_case_hash, case_hash) in &self.names {
            w.fstring(name);
            w.u16(*non_case_hash);
            w.u16(*case_hash);
        }

        if self.write_thumbnail_table {
            let mut payload_offsets = Vec::with_capacity(self.thumbnails.len());
            for t in &self.thumbnails {
                payload_offsets.push(w.buf.len() as i32);
                w.i32(t.width);
                w.i32(t.raw_height);
                w.i32(t.bytes.len() as i32);
                w.raw(&t.bytes);
            }
            let dir_off = w.buf.len() as i32;
            w.patch_i32(thumbnail_offset_at, dir_off);
            w.i32(self.thumbnails.len() as i32);
            for (t, off) in self.thumbnails.iter().zip(&payload_offsets) {
                w.fstring(&t.asset_class_name);
                w.fstring(&t.object_path);
                w.i32(t.directory_offset_override.unwrap_or(*off));
            }
        }

        w.buf
    }
}

fn write_engine_version(w: &mut Out, v: &(u16, u16, u16, u32, String)) {
    w.u16(v.0);
    w.u16(v.1);
    w.u16(v.2);
    w.u32(v.3);
    w.fstring(&v.4);
}

struct Out {
    buf: Vec<u8>,
    big_endian: bool,
}

impl Out {
    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn u16(&mut self, v: u16) {
        let b = if self.big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        };
        self.buf.extend_from_slice(&b);
    }

    fn u32(&mut self, v: u32) {
        let b = if self.big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        };
        self.buf.extend_from_slice(&b);
    }

    fn i32(&mut self, v: i32) {
        self.u32(v as u32);
    }

    fn i64(&mut self, v: i64) {
        let b = if self.big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        };
        self.buf.extend_from_slice(&b);
    }

    fn raw(&mut self, b: &[u8]) {
        self.buf.extend_from_slice(b);
    }

    fn fstring(&mut self, s: &str) {
        self.i32(s.len() as i32 + 1);
        self.buf.extend_from_slice(s.as_bytes());
        self.u8(0);
    }

    fn placeholder_i32(&mut self) -> usize {
        let at = self.buf.len();
        self.i32(0);
        at
    }

    fn patch_i32(&mut self, at: usize, v: i32) {
        let b = if self.big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        };
        self.buf[at..at + 4].copy_from_slice(&b);
    }
}
