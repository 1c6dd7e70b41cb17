use std::fs;
use std::path::Path;

use uasset_core::header::{EngineVersion, EngineVersionInfo, SectionRef, read_header};
use uasset_core::names::read_names;
use uasset_core::reader::Reader;
use uasset_core::scan::{is_candidate_asset, list_assets};
use uasset_core::synth::{PackageBuilder, ThumbnailSpec};
use uasset_core::{
    DecodeError, DecodeOpts, ThumbnailFormat, UnsupportedFeature, decode_bytes, decode_file,
};

#[test]
fn minimal_package_decodes_end_to_end() {
    let bytes = PackageBuilder::new()
        .name("Alpha", 1, 2)
        .name("Beta", 3, 4)
        .thumbnail(ThumbnailSpec::png(
            "StaticMesh",
            "SM_Stairs",
            64,
            128,
            vec![7u8; 10],
        ))
        .build();
    let pkg = decode_bytes(&bytes, &DecodeOpts::default()).expect("decode");

    assert_eq!(pkg.header.legacy_file_version, -7);
    assert_eq!(pkg.header.ue4_version, 522);
    assert_eq!(pkg.names.len(), 2);
    assert_eq!(pkg.name(0), Some("Alpha"));
    assert_eq!(pkg.name(1), Some("Beta"));
    assert_eq!(pkg.names[1].non_case_preserving_hash, 3);
    assert_eq!(pkg.thumbnails.len(), 1);
    assert_eq!(pkg.thumbnails[0].format, ThumbnailFormat::Png);
    assert_eq!(pkg.thumbnails[0].bytes.as_deref().map(<[u8]>::len), Some(10));
    assert_eq!(pkg.asset_class(), Some("StaticMesh"));
    // sections this reader never parses stay addressable
    assert_eq!(pkg.header.exports, SectionRef { count: 0, offset: 0 });
    assert!(pkg.header.searchable_names_offset.is_some());
}

#[test]
fn byte_swapped_stream_decodes_identically() {
    let build = |big: bool| {
        PackageBuilder::new()
            .big_endian(big)
            .folder_name("/Game/Props")
            .package_flags(0x8000_0000)
            .custom_version([9u8; 16], 3)
            .generation(12, 34)
            .name("Alpha", 1, 2)
            .thumbnail(ThumbnailSpec::jpeg("Texture2D", "T_Wall", 32, 64, vec![5; 6]))
            .build()
    };
    let le = decode_bytes(&build(false), &DecodeOpts::default()).expect("little-endian decode");
    let be = decode_bytes(&build(true), &DecodeOpts::default()).expect("big-endian decode");

    assert!(!le.header.byte_swapped);
    assert!(be.header.byte_swapped);
    assert_eq!(le.header.folder_name, be.header.folder_name);
    assert_eq!(le.header.package_flags, be.header.package_flags);
    assert_eq!(le.header.custom_versions, be.header.custom_versions);
    assert_eq!(le.header.generations, be.header.generations);
    assert_eq!(le.header.guid, be.header.guid);
    assert_eq!(le.header.total_header_size, be.header.total_header_size);
    assert_eq!(le.header.names, be.header.names);
    assert_eq!(
        le.header.saved_by_engine_version,
        be.header.saved_by_engine_version
    );
    assert_eq!(le.names, be.names);
    assert_eq!(le.thumbnails, be.thumbnails);
}

#[test]
fn too_old_package_is_a_format_error() {
    let bytes = PackageBuilder::new().ue4_version(200).build();
    let err = decode_bytes(&bytes, &DecodeOpts::default()).unwrap_err();
    assert!(matches!(err, DecodeError::Format { .. }));
    assert!(err.is_format());
    assert!(!err.is_unsupported());
}

#[test]
fn bad_tag_is_a_format_error() {
    let mut bytes = PackageBuilder::new().build();
    bytes[0..4].copy_from_slice(&0xDEAD_BEEF_u32.to_le_bytes());
    let err = decode_bytes(&bytes, &DecodeOpts::default()).unwrap_err();
    assert!(matches!(err, DecodeError::Format { .. }));
}

#[test]
fn unversioned_package_is_a_format_error() {
    let bytes = PackageBuilder::new()
        .legacy_file_version(-8)
        .ue4_version(0)
        .ue5_version(0)
        .build();
    let err = decode_bytes(&bytes, &DecodeOpts::default()).unwrap_err();
    assert!(matches!(err, DecodeError::Format { .. }));
    assert!(err.to_string().contains("unversioned"));
}

#[test]
fn compressed_chunks_are_rejected_as_unsupported() {
    let bytes = PackageBuilder::new().compressed_chunk_count(2).build();
    let err = decode_bytes(&bytes, &DecodeOpts::default()).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::Unsupported {
            feature: UnsupportedFeature::CompressedChunks,
            ..
        }
    ));
    assert!(err.is_unsupported());
    assert!(!err.is_format());
}

#[test]
fn packages_to_cook_are_rejected_as_unsupported() {
    let bytes = PackageBuilder::new().packages_to_cook_count(1).build();
    let err = decode_bytes(&bytes, &DecodeOpts::default()).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::Unsupported {
            feature: UnsupportedFeature::PackagesToCook,
            ..
        }
    ));
}

#[test]
fn chunk_id_array_entries_are_rejected_as_unsupported() {
    let bytes = PackageBuilder::new().chunk_id_count(3).build();
    let err = decode_bytes(&bytes, &DecodeOpts::default()).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::Unsupported {
            feature: UnsupportedFeature::ChunkIds,
            ..
        }
    ));
}

#[test]
fn name_table_reads_exact_bytes_and_is_idempotent() {
    let bytes = PackageBuilder::new()
        .name("Alpha", 10, 11)
        .name("Beta", 20, 21)
        .build();
    let header = read_header(&mut Reader::new(&bytes)).expect("header");

    let mut first = Reader::new(&bytes);
    let names_a = read_names(&mut first, &header).expect("names");
    // "Alpha": 4 + 6 + 2 + 2, "Beta": 4 + 5 + 2 + 2
    let expected_end = header.names.offset as usize + 14 + 13;
    assert_eq!(first.current_index(), expected_end);

    let mut second = Reader::new(&bytes);
    let names_b = read_names(&mut second, &header).expect("names again");
    assert_eq!(names_a, names_b);
    assert_eq!(names_a[0].name, "Alpha");
    assert_eq!(names_a[1].case_preserving_hash, 21);
}

#[test]
fn thumbnail_height_sign_selects_format() {
    let bytes = PackageBuilder::new()
        .thumbnail(ThumbnailSpec::jpeg("Texture2D", "T_A", 32, 64, vec![1, 2, 3]))
        .thumbnail(ThumbnailSpec::png("Texture2D", "T_B", 32, 128, Vec::new()))
        .build();
    let pkg = decode_bytes(&bytes, &DecodeOpts::default()).expect("decode");

    assert_eq!(pkg.thumbnails[0].format, ThumbnailFormat::Jpeg);
    assert_eq!(pkg.thumbnails[0].height, 64);
    assert_eq!(pkg.thumbnails[0].bytes.as_deref(), Some(&[1u8, 2, 3][..]));
    assert_eq!(pkg.thumbnails[1].format, ThumbnailFormat::Png);
    assert_eq!(pkg.thumbnails[1].height, 128);
    assert_eq!(pkg.thumbnails[1].size, 0);
    assert!(pkg.thumbnails[1].bytes.is_none());
}

#[test]
fn compatible_version_defaults_to_structured_saved_by() {
    // 400 is past the engine-version object but before the dedicated
    // compatible-with field.
    let bytes = PackageBuilder::new()
        .ue4_version(400)
        .engine_version(4, 27, 2, 17_155_196, "++UE4+Release-4.27")
        .build();
    let pkg = decode_bytes(&bytes, &DecodeOpts::default()).expect("decode");

    assert_eq!(
        pkg.header.saved_by_engine_version.to_string(),
        "4.27.2-17155196+++UE4+Release-4.27"
    );
    assert_eq!(
        pkg.header.compatible_with_engine_version,
        pkg.header.saved_by_engine_version
    );
}

#[test]
fn compatible_version_defaults_to_legacy_changelist() {
    let bytes = PackageBuilder::new()
        .ue4_version(300)
        .engine_changelist(555)
        .build();
    let pkg = decode_bytes(&bytes, &DecodeOpts::default()).expect("decode");

    assert_eq!(
        pkg.header.saved_by_engine_version,
        EngineVersionInfo::Changelist(555)
    );
    assert_eq!(
        pkg.header.compatible_with_engine_version,
        EngineVersionInfo::Changelist(555)
    );
    // 300 also predates preload dependencies and the chunk-id array
    assert_eq!(
        pkg.header.preload_dependencies,
        SectionRef { count: -1, offset: 0 }
    );
    assert_eq!(pkg.header.chunk_id, Some(0));
}

#[test]
fn distinct_compatible_version_is_kept() {
    let bytes = PackageBuilder::new()
        .engine_version(5, 1, 0, 123_456, "++UE5")
        .compatible_version(5, 0, 0, 100_000, "++UE5")
        .build();
    let pkg = decode_bytes(&bytes, &DecodeOpts::default()).expect("decode");
    assert_eq!(
        pkg.header.compatible_with_engine_version.to_string(),
        "5.0.0-100000+++UE5"
    );
    assert_ne!(
        pkg.header.compatible_with_engine_version,
        pkg.header.saved_by_engine_version
    );
}

#[test]
fn engine_version_renders_structured_string() {
    let v = EngineVersion {
        major: 5,
        minor: 1,
        patch: 0,
        changelist: 123_456,
        branch: "++UE5".to_string(),
    };
    assert_eq!(v.to_string(), "5.1.0-123456+++UE5");
}

#[test]
fn ue5_stream_carries_ue5_gated_fields() {
    let bytes = PackageBuilder::new()
        .legacy_file_version(-8)
        .ue5_version(1009)
        .build();
    let pkg = decode_bytes(&bytes, &DecodeOpts::default()).expect("decode");

    assert_eq!(pkg.header.ue5_version, 1009);
    assert!(pkg.header.soft_object_paths.is_some());
    assert_eq!(pkg.header.names_referenced_from_export_data_count, Some(0));
    assert_eq!(pkg.header.payload_toc_offset, -1);
    assert_eq!(pkg.header.data_resource_offset, Some(0));
}

#[test]
fn pre_ue5_stream_defaults_ue5_fields() {
    let bytes = PackageBuilder::new().build();
    let pkg = decode_bytes(&bytes, &DecodeOpts::default()).expect("decode");

    assert_eq!(pkg.header.ue5_version, 0);
    assert!(pkg.header.soft_object_paths.is_none());
    assert!(pkg.header.names_referenced_from_export_data_count.is_none());
    assert_eq!(pkg.header.payload_toc_offset, -1);
    assert!(pkg.header.data_resource_offset.is_none());
}

#[test]
fn custom_versions_and_generations_decode() {
    let key: [u8; 16] = [
        0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
        0x10,
    ];
    let bytes = PackageBuilder::new()
        .custom_version(key, 7)
        .generation(10, 20)
        .build();
    let pkg = decode_bytes(&bytes, &DecodeOpts::default()).expect("decode");

    assert_eq!(pkg.header.custom_versions.len(), 1);
    assert_eq!(
        pkg.header.custom_versions[0].key,
        "04030201080706050C0B0A09100F0E0D"
    );
    assert_eq!(pkg.header.custom_versions[0].version, 7);
    assert_eq!(pkg.header.generations.len(), 1);
    assert_eq!(pkg.header.generations[0].export_count, 10);
    assert_eq!(pkg.header.generations[0].name_count, 20);
}

#[test]
fn fstring_strips_terminator_and_handles_empty() {
    let mut data = Vec::new();
    data.extend_from_slice(&5i32.to_le_bytes());
    data.extend_from_slice(b"Test\0");
    data.extend_from_slice(&0i32.to_le_bytes());
    let mut r = Reader::new(&data);
    assert_eq!(r.read_fstring().expect("narrow string"), "Test");
    assert_eq!(r.read_fstring().expect("empty string"), "");
}

#[test]
fn negative_fstring_length_is_unsupported_utf16() {
    let data = (-4i32).to_le_bytes();
    let mut r = Reader::new(&data);
    let err = r.read_fstring().unwrap_err();
    assert!(matches!(
        err,
        DecodeError::Unsupported {
            feature: UnsupportedFeature::Utf16Strings,
            ..
        }
    ));
}

#[test]
fn guid_encodings_render_as_expected() {
    let raw: [u8; 16] = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
        0x0f,
    ];
    let mut r = Reader::new(&raw);
    assert_eq!(
        r.read_guid_hex().expect("plain guid"),
        "000102030405060708090a0b0c0d0e0f"
    );
    let mut r = Reader::new(&raw);
    assert_eq!(
        r.read_guid_slotted().expect("slotted guid"),
        "03020100070605040B0A09080F0E0D0C"
    );
}

#[test]
fn truncated_stream_reports_truncation() {
    let bytes = PackageBuilder::new()
        .name("Alpha", 1, 2)
        .thumbnail(ThumbnailSpec::png("Texture2D", "T_C", 16, 16, vec![1; 8]))
        .build();

    // chop mid-directory
    let err = decode_bytes(&bytes[..bytes.len() - 6], &DecodeOpts::default()).unwrap_err();
    assert!(matches!(err, DecodeError::Truncated { .. }));
    assert!(err.is_format());

    // chop mid-header
    let err = decode_bytes(&bytes[..16], &DecodeOpts::default()).unwrap_err();
    assert!(matches!(err, DecodeError::Truncated { .. }));
}

#[test]
fn lenient_mode_skips_undecodable_thumbnail_rows() {
    let mut bad = ThumbnailSpec::png("Texture2D", "T_Bad", 16, 16, vec![9; 4]);
    bad.directory_offset_override = Some(0x7FFF_0000);
    let bytes = PackageBuilder::new()
        .name("Alpha", 1, 2)
        .thumbnail(bad)
        .thumbnail(ThumbnailSpec::png("Texture2D", "T_Good", 16, 16, vec![1; 8]))
        .build();

    let err = decode_bytes(&bytes, &DecodeOpts::default()).unwrap_err();
    assert!(matches!(err, DecodeError::Truncated { .. }));

    let lenient = DecodeOpts {
        lenient_thumbnails: true,
    };
    let pkg = decode_bytes(&bytes, &lenient).expect("lenient decode");
    assert_eq!(pkg.thumbnails.len(), 1);
    assert_eq!(pkg.thumbnails[0].object_path, "T_Good");
    assert_eq!(pkg.names.len(), 1);
}

#[test]
fn omitted_thumbnail_table_yields_empty_list() {
    let bytes = PackageBuilder::new()
        .name("Alpha", 1, 2)
        .omit_thumbnail_table()
        .build();
    let pkg = decode_bytes(&bytes, &DecodeOpts::default()).expect("decode");
    assert_eq!(pkg.header.thumbnail_table_offset, 0);
    assert!(pkg.thumbnails.is_empty());
    assert!(pkg.asset_class().is_none());
}

#[test]
fn decode_file_reads_from_disk_and_reports_io() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("SM_Rock.uasset");
    fs::write(&path, PackageBuilder::new().name("Alpha", 1, 2).build()).expect("write fixture");

    let pkg = decode_file(&path, &DecodeOpts::default()).expect("decode from disk");
    assert_eq!(pkg.names.len(), 1);

    let err = decode_file(&dir.path().join("missing.uasset"), &DecodeOpts::default()).unwrap_err();
    assert!(matches!(err, DecodeError::Io(_)));
}

#[test]
fn candidate_filter_and_listing() {
    assert!(is_candidate_asset(Path::new("Content/SM_Rock.uasset")));
    assert!(!is_candidate_asset(Path::new(
        "Content/__ExternalActors__/A.uasset"
    )));
    assert!(!is_candidate_asset(Path::new("Content/Level.umap")));

    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("Sub")).expect("mkdir");
    fs::write(
        dir.path().join("Sub").join("A.uasset"),
        PackageBuilder::new().build(),
    )
    .expect("write asset");
    fs::write(dir.path().join("readme.txt"), "x").expect("write decoy");

    let found = list_assets(dir.path());
    assert_eq!(found.len(), 1);
    assert!(found[0].ends_with("A.uasset"));
}

#[test]
fn json_dump_projects_the_decode_result() {
    let bytes = PackageBuilder::new()
        .name("Alpha", 1, 2)
        .thumbnail(ThumbnailSpec::png(
            "StaticMesh",
            "SM_Stairs",
            64,
            128,
            vec![7u8; 10],
        ))
        .build();
    let pkg = decode_bytes(&bytes, &DecodeOpts::default()).expect("decode");
    let js = uasset_core::json::dump_package_json(&pkg, &uasset_core::json::JsonOpts::default());

    let v: serde_json::Value = serde_json::from_str(&js).expect("valid json");
    assert_eq!(v["header"]["ue4_version"], 522);
    assert_eq!(v["header"]["saved_by_engine_version"], "5.1.0-123456+++UE5+Release-5.1");
    assert_eq!(v["names"][0]["name"], "Alpha");
    assert_eq!(v["thumbnails"][0]["format"], "PNG");
    assert_eq!(v["thumbnails"][0]["bytes"]["len"], 10);
}

#[test]
fn json_dump_truncates_long_name_lists() {
    let mut builder = PackageBuilder::new();
    for i in 0..10 {
        builder = builder.name(&format!("Name{i}"), i as u16, 0);
    }
    let pkg = decode_bytes(&builder.build(), &DecodeOpts::default()).expect("decode");
    let opts = uasset_core::json::JsonOpts {
        max_array_elems: 4,
        bytes_summary: true,
    };
    let v = uasset_core::json::package_to_json(&pkg, &opts);
    let names = v["names"].as_array().expect("names array");
    assert_eq!(names.len(), 5);
    assert_eq!(names[4]["$truncated"], true);
    assert_eq!(names[4]["$omitted"], 6);
}
