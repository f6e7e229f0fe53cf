use std::fs::File;
use std::path::Path;

use tempfile::tempdir;

use lspk::Error;
use lspk::pak::{
    DetectionResult, Package, WriterV10, WriterV13, WriterV18, detect, read_file_bytes,
};

/// Deterministic incompressible bytes (LCG noise).
fn noise(len: usize, mut seed: u32) -> Vec<u8> {
    (0..len)
        .map(|_| {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (seed >> 24) as u8
        })
        .collect()
}

fn detect_file(path: &Path) -> DetectionResult {
    let mut file = File::open(path).unwrap();
    detect(&mut file, Some(path)).unwrap()
}

#[test]
fn test_v18_single_file_round_trip() {
    let dir = tempdir().unwrap();
    let pak = dir.path().join("single.pak");

    let mut writer = WriterV18::new(&pak);
    writer.add_file("test.txt", b"hello world".to_vec(), true).unwrap();
    writer.save().unwrap();

    let bytes = std::fs::read(&pak).unwrap();
    assert_eq!(&bytes[..4], b"LSPK");

    let package = Package::read(&pak).unwrap();
    assert_eq!(package.version, 18);
    assert_eq!(package.files.len(), 1);

    let entry = &package.files[0];
    assert_eq!(entry.name, "test.txt");
    assert_eq!(entry.uncompressed_size, 11);
    assert_eq!(package.extract("test.txt").unwrap(), b"hello world");
}

#[test]
fn test_v13_compression_round_trip() {
    let dir = tempdir().unwrap();
    let pak = dir.path().join("compressed.pak");
    let payload = b"hello world\n".repeat(1000);
    assert_eq!(payload.len(), 12000);

    let mut writer = WriterV13::new(&pak);
    writer.add_file("big.txt", payload.clone(), true).unwrap();
    writer.save().unwrap();

    let bytes = std::fs::read(&pak).unwrap();
    assert_eq!(&bytes[bytes.len() - 4..], b"LSPK");

    let package = Package::read(&pak).unwrap();
    let entry = package.find("big.txt").unwrap();
    assert!(entry.compressed());
    assert!(entry.size_on_disk < 12000);
    assert_eq!(entry.uncompressed_size, 12000);
    assert_eq!(package.extract("big.txt").unwrap(), payload);
}

#[test]
fn test_v10_multiple_files_preserve_order() {
    let dir = tempdir().unwrap();
    let pak = dir.path().join("stored.pak");

    let mut writer = WriterV10::new(&pak);
    writer.add_file("dir/a", b"A".to_vec()).unwrap();
    writer.add_file("dir/b", b"BB".to_vec()).unwrap();
    writer.add_file("dir/c", b"CCC".to_vec()).unwrap();
    writer.save().unwrap();

    let bytes = std::fs::read(&pak).unwrap();
    assert_eq!(&bytes[..4], b"LSPK");

    let package = Package::read(&pak).unwrap();
    assert_eq!(package.version, 10);
    assert_eq!(package.file_names(), vec!["dir/a", "dir/b", "dir/c"]);

    for (entry, expected) in package.files.iter().zip([&b"A"[..], &b"BB"[..], &b"CCC"[..]]) {
        assert_eq!(entry.flags, 0);
        assert_eq!(entry.uncompressed_size, 0);
        assert_eq!(entry.size_on_disk, expected.len() as u64);
        assert_eq!(package.extract_entry(entry).unwrap(), expected);
    }
}

#[test]
fn test_v13_multi_part_split_and_extraction() {
    let dir = tempdir().unwrap();
    let pak = dir.path().join("parts.pak");
    let payloads = [noise(600, 1), noise(600, 2), noise(600, 3)];

    let mut writer = WriterV13::new(&pak).with_max_part_size(1000);
    for (i, payload) in payloads.iter().enumerate() {
        writer.add_file(&format!("file{i}.bin"), payload.clone(), false).unwrap();
    }
    writer.save().unwrap();

    assert!(pak.exists());
    assert!(dir.path().join("parts_1.pak").exists());

    let package = Package::read(&pak).unwrap();
    assert!(package.files.iter().any(|e| e.archive_part > 0));

    for (i, payload) in payloads.iter().enumerate() {
        assert_eq!(&package.extract(&format!("file{i}.bin")).unwrap(), payload);
    }
}

#[test]
fn test_continuation_detection_on_part_file() {
    let dir = tempdir().unwrap();
    let pak = dir.path().join("parts.pak");

    let mut writer = WriterV13::new(&pak).with_max_part_size(1000);
    writer.add_file("a.bin", noise(600, 4), false).unwrap();
    writer.add_file("b.bin", noise(600, 5), false).unwrap();
    writer.save().unwrap();

    let part_path = dir.path().join("parts_1.pak");
    assert_eq!(
        detect_file(&part_path),
        DetectionResult::Continuation {
            parent_path: pak.clone(),
            part_number: 1,
        }
    );

    // Opening the continuation directly redirects to the parent.
    match Package::read(&part_path) {
        Err(Error::ContinuationPart { parent, part }) => {
            assert_eq!(parent, pak);
            assert_eq!(part, 1);
        }
        other => panic!("expected continuation error, got {other:?}"),
    }
}

#[test]
fn test_v13_random_access_by_name() {
    let dir = tempdir().unwrap();
    let pak = dir.path().join("many.pak");

    let mut writer = WriterV13::new(&pak);
    for i in 0..50 {
        writer
            .add_file(&format!("filler/file{i}.txt"), format!("filler {i}").into_bytes(), true)
            .unwrap();
    }
    writer
        .add_file("target/last.txt", b"THIS IS THE TARGET FILE".to_vec(), true)
        .unwrap();
    writer.save().unwrap();

    let package = Package::read(&pak).unwrap();
    assert_eq!(package.files.len(), 51);
    assert_eq!(
        package.extract("target/last.txt").unwrap(),
        b"THIS IS THE TARGET FILE"
    );
}

#[test]
fn test_uncompressed_sentinel_v13_and_v18() {
    let dir = tempdir().unwrap();
    let payload = b"stored as-is".to_vec();

    let v13 = dir.path().join("stored13.pak");
    let mut writer = WriterV13::new(&v13);
    writer.add_file("raw.bin", payload.clone(), false).unwrap();
    writer.save().unwrap();

    let v18 = dir.path().join("stored18.pak");
    let mut writer = WriterV18::new(&v18);
    writer.add_file("raw.bin", payload.clone(), false).unwrap();
    writer.save().unwrap();

    for pak in [v13, v18] {
        let package = Package::read(&pak).unwrap();
        let entry = package.find("raw.bin").unwrap();
        assert_eq!(entry.flags, 0);
        assert_eq!(entry.uncompressed_size, 0);
        assert_eq!(entry.size_on_disk, payload.len() as u64);
        assert_eq!(package.extract("raw.bin").unwrap(), payload);
    }
}

#[test]
fn test_empty_files_extract_to_empty() {
    let dir = tempdir().unwrap();

    let v10 = dir.path().join("empty10.pak");
    let mut writer = WriterV10::new(&v10);
    writer.add_file("empty.txt", Vec::new()).unwrap();
    writer.save().unwrap();

    let v13 = dir.path().join("empty13.pak");
    let mut writer = WriterV13::new(&v13);
    writer.add_file("empty.txt", Vec::new(), true).unwrap();
    writer.save().unwrap();

    let v18 = dir.path().join("empty18.pak");
    let mut writer = WriterV18::new(&v18);
    writer.add_file("empty.txt", Vec::new(), true).unwrap();
    writer.save().unwrap();

    for pak in [v10, v13, v18] {
        let package = Package::read(&pak).unwrap();
        let entry = package.find("empty.txt").unwrap();
        assert_eq!(entry.size_on_disk, 0);
        assert_eq!(entry.flags, 0);
        assert_eq!(package.extract("empty.txt").unwrap(), Vec::<u8>::new());
    }
}

#[test]
fn test_v18_multi_file_order_and_extract_all() {
    let dir = tempdir().unwrap();
    let pak = dir.path().join("tree.pak");

    let files = [
        ("Mods/Shared/meta.lsx", b"<save/>".to_vec()),
        ("Public/Shared/script.lua", b"return 42".repeat(300)),
        ("readme.txt", b"hello".to_vec()),
    ];

    let mut writer = WriterV18::new(&pak);
    for (name, data) in &files {
        writer.add_file(name, data.clone(), true).unwrap();
    }
    writer.save().unwrap();

    let package = Package::read(&pak).unwrap();
    let names: Vec<_> = package.file_names();
    assert_eq!(names, files.iter().map(|(n, _)| (*n).to_string()).collect::<Vec<_>>());

    let out = dir.path().join("extracted");
    package.extract_all(&out).unwrap();
    for (name, data) in &files {
        assert_eq!(&std::fs::read(out.join(name)).unwrap(), data);
    }
}

#[test]
fn test_oversized_first_payload_stays_in_part_zero() {
    let dir = tempdir().unwrap();
    let pak = dir.path().join("oversized.pak");

    let big = noise(1500, 6);
    let small = noise(600, 7);

    let mut writer = WriterV13::new(&pak).with_max_part_size(1000);
    writer.add_file("big.bin", big.clone(), false).unwrap();
    writer.add_file("small.bin", small.clone(), false).unwrap();
    writer.save().unwrap();

    let package = Package::read(&pak).unwrap();
    assert_eq!(package.find("big.bin").unwrap().archive_part, 0);
    assert_eq!(package.find("small.bin").unwrap().archive_part, 1);
    assert_eq!(package.extract("big.bin").unwrap(), big);
    assert_eq!(package.extract("small.bin").unwrap(), small);
}

#[test]
fn test_unsupported_version_is_rejected() {
    let dir = tempdir().unwrap();
    let pak = dir.path().join("future.pak");

    let mut bytes = b"LSPK".to_vec();
    bytes.extend_from_slice(&99u32.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 64]);
    std::fs::write(&pak, &bytes).unwrap();

    match Package::read(&pak) {
        Err(Error::UnsupportedVersion { version: 99 }) => {}
        other => panic!("expected unsupported version, got {other:?}"),
    }
}

#[test]
fn test_garbage_is_not_an_archive() {
    let dir = tempdir().unwrap();
    let pak = dir.path().join("garbage.bin");
    std::fs::write(&pak, noise(256, 8)).unwrap();

    assert!(matches!(Package::read(&pak), Err(Error::InvalidSignature)));
}

#[test]
fn test_overlong_name_rejected_before_save() {
    let dir = tempdir().unwrap();
    let pak = dir.path().join("never.pak");

    let mut writer = WriterV18::new(&pak);
    let result = writer.add_file(&"n".repeat(300), b"data".to_vec(), false);
    assert!(matches!(result, Err(Error::NameTooLong { length: 300, .. })));

    // Nothing was written for the rejected name.
    assert!(!pak.exists());
}

#[test]
fn test_read_file_bytes_convenience() {
    let dir = tempdir().unwrap();
    let pak = dir.path().join("one.pak");

    let mut writer = WriterV18::new(&pak);
    writer.add_file("data.bin", b"payload".to_vec(), true).unwrap();
    writer.save().unwrap();

    assert_eq!(read_file_bytes(&pak, "data.bin").unwrap(), b"payload");
    assert!(matches!(
        read_file_bytes(&pak, "missing.bin"),
        Err(Error::FileNotFound(_))
    ));
}

#[test]
fn test_v9_legacy_archive_parses_with_inference() {
    let dir = tempdir().unwrap();
    let pak = dir.path().join("legacy.pak");

    let stored = b"stored payload".to_vec();
    let raw = b"compressible ".repeat(200);
    let compressed = lspk::compression::compress_block(&raw);

    const HEADER_SIZE: u32 = 21;
    const ENTRY_SIZE: u32 = 272;
    let data_offset = HEADER_SIZE + 2 * ENTRY_SIZE;

    let mut bytes = Vec::new();
    bytes.extend_from_slice(&9u32.to_le_bytes()); // version
    bytes.extend_from_slice(&data_offset.to_le_bytes());
    bytes.extend_from_slice(&1u32.to_le_bytes()); // num_parts
    bytes.extend_from_slice(&(2 * ENTRY_SIZE).to_le_bytes()); // file_list_size
    bytes.push(1); // little_endian
    bytes.extend_from_slice(&2u32.to_le_bytes()); // num_files

    let mut push_entry = |name: &str, offset: u32, size: u32, uncompressed: u32| {
        let start = bytes.len();
        bytes.extend_from_slice(name.as_bytes());
        bytes.resize(start + 256, 0);
        bytes.extend_from_slice(&offset.to_le_bytes());
        bytes.extend_from_slice(&size.to_le_bytes());
        bytes.extend_from_slice(&uncompressed.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes()); // archive_part
    };
    push_entry("plain.bin", data_offset, stored.len() as u32, 0);
    push_entry(
        "packed.bin",
        data_offset + stored.len() as u32,
        compressed.len() as u32,
        raw.len() as u32,
    );

    bytes.extend_from_slice(&stored);
    bytes.extend_from_slice(&compressed);
    std::fs::write(&pak, &bytes).unwrap();

    assert_eq!(
        detect_file(&pak),
        DetectionResult::Valid {
            version: 9,
            signature: lspk::pak::SignatureLocation::None,
        }
    );

    let package = Package::read(&pak).unwrap();
    assert_eq!(package.version, 9);

    let plain = package.find("plain.bin").unwrap();
    assert!(!plain.compressed());
    assert_eq!(package.extract("plain.bin").unwrap(), stored);

    let packed = package.find("packed.bin").unwrap();
    assert!(packed.compressed());
    assert_eq!(package.extract("packed.bin").unwrap(), raw);
}

#[test]
fn test_create_pak_from_directory() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("mod");
    std::fs::create_dir_all(source.join("Public/Game")).unwrap();
    std::fs::write(source.join("meta.lsx"), b"<save/>").unwrap();
    std::fs::write(source.join("Public/Game/rules.txt"), b"rule ".repeat(100)).unwrap();

    let pak = dir.path().join("mod.pak");
    lspk::pak::create_pak(&source, &pak).unwrap();

    let package = Package::read(&pak).unwrap();
    assert_eq!(package.version, 18);
    assert_eq!(package.extract("meta.lsx").unwrap(), b"<save/>");
    assert_eq!(
        package.extract("Public/Game/rules.txt").unwrap(),
        b"rule ".repeat(100)
    );
}
