// 統合テスト用のヘルパー
#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// テスト用jarを作成する。名前が `/` で終わるエントリはディレクトリになる
pub fn write_jar(path: &Path, entries: &[(&str, &str)]) {
    write_with(path, entries, SimpleFileOptions::default());
}

/// 無圧縮のjarを作成する
pub fn write_stored_jar(path: &Path, entries: &[(&str, &str)]) {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    write_with(path, entries, options);
}

/// ファイル中の `needle` の最初の出現位置の1バイトを反転する
pub fn flip_byte_in(path: &Path, needle: &str) {
    let mut bytes = fs::read(path).unwrap();
    let offset = bytes
        .windows(needle.len())
        .position(|window| window == needle.as_bytes())
        .unwrap();
    bytes[offset + needle.len() / 2] ^= 0xFF;
    fs::write(path, bytes).unwrap();
}

fn write_with(path: &Path, entries: &[(&str, &str)], options: SimpleFileOptions) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut writer = ZipWriter::new(File::create(path).unwrap());

    for (name, content) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
    }

    writer.finish().unwrap();
}

/// `lib/` に通常・テスト・スナップショットのソースjarを並べたリポジトリ
pub struct SampleRepository {
    pub dir: TempDir,
    pub regular: PathBuf,
    pub test_sources: PathBuf,
    pub snapshot: PathBuf,
}

impl SampleRepository {
    pub fn create() -> Self {
        let dir = TempDir::new().unwrap();
        let lib = dir.path().join("lib");

        let regular = lib.join("a-sources.jar");
        write_jar(
            &regular,
            &[
                ("com/", ""),
                ("com/example/", ""),
                ("com/example/A.java", "package com.example; class A {}"),
                ("com/example/A.class", "\u{1}\u{2}"),
                ("META-INF/maven/pom.xml", "<project/>"),
            ],
        );

        let test_sources = lib.join("a-test-sources.jar");
        write_jar(&test_sources, &[("ATest.java", "class ATest {}")]);

        let snapshot = lib.join("b-1.0-SNAPSHOT-sources.jar");
        write_jar(&snapshot, &[("B.java", "class B {}")]);

        Self {
            dir,
            regular,
            test_sources,
            snapshot,
        }
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }
}
