// アーカイブ層 - jar/zipのエントリ列挙と読み込み
// エントリのストリームは読み込み関数のスコープ内で必ず解放される

pub mod filters;

use crate::core::{IndexerError, IndexerResult};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

pub use filters::{SkipPolicy, WhitelistRule};

/// アーカイブ内の1エントリ
///
/// `content` は読み込み対象と判定されたファイルエントリのみ `Some`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub is_directory: bool,
    pub content: Option<Vec<u8>>,
}

/// 開いたアーカイブ
pub struct ArchiveReader {
    path: PathBuf,
    archive: ZipArchive<BufReader<File>>,
}

impl ArchiveReader {
    /// アーカイブを開く。開けない場合は `ArchiveOpen`
    pub fn open(path: &Path) -> IndexerResult<Self> {
        let file = File::open(path).map_err(|e| IndexerError::archive_open(path, e))?;
        let archive = ZipArchive::new(BufReader::new(file))
            .map_err(|e| IndexerError::archive_open(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            archive,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// エントリ数
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `index` 番目のエントリを読む
    ///
    /// ディレクトリでなく `wants_content` が真を返したエントリだけ中身を全て読み込む。
    /// 読み込みに失敗した場合はアーカイブ自体が壊れているとみなし `ArchiveRead` を返す。
    pub fn read_entry<F>(&mut self, index: usize, wants_content: F) -> IndexerResult<ArchiveEntry>
    where
        F: FnOnce(&str) -> bool,
    {
        let mut file = self
            .archive
            .by_index(index)
            .map_err(|e| IndexerError::archive_read(&self.path, e))?;

        let name = file.name().to_string();
        let is_directory = file.is_dir();

        let content = if !is_directory && wants_content(&name) {
            let mut buffer = Vec::with_capacity(file.size().min(16 * 1024 * 1024) as usize);
            file.read_to_end(&mut buffer)
                .map_err(|e| IndexerError::archive_read(&self.path, e))?;
            Some(buffer)
        } else {
            None
        };

        // file はここでドロップされる。クローズ時の失敗は zip 側で握りつぶされる
        Ok(ArchiveEntry {
            name,
            is_directory,
            content,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::write_jar;
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_entries_in_container_order() {
        let temp_dir = tempdir().unwrap();
        let jar = temp_dir.path().join("a-sources.jar");
        write_jar(
            &jar,
            &[
                ("com/", ""),
                ("com/A.java", "class A {}"),
                ("com/B.class", "\u{cafe}"),
            ],
        );

        let mut reader = ArchiveReader::open(&jar).unwrap();
        assert_eq!(reader.len(), 3);
        assert!(!reader.is_empty());

        let dir = reader.read_entry(0, |_| true).unwrap();
        assert_eq!(dir.name, "com/");
        assert!(dir.is_directory);
        assert!(dir.content.is_none());

        let source = reader.read_entry(1, |name| name.ends_with(".java")).unwrap();
        assert_eq!(source.name, "com/A.java");
        assert_eq!(source.content.as_deref(), Some("class A {}".as_bytes()));

        let class = reader.read_entry(2, |name| name.ends_with(".java")).unwrap();
        assert_eq!(class.name, "com/B.class");
        assert!(class.content.is_none());
    }

    #[test]
    fn test_open_missing_file() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("missing-sources.jar");

        let result = ArchiveReader::open(&missing);

        match result {
            Err(IndexerError::ArchiveOpen { path, .. }) => assert_eq!(path, missing),
            Err(other) => panic!("Expected ArchiveOpen, got {other:?}"),
            Ok(_) => panic!("Expected ArchiveOpen error"),
        }
    }

    #[test]
    fn test_open_non_archive() {
        let temp_dir = tempdir().unwrap();
        let bogus = temp_dir.path().join("bogus-sources.jar");
        std::fs::write(&bogus, b"this is not a zip file").unwrap();

        let result = ArchiveReader::open(&bogus);

        assert!(matches!(result, Err(IndexerError::ArchiveOpen { .. })));
    }

    #[test]
    fn test_read_entry_out_of_range() {
        let temp_dir = tempdir().unwrap();
        let jar = temp_dir.path().join("one-sources.jar");
        write_jar(&jar, &[("A.java", "class A {}")]);

        let mut reader = ArchiveReader::open(&jar).unwrap();
        let result = reader.read_entry(5, |_| true);

        assert!(matches!(result, Err(IndexerError::ArchiveRead { .. })));
    }
}
