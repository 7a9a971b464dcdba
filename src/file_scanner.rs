pub mod glob;

use crate::core::{IndexerError, IndexerResult};
use self::glob::GlobMatcher;
use std::path::Path;
use tracing::{debug, error};
use walkdir::WalkDir;

/// 1回の走査の統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub directories: usize,
    pub files: usize,
    pub matches: usize,
    pub errors: usize,
}

/// 深さ優先でディレクトリツリーを走査し、ファイル名がパターンに一致した
/// ノードごとにコールバックを呼ぶ
pub struct TreeWalker {
    matcher: GlobMatcher,
}

impl TreeWalker {
    pub fn new(matcher: GlobMatcher) -> Self {
        Self { matcher }
    }

    pub fn matcher(&self) -> &GlobMatcher {
        &self.matcher
    }

    /// `root` 以下を走査する
    ///
    /// ディレクトリは子より先に判定される。読めないノードはログに出して
    /// 走査を続ける。シンボリックリンクは辿らない。
    pub fn walk<F>(&self, root: &Path, mut on_match: F) -> IndexerResult<WalkStats>
    where
        F: FnMut(&Path),
    {
        let metadata = std::fs::metadata(root)
            .map_err(|e| IndexerError::traversal(root, e.to_string()))?;
        if !metadata.is_dir() {
            return Err(IndexerError::traversal(root, "ディレクトリではありません"));
        }

        let mut stats = WalkStats::default();

        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    stats.errors += 1;
                    let path = err.path().unwrap_or(root);
                    error!(path = %path.display(), error = %err, "Failed to visit");
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                stats.directories += 1;
            } else {
                stats.files += 1;
            }

            // "." のようにファイル名を持たないパスはマッチさせない
            if self.matcher.matches_file_name(entry.path()) {
                stats.matches += 1;
                debug!(path = %entry.path().display(), "Matched");
                on_match(entry.path());
            }
        }

        Ok(stats)
    }
}
