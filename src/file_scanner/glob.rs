// ファイル名用のglobマッチャー
// パスの最終要素（ファイル名）だけを対象にし、フルパスには適用しない

use crate::core::{IndexerError, IndexerResult};
use globset::GlobBuilder;
use std::ffi::OsStr;
use std::path::Path;

/// コンパイル済みのglobパターン
///
/// `*` は区切り文字をまたがない任意の文字列、`?` は任意の1文字にマッチする。
/// 大文字小文字は区別する。
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    pattern: String,
    matcher: globset::GlobMatcher,
}

impl GlobMatcher {
    /// パターンをコンパイルする。構文エラーは `InvalidPattern` になる
    pub fn compile(pattern: &str) -> IndexerResult<Self> {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .backslash_escape(true)
            .build()
            .map_err(|source| IndexerError::invalid_pattern(pattern, source))?;

        Ok(Self {
            pattern: pattern.to_string(),
            matcher: glob.compile_matcher(),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// ファイル名1要素に対する判定
    pub fn matches(&self, name: &str) -> bool {
        self.matches_os(OsStr::new(name))
    }

    pub fn matches_os(&self, name: &OsStr) -> bool {
        !name.is_empty() && self.matcher.is_match(Path::new(name))
    }

    /// パスの最終要素に対する判定。ファイル名を持たないパスはマッチしない
    pub fn matches_file_name(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| self.matches_os(name))
            .unwrap_or(false)
    }
}
