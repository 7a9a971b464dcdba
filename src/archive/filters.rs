// アーカイブとエントリの選別ルール

use crate::core::SkipReason;
use std::path::Path;

pub const DEFAULT_WHITELIST: [&str; 3] = [".java", ".xml", ".properties"];
pub const DEFAULT_TEST_SUFFIX: &str = "-test-sources.jar";
pub const DEFAULT_PRE_RELEASE_MARKER: &str = "snapshot";

/// アップロード対象とするエントリ名の接尾辞リスト（大文字小文字を区別しない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitelistRule {
    suffixes: Vec<String>,
}

impl WhitelistRule {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            suffixes: suffixes
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }

    pub fn matches(&self, entry_name: &str) -> bool {
        let lower = entry_name.to_lowercase();
        self.suffixes.iter().any(|suffix| lower.ends_with(suffix.as_str()))
    }
}

impl Default for WhitelistRule {
    fn default() -> Self {
        Self::new(DEFAULT_WHITELIST)
    }
}

/// アーカイブを開く前に適用するスキップ規則
///
/// 小文字化したフルパスが `test_suffix` で終わるか、`pre_release_marker` を
/// 含む場合にスキップする。空文字列のマーカーは無効扱い。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipPolicy {
    test_suffix: String,
    pre_release_marker: String,
}

impl SkipPolicy {
    pub fn new(test_suffix: impl AsRef<str>, pre_release_marker: impl AsRef<str>) -> Self {
        Self {
            test_suffix: test_suffix.as_ref().to_lowercase(),
            pre_release_marker: pre_release_marker.as_ref().to_lowercase(),
        }
    }

    pub fn check(&self, path: &Path) -> Option<SkipReason> {
        let lower = path.to_string_lossy().to_lowercase();

        if !self.test_suffix.is_empty() && lower.ends_with(&self.test_suffix) {
            Some(SkipReason::TestSources)
        } else if !self.pre_release_marker.is_empty() && lower.contains(&self.pre_release_marker)
        {
            Some(SkipReason::PreRelease)
        } else {
            None
        }
    }
}

impl Default for SkipPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TEST_SUFFIX, DEFAULT_PRE_RELEASE_MARKER)
    }
}
