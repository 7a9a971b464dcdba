// 設定管理の具象実装

use crate::archive::filters::{
    DEFAULT_PRE_RELEASE_MARKER, DEFAULT_TEST_SUFFIX, DEFAULT_WHITELIST,
};
use crate::archive::{SkipPolicy, WhitelistRule};
use crate::core::{IndexerError, IndexerResult};
use crate::sink::solr::DEFAULT_SOLR_URL;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PATTERN: &str = "*-sources.jar";
pub const DEFAULT_WORKERS: usize = 4;
pub const MAX_WORKERS: usize = 1024;
pub const MAX_QUEUE_CAPACITY: usize = 65_536;

/// インデクサーの実行設定
///
/// JSON設定ファイルでは省略したキーにデフォルト値が入る。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    pub pattern: String,
    pub workers: usize,
    /// 未指定なら `workers * 2`
    pub queue_capacity: Option<usize>,
    pub whitelist: Vec<String>,
    pub test_suffix: String,
    pub pre_release_marker: String,
    pub sink_url: String,
    /// 相対パスのルートを解決する基準ディレクトリ
    pub base_dir: Option<PathBuf>,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            workers: DEFAULT_WORKERS,
            queue_capacity: None,
            whitelist: DEFAULT_WHITELIST.iter().map(|s| s.to_string()).collect(),
            test_suffix: DEFAULT_TEST_SUFFIX.to_string(),
            pre_release_marker: DEFAULT_PRE_RELEASE_MARKER.to_string(),
            sink_url: DEFAULT_SOLR_URL.to_string(),
            base_dir: None,
        }
    }
}

impl IndexerConfig {
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("設定ファイルを読み込めません: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("設定ファイルの形式が不正です: {}", path.display()))
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    pub fn with_whitelist<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.whitelist = suffixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_skip_markers(
        mut self,
        test_suffix: impl Into<String>,
        pre_release_marker: impl Into<String>,
    ) -> Self {
        self.test_suffix = test_suffix.into();
        self.pre_release_marker = pre_release_marker.into();
        self
    }

    pub fn with_sink_url(mut self, url: impl Into<String>) -> Self {
        self.sink_url = url.into();
        self
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
            .unwrap_or_else(|| self.workers.saturating_mul(2))
    }

    pub fn whitelist_rule(&self) -> WhitelistRule {
        WhitelistRule::new(&self.whitelist)
    }

    pub fn skip_policy(&self) -> SkipPolicy {
        SkipPolicy::new(&self.test_suffix, &self.pre_release_marker)
    }

    /// 相対パスのルートを `base_dir` 基準に解決する
    pub fn resolve_root(&self, root: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if root.is_relative() => base.join(root),
            _ => root.to_path_buf(),
        }
    }

    pub fn validate(&self) -> IndexerResult<()> {
        if self.pattern.is_empty() {
            return Err(IndexerError::configuration("パターンが空です"));
        }
        if self.workers == 0 {
            return Err(IndexerError::configuration(
                "ワーカー数は1以上である必要があります",
            ));
        }
        if self.workers > MAX_WORKERS {
            return Err(IndexerError::configuration(format!(
                "ワーカー数は{MAX_WORKERS}以下である必要があります: {}",
                self.workers
            )));
        }
        let queue_capacity = self.queue_capacity();
        if queue_capacity == 0 {
            return Err(IndexerError::configuration(
                "キュー容量は1以上である必要があります",
            ));
        }
        if queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(IndexerError::configuration(format!(
                "キュー容量は{MAX_QUEUE_CAPACITY}以下である必要があります: {queue_capacity}"
            )));
        }
        if self.whitelist_rule().is_empty() {
            return Err(IndexerError::configuration("ホワイトリストが空です"));
        }
        if !(self.sink_url.starts_with("http://") || self.sink_url.starts_with("https://")) {
            return Err(IndexerError::configuration(format!(
                "シンクURLはhttp(s)である必要があります: {}",
                self.sink_url
            )));
        }
        Ok(())
    }
}
