// インデクシング処理に関連するデータ型定義

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// ワーカープールに投入される1件の作業
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// ディスパッチャが採番する連番
    pub id: u64,
    /// マッチしたアーカイブのパス
    pub path: PathBuf,
}

impl Job {
    pub fn new(id: u64, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            path: path.into(),
        }
    }
}

/// ジョブのライフサイクル
///
/// `Queued -> Running -> {Completed, Skipped, Failed}`。終端状態からの遷移はない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobState {
    Queued,
    Running,
    Completed,
    Skipped,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Skipped | Self::Failed)
    }
}

/// アーカイブを開かずにスキップした理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// テスト用ソースアーカイブ
    TestSources,
    /// プレリリース版（スナップショット）
    PreRelease,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TestSources => write!(f, "test sources"),
            Self::PreRelease => write!(f, "pre-release"),
        }
    }
}

/// 1アーカイブ分のエントリ処理統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ArchiveStats {
    pub entries: usize,
    pub directories: usize,
    pub not_whitelisted: usize,
    pub uploaded: usize,
    pub upload_failures: usize,
}

/// ジョブの終端結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed { path: PathBuf, stats: ArchiveStats },
    Skipped { path: PathBuf, reason: SkipReason },
    Failed { path: PathBuf, error: String },
}

impl JobOutcome {
    pub fn state(&self) -> JobState {
        match self {
            Self::Completed { .. } => JobState::Completed,
            Self::Skipped { .. } => JobState::Skipped,
            Self::Failed { .. } => JobState::Failed,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Completed { path, .. } | Self::Skipped { path, .. } | Self::Failed { path, .. } => {
                path
            }
        }
    }
}

/// シンクに渡すドキュメント
///
/// 識別子は `アーカイブパス:エントリ名`。重複排除はシンク側の責務。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    pub id: String,
    pub content: String,
}

impl UploadRecord {
    pub fn new(archive_path: &Path, entry_name: &str, content: String) -> Self {
        Self {
            id: format!("{}:{}", archive_path.display(), entry_name),
            content,
        }
    }
}

/// ワーカー間で共有されるカウンター
///
/// 集計表示専用。制御フローには使わない。
#[derive(Debug, Default)]
pub struct RunCounters {
    matched: AtomicUsize,
    completed: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
    documents_uploaded: AtomicUsize,
    upload_failures: AtomicUsize,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_match(&self) {
        self.matched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_outcome(&self, outcome: &JobOutcome) {
        let counter = match outcome.state() {
            JobState::Completed => &self.completed,
            JobState::Skipped => &self.skipped,
            _ => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// アップロード成功を記録し、通算の件数を返す
    pub fn record_upload(&self) -> usize {
        self.documents_uploaded.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_upload_failure(&self) {
        self.upload_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            matched: self.matched.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            documents_uploaded: self.documents_uploaded.load(Ordering::Relaxed),
            upload_failures: self.upload_failures.load(Ordering::Relaxed),
        }
    }
}

/// カウンターのある時点の値
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub matched: usize,
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub documents_uploaded: usize,
    pub upload_failures: usize,
}

impl CounterSnapshot {
    /// 終端状態に達したジョブ数
    pub fn finished_jobs(&self) -> usize {
        self.completed + self.skipped + self.failed
    }
}

/// 実行全体のサマリー
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanSummary {
    pub started_at: DateTime<Utc>,
    pub roots_scanned: usize,
    pub roots_failed: usize,
    pub walk_errors: usize,
    pub counters: CounterSnapshot,
    pub elapsed_ms: u64,
}
