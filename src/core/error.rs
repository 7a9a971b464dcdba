// インデクサー固有のカスタムエラー型定義
// パターン・走査・アーカイブ・シンクの各段階ごとにエラーを分類する

use std::path::{Path, PathBuf};
use thiserror::Error;

/// インデクシング処理固有のエラー型
#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("不正なglobパターン: '{pattern}' - {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("走査エラー: {} - {reason}", path.display())]
    Traversal { path: PathBuf, reason: String },

    #[error("アーカイブオープンエラー: {} - {source}", path.display())]
    ArchiveOpen {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("アーカイブ読み込みエラー: {} - {source}", path.display())]
    ArchiveRead {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("シンク送信エラー: {id} - {source}")]
    Sink {
        id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("設定エラー: {message}")]
    Configuration { message: String },

    #[error("ディスパッチャは停止済みです: {}", path.display())]
    DispatcherClosed { path: PathBuf },

    #[error("タスクエラー: {source}")]
    Task {
        #[source]
        source: tokio::task::JoinError,
    },
}

impl IndexerError {
    /// globパターンエラーの作成
    pub fn invalid_pattern(pattern: impl Into<String>, source: globset::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// 走査エラーの作成
    pub fn traversal(path: &Path, reason: impl Into<String>) -> Self {
        Self::Traversal {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// アーカイブオープンエラーの作成
    pub fn archive_open(path: &Path, source: impl Into<anyhow::Error>) -> Self {
        Self::ArchiveOpen {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }

    /// アーカイブ読み込みエラーの作成
    pub fn archive_read(path: &Path, source: impl Into<anyhow::Error>) -> Self {
        Self::ArchiveRead {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }

    /// シンク送信エラーの作成
    pub fn sink(id: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Sink {
            id: id.into(),
            source,
        }
    }

    /// 設定エラーの作成
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// ディスパッチャ停止エラーの作成
    pub fn dispatcher_closed(path: &Path) -> Self {
        Self::DispatcherClosed {
            path: path.to_path_buf(),
        }
    }

    /// タスクエラーの作成
    pub fn task(source: tokio::task::JoinError) -> Self {
        Self::Task { source }
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidPattern { .. } | Self::Configuration { .. } => ErrorSeverity::Critical,
            Self::Traversal { .. } | Self::DispatcherClosed { .. } => ErrorSeverity::High,
            Self::ArchiveOpen { .. } | Self::ArchiveRead { .. } | Self::Task { .. } => {
                ErrorSeverity::Medium
            }
            Self::Sink { .. } => ErrorSeverity::Low,
        }
    }
}

/// エラーの重要度レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// エントリ単位 - ログ出力のみ
    Low,
    /// ジョブ単位
    Medium,
    /// ルート単位
    High,
    /// 起動不能
    Critical,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// インデクシング処理の結果型
pub type IndexerResult<T> = std::result::Result<T, IndexerError>;

impl From<tokio::task::JoinError> for IndexerError {
    fn from(error: tokio::task::JoinError) -> Self {
        IndexerError::Task { source: error }
    }
}
