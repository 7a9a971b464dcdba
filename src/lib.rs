// ソースjarインデクサー
//
// ディレクトリツリーからglobに一致するアーカイブを探し、
// 有界のワーカープールで展開して検索インデックスへ送る。

pub mod archive;
pub mod cli;
pub mod core;
pub mod engine;
pub mod file_scanner;
pub mod logging;
pub mod services;
pub mod sink;

pub use crate::core::{IndexerError, IndexerResult, JobOutcome, ScanSummary};
pub use engine::{IndexingPipeline, JobDispatcher, WorkerPool};
pub use file_scanner::glob::GlobMatcher;
pub use file_scanner::TreeWalker;
pub use services::config::IndexerConfig;
pub use services::processing::ArchiveJob;
pub use sink::{LogSink, MemorySink, Sink, SolrSink, UpsertStatus};
