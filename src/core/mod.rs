// コアレイヤー - 基盤となるトレイト、型、エラー定義
// 他のレイヤーから参照される基本的な抽象化を提供

pub mod error;
pub mod traits;
pub mod types;

pub use error::{ErrorSeverity, IndexerError, IndexerResult};
pub use traits::JobRunner;
pub use types::{
    ArchiveStats, CounterSnapshot, Job, JobOutcome, JobState, RunCounters, ScanSummary,
    SkipReason, UploadRecord,
};
