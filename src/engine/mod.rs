// エンジン層 - 並列処理とオーケストレーション
// サービス層を組み合わせて高レベルな処理を提供

pub mod consumer;
pub mod pipeline;
pub mod producer;

// 公開API
pub use consumer::WorkerPool;
pub use pipeline::IndexingPipeline;
pub use producer::JobDispatcher;
