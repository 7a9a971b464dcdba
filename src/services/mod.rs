// サービス層 - 機能別のビジネスロジック

pub mod config;
pub mod processing;

// 公開API
pub use config::IndexerConfig;
pub use processing::ArchiveJob;
