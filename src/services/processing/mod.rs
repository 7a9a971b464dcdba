// アーカイブ処理機能
// 1つのjarを開き、対象エントリをシンクへ転送する

pub mod archive_job;

// 公開API
pub use archive_job::ArchiveJob;
