// ドライラン用シンク - 送信せずにログへ出すだけ

use super::{Sink, UpsertStatus};
use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

#[derive(Debug, Default, Clone)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Sink for LogSink {
    async fn upsert(&self, id: &str, content: &str) -> Result<UpsertStatus> {
        info!(id, bytes = content.len(), "Dry run, not uploading");
        Ok(UpsertStatus::accepted())
    }
}
