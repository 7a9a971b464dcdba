// メモリ内シンク実装（テスト・ドライラン用）

use super::{Sink, UpsertStatus};
use crate::core::UploadRecord;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// 受け取ったドキュメントを到着順に保持するシンク
///
/// `failing_on` で指定したIDは保存せずエラーを返す。
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<UploadRecord>>,
    failing_ids: HashSet<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            records: Mutex::new(Vec::new()),
            failing_ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn records(&self) -> Vec<UploadRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn ids(&self) -> Vec<String> {
        self.records().into_iter().map(|record| record.id).collect()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Sink for MemorySink {
    async fn upsert(&self, id: &str, content: &str) -> Result<UpsertStatus> {
        if self.failing_ids.contains(id) {
            anyhow::bail!("メモリシンクへの書き込みを拒否しました: {id}");
        }

        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(UploadRecord {
                id: id.to_string(),
                content: content.to_string(),
            });
        Ok(UpsertStatus::accepted())
    }
}
