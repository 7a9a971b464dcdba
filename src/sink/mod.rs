use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use std::sync::Arc;

pub mod dry_run;
pub mod memory;
pub mod solr;

pub use dry_run::LogSink;
pub use memory::MemorySink;
pub use solr::SolrSink;

/// upsertの応答ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertStatus {
    /// シンクが受理したかどうか
    pub ok: bool,
    /// シンク固有のステータスコード（Solrなら `responseHeader.status`）
    pub code: i32,
}

impl UpsertStatus {
    pub fn accepted() -> Self {
        Self { ok: true, code: 0 }
    }

    pub fn rejected(code: i32) -> Self {
        Self { ok: false, code }
    }
}

/// ドキュメントの送信先（検索インデックス等）のトレイト
///
/// 通信エラーやサーバーエラーは `Err` で返す。リトライはしない。
#[automock]
#[async_trait]
pub trait Sink: Send + Sync {
    /// `id` のドキュメントを `content` で登録・更新する
    async fn upsert(&self, id: &str, content: &str) -> Result<UpsertStatus>;
}

// Sink for Box<dyn Sink>
#[async_trait]
impl Sink for Box<dyn Sink> {
    async fn upsert(&self, id: &str, content: &str) -> Result<UpsertStatus> {
        self.as_ref().upsert(id, content).await
    }
}

// 呼び出し側が結果を参照できるよう Arc 越しにも使えるようにする
#[async_trait]
impl<T> Sink for Arc<T>
where
    T: Sink + ?Sized,
{
    async fn upsert(&self, id: &str, content: &str) -> Result<UpsertStatus> {
        self.as_ref().upsert(id, content).await
    }
}
