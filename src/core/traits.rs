// ワーカープールが依存する抽象化インターフェース

use super::types::{Job, JobOutcome};
use async_trait::async_trait;
use mockall::automock;

/// ワーカーが1件のジョブを実行するためのトレイト
///
/// 失敗は戻り値の `JobOutcome::Failed` で表し、呼び出し側には伝播させない。
#[automock]
#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn execute(&self, job: Job) -> JobOutcome;
}
