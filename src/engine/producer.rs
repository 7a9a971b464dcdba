// Producer - マッチしたパスをジョブとしてワーカーへ配信する

use crate::core::{IndexerError, IndexerResult, Job, JobState, RunCounters};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

/// ワーカープールへの投入口
///
/// キューが満杯の間 `accept` は呼び出し元スレッドをブロックする。
/// `close` 後の投入は `DispatcherClosed` になる。
#[derive(Debug, Clone)]
pub struct JobDispatcher {
    work_tx: Arc<RwLock<Option<mpsc::Sender<Job>>>>,
    next_id: Arc<AtomicU64>,
    counters: Arc<RunCounters>,
}

impl JobDispatcher {
    pub(crate) fn new(work_tx: mpsc::Sender<Job>, counters: Arc<RunCounters>) -> Self {
        Self {
            work_tx: Arc::new(RwLock::new(Some(work_tx))),
            next_id: Arc::new(AtomicU64::new(1)),
            counters,
        }
    }

    /// 同期コンテキスト（走査スレッド）からの投入
    ///
    /// 非同期ランタイムのワーカースレッド上で呼んではならない。
    pub fn accept(&self, path: &Path) -> IndexerResult<u64> {
        let sender = self.sender(path)?;
        let job = self.next_job(path);
        let id = job.id;

        match sender.try_send(job) {
            Ok(()) => {}
            Err(TrySendError::Full(job)) => {
                debug!(path = %path.display(), "Worker backlog full");
                sender
                    .blocking_send(job)
                    .map_err(|_| IndexerError::dispatcher_closed(path))?;
            }
            Err(TrySendError::Closed(_)) => return Err(IndexerError::dispatcher_closed(path)),
        }

        self.queued(id, path);
        Ok(id)
    }

    /// 非同期コンテキストからの投入
    pub async fn submit(&self, path: &Path) -> IndexerResult<u64> {
        let sender = self.sender(path)?;
        let job = self.next_job(path);
        let id = job.id;

        sender
            .send(job)
            .await
            .map_err(|_| IndexerError::dispatcher_closed(path))?;

        self.queued(id, path);
        Ok(id)
    }

    /// 以降の投入を拒否する。投入済みのジョブはワーカーが処理し切る
    pub fn close(&self) {
        self.work_tx
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn is_closed(&self) -> bool {
        self.work_tx
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn sender(&self, path: &Path) -> IndexerResult<mpsc::Sender<Job>> {
        self.work_tx
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| IndexerError::dispatcher_closed(path))
    }

    fn next_job(&self, path: &Path) -> Job {
        Job::new(self.next_id.fetch_add(1, Ordering::Relaxed), path)
    }

    fn queued(&self, id: u64, path: &Path) {
        self.counters.record_match();
        debug!(job_id = id, path = %path.display(), state = ?JobState::Queued, "Queued");
    }
}
