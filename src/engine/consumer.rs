// Consumer - 固定数のワーカーでジョブを並列実行する

use super::producer::JobDispatcher;
use crate::core::{
    CounterSnapshot, IndexerError, IndexerResult, Job, JobOutcome, JobRunner, JobState,
    RunCounters,
};
use crate::services::config::{MAX_QUEUE_CAPACITY, MAX_WORKERS};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// 単一Consumerワーカー
///
/// ジョブは個別のタスクで実行し、パニックは `Failed` として扱って次のジョブへ進む。
pub fn spawn_single_consumer<R>(
    worker_id: usize,
    runner: Arc<R>,
    work_rx: Arc<Mutex<mpsc::Receiver<Job>>>,
    counters: Arc<RunCounters>,
) -> JoinHandle<()>
where
    R: JobRunner + ?Sized + 'static,
{
    tokio::spawn(async move {
        loop {
            // 次の作業を取得
            let job = {
                let mut rx = work_rx.lock().await;
                match rx.recv().await {
                    Some(job) => job,
                    None => break, // チャンネル終了
                }
            };

            let path = job.path.clone();
            debug!(worker_id, job_id = job.id, path = %path.display(), state = ?JobState::Running, "Running");

            let task_runner = Arc::clone(&runner);
            let outcome = match tokio::spawn(async move { task_runner.execute(job).await }).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    let e = IndexerError::task(e);
                    error!(worker_id, path = %path.display(), error = %e, "Job aborted");
                    JobOutcome::Failed {
                        path,
                        error: e.to_string(),
                    }
                }
            };

            debug!(worker_id, path = %outcome.path().display(), state = ?outcome.state(), "Job finished");
            counters.record_outcome(&outcome);
        }
        debug!(worker_id, "Worker finished");
    })
}

/// Consumers: 並列ワーカープール
pub fn spawn_consumers<R>(
    runner: Arc<R>,
    work_rx: mpsc::Receiver<Job>,
    counters: Arc<RunCounters>,
    worker_count: usize,
) -> Vec<JoinHandle<()>>
where
    R: JobRunner + ?Sized + 'static,
{
    let work_rx = Arc::new(Mutex::new(work_rx));

    (0..worker_count)
        .map(|worker_id| {
            spawn_single_consumer(
                worker_id,
                Arc::clone(&runner),
                Arc::clone(&work_rx),
                Arc::clone(&counters),
            )
        })
        .collect()
}

/// 有界キュー付きのワーカープール
///
/// 同時に実行されるジョブは最大 `worker_count` 件。
pub struct WorkerPool {
    dispatcher: JobDispatcher,
    handles: Vec<JoinHandle<()>>,
    counters: Arc<RunCounters>,
}

impl WorkerPool {
    pub fn start<R>(
        runner: Arc<R>,
        worker_count: usize,
        queue_capacity: usize,
        counters: Arc<RunCounters>,
    ) -> IndexerResult<Self>
    where
        R: JobRunner + ?Sized + 'static,
    {
        if worker_count == 0 {
            return Err(IndexerError::configuration(
                "ワーカー数は1以上である必要があります",
            ));
        }
        if queue_capacity == 0 {
            return Err(IndexerError::configuration(
                "キュー容量は1以上である必要があります",
            ));
        }
        if worker_count > MAX_WORKERS || queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(IndexerError::configuration(format!(
                "ワーカー数またはキュー容量が上限を超えています: {worker_count}, {queue_capacity}"
            )));
        }

        let (work_tx, work_rx) = mpsc::channel::<Job>(queue_capacity);
        let handles = spawn_consumers(runner, work_rx, Arc::clone(&counters), worker_count);
        debug!(worker_count, queue_capacity, "Worker pool started");

        Ok(Self {
            dispatcher: JobDispatcher::new(work_tx, Arc::clone(&counters)),
            handles,
            counters,
        })
    }

    pub fn dispatcher(&self) -> JobDispatcher {
        self.dispatcher.clone()
    }

    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// 投入を締め切り、キュー内と実行中のジョブが全て終わるまで待つ
    pub async fn shutdown(self) -> CounterSnapshot {
        self.dispatcher.close();

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Worker task failed");
            }
        }

        self.counters.snapshot()
    }
}
