// Pipeline - 走査(Producer)とワーカープール(Consumer)を組み合わせる

use super::consumer::WorkerPool;
use super::producer::JobDispatcher;
use crate::core::{IndexerResult, RunCounters, ScanSummary};
use crate::file_scanner::glob::GlobMatcher;
use crate::file_scanner::TreeWalker;
use crate::services::config::IndexerConfig;
use crate::services::processing::ArchiveJob;
use crate::sink::Sink;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// ルート単位の走査結果
#[derive(Debug, Default)]
struct WalkReport {
    roots_scanned: usize,
    roots_failed: usize,
    walk_errors: usize,
}

/// ツリー走査 → ジョブ投入 → アーカイブ処理 のパイプライン
pub struct IndexingPipeline<S: ?Sized> {
    config: IndexerConfig,
    matcher: GlobMatcher,
    sink: Arc<S>,
}

impl<S> IndexingPipeline<S>
where
    S: Sink + ?Sized + 'static,
{
    /// 設定を検証し、パターンをコンパイルしてパイプラインを作成
    pub fn new(config: IndexerConfig, sink: Arc<S>) -> IndexerResult<Self> {
        config.validate()?;
        let matcher = GlobMatcher::compile(&config.pattern)?;

        Ok(Self {
            config,
            matcher,
            sink,
        })
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// 全ルートを走査し、マッチしたアーカイブを全て処理し終えるまで待つ
    pub async fn run(&self, roots: &[PathBuf]) -> IndexerResult<ScanSummary> {
        let started_at = Utc::now();
        let start_time = Instant::now();

        let counters = Arc::new(RunCounters::new());
        let job = Arc::new(ArchiveJob::from_config(
            &self.config,
            Arc::clone(&self.sink),
            Arc::clone(&counters),
        ));
        let pool = WorkerPool::start(
            job,
            self.config.workers,
            self.config.queue_capacity(),
            Arc::clone(&counters),
        )?;

        // 走査は専用スレッドで行い、キューが満杯の間はそこでブロックする
        let walker = TreeWalker::new(self.matcher.clone());
        let dispatcher = pool.dispatcher();
        let resolved: Vec<PathBuf> = roots
            .iter()
            .map(|root| self.config.resolve_root(root))
            .collect();
        let walk_handle =
            tokio::task::spawn_blocking(move || walk_roots(&walker, &resolved, &dispatcher));

        // 走査の成否に関わらずプールは必ず停止させる
        let walk_result = walk_handle.await;
        let snapshot = pool.shutdown().await;
        let report = walk_result?;

        Ok(ScanSummary {
            started_at,
            roots_scanned: report.roots_scanned,
            roots_failed: report.roots_failed,
            walk_errors: report.walk_errors,
            counters: snapshot,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        })
    }
}

fn walk_roots(walker: &TreeWalker, roots: &[PathBuf], dispatcher: &JobDispatcher) -> WalkReport {
    let mut report = WalkReport::default();

    for root in roots {
        info!(
            pattern = walker.matcher().pattern(),
            "Searching file tree '{}'...",
            root.display()
        );

        let result = walker.walk(root, |path| {
            if let Err(e) = dispatcher.accept(path) {
                error!(path = %path.display(), error = %e, "Failed to dispatch");
            }
        });

        match result {
            Ok(stats) => {
                report.roots_scanned += 1;
                report.walk_errors += stats.errors;
                info!(
                    root = %root.display(),
                    directories = stats.directories,
                    files = stats.files,
                    matches = stats.matches,
                    errors = stats.errors,
                    "Finished searching"
                );
            }
            Err(e) => {
                report.roots_failed += 1;
                error!(root = %root.display(), error = %e, "Failed to search file tree");
            }
        }
    }

    report
}
