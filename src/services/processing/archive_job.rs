// ArchiveJob - 単一アーカイブの展開とアップロード

use crate::archive::{ArchiveReader, SkipPolicy, WhitelistRule};
use crate::core::{
    ArchiveStats, IndexerError, IndexerResult, Job, JobOutcome, JobRunner, RunCounters,
    UploadRecord,
};
use crate::services::config::IndexerConfig;
use crate::sink::Sink;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, trace, warn};

/// 読み込みスレッドからシンク側へ渡す1件分。`ack` はシンクの応答後に送り返す
type PendingUpload = (UploadRecord, oneshot::Sender<()>);

/// マッチしたアーカイブ1件に対する処理
pub struct ArchiveJob<S: ?Sized> {
    sink: Arc<S>,
    whitelist: WhitelistRule,
    skip_policy: SkipPolicy,
    counters: Arc<RunCounters>,
}

impl<S> ArchiveJob<S>
where
    S: Sink + ?Sized + 'static,
{
    pub fn new(
        sink: Arc<S>,
        whitelist: WhitelistRule,
        skip_policy: SkipPolicy,
        counters: Arc<RunCounters>,
    ) -> Self {
        Self {
            sink,
            whitelist,
            skip_policy,
            counters,
        }
    }

    pub fn from_config(config: &IndexerConfig, sink: Arc<S>, counters: Arc<RunCounters>) -> Self {
        Self::new(sink, config.whitelist_rule(), config.skip_policy(), counters)
    }

    /// アーカイブを処理し、終端状態を返す
    pub async fn run(&self, path: &Path) -> JobOutcome {
        if let Some(reason) = self.skip_policy.check(path) {
            info!(path = %path.display(), %reason, "Skipping");
            return JobOutcome::Skipped {
                path: path.to_path_buf(),
                reason,
            };
        }

        info!(path = %path.display(), "Extracting");

        match self.extract_and_upload(path).await {
            Ok(stats) => JobOutcome::Completed {
                path: path.to_path_buf(),
                stats,
            },
            Err(e) => {
                error!(path = %path.display(), error = %e, severity = e.severity().as_str(), "Job failed");
                JobOutcome::Failed {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                }
            }
        }
    }

    async fn extract_and_upload(&self, path: &Path) -> IndexerResult<ArchiveStats> {
        // 容量1 + ack で、読み込み側はシンクの応答を待ってから次のエントリへ進む
        let (upload_tx, mut upload_rx) = mpsc::channel::<PendingUpload>(1);
        let whitelist = self.whitelist.clone();
        let archive_path = path.to_path_buf();

        let reader = tokio::task::spawn_blocking(move || {
            read_archive(&archive_path, &whitelist, upload_tx)
        });

        let mut uploaded = 0;
        let mut upload_failures = 0;
        while let Some((record, ack)) = upload_rx.recv().await {
            if self.forward(&record).await {
                uploaded += 1;
            } else {
                upload_failures += 1;
            }
            let _ = ack.send(());
        }

        let mut stats = reader.await??;
        stats.uploaded = uploaded;
        stats.upload_failures = upload_failures;
        Ok(stats)
    }

    /// 1件をシンクへ送る。失敗はログに残し、呼び出し側は次のエントリへ進む
    async fn forward(&self, record: &UploadRecord) -> bool {
        info!(id = %record.id, "Processing");

        match self.sink.upsert(&record.id, &record.content).await {
            Ok(status) if status.ok => {
                info!(id = %record.id, code = status.code, "Completed with status");
                let total = self.counters.record_upload();
                info!("Uploaded document #{total}");
                true
            }
            Ok(status) => {
                warn!(id = %record.id, code = status.code, "Sink rejected document");
                self.counters.record_upload_failure();
                false
            }
            Err(e) => {
                let e = IndexerError::sink(&record.id, e);
                error!(id = %record.id, error = %e, severity = e.severity().as_str(), "Failed to upload");
                self.counters.record_upload_failure();
                false
            }
        }
    }
}

/// ブロッキングスレッド側: エントリをコンテナ順に読み、対象をシンク側へ送る
fn read_archive(
    path: &Path,
    whitelist: &WhitelistRule,
    upload_tx: mpsc::Sender<PendingUpload>,
) -> IndexerResult<ArchiveStats> {
    let mut reader = ArchiveReader::open(path)?;
    let mut stats = ArchiveStats::default();

    for index in 0..reader.len() {
        let entry = reader.read_entry(index, |name| whitelist.matches(name))?;
        stats.entries += 1;

        if entry.is_directory {
            trace!(entry = %entry.name, "Skipping dirs");
            stats.directories += 1;
            continue;
        }

        let Some(bytes) = entry.content else {
            trace!(entry = %entry.name, "Skipping non-whitelisted");
            stats.not_whitelisted += 1;
            continue;
        };

        let content = String::from_utf8_lossy(&bytes).into_owned();
        let record = UploadRecord::new(path, &entry.name, content);
        let (ack_tx, ack_rx) = oneshot::channel();

        if upload_tx.blocking_send((record, ack_tx)).is_err() {
            break;
        }
        // シンクの応答待ち
        let _ = ack_rx.blocking_recv();
    }

    Ok(stats)
}

#[async_trait]
impl<S> JobRunner for ArchiveJob<S>
where
    S: Sink + ?Sized + 'static,
{
    async fn execute(&self, job: Job) -> JobOutcome {
        self.run(&job.path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::test_support::{write_jar, write_stored_jar};
    use crate::core::{JobState, SkipReason};
    use crate::sink::{MemorySink, MockSink, UpsertStatus};
    use mockall::predicate::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn job_with<S: Sink + 'static>(sink: Arc<S>) -> (ArchiveJob<S>, Arc<RunCounters>) {
        let counters = Arc::new(RunCounters::new());
        let job = ArchiveJob::new(
            sink,
            WhitelistRule::default(),
            SkipPolicy::default(),
            Arc::clone(&counters),
        );
        (job, counters)
    }

    #[tokio::test]
    async fn test_forwards_only_whitelisted_entries() {
        let temp_dir = tempdir().unwrap();
        let jar = temp_dir.path().join("lib-sources.jar");
        write_jar(
            &jar,
            &[
                ("a.java", "class A {}"),
                ("b.class", "binary"),
                ("c.xml", "<c/>"),
            ],
        );
        let sink = Arc::new(MemorySink::new());
        let (job, counters) = job_with(Arc::clone(&sink));

        let outcome = job.run(&jar).await;

        let expected_ids = vec![
            format!("{}:a.java", jar.display()),
            format!("{}:c.xml", jar.display()),
        ];
        assert_eq!(sink.ids(), expected_ids);
        assert_eq!(sink.records()[0].content, "class A {}");
        assert_eq!(
            outcome,
            JobOutcome::Completed {
                path: jar.clone(),
                stats: ArchiveStats {
                    entries: 3,
                    directories: 0,
                    not_whitelisted: 1,
                    uploaded: 2,
                    upload_failures: 0,
                },
            }
        );
        assert_eq!(counters.snapshot().documents_uploaded, 2);
    }

    #[tokio::test]
    async fn test_directories_are_not_forwarded() {
        let temp_dir = tempdir().unwrap();
        let jar = temp_dir.path().join("nested-sources.jar");
        write_jar(&jar, &[("com/", ""), ("com/example/", ""), ("com/example/A.java", "A")]);
        let sink = Arc::new(MemorySink::new());
        let (job, _) = job_with(Arc::clone(&sink));

        let outcome = job.run(&jar).await;

        assert_eq!(sink.ids(), vec![format!("{}:com/example/A.java", jar.display())]);
        match outcome {
            JobOutcome::Completed { stats, .. } => assert_eq!(stats.directories, 2),
            other => panic!("Expected Completed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_sink_failure_continues_with_next_entry() {
        let temp_dir = tempdir().unwrap();
        let jar = temp_dir.path().join("flaky-sources.jar");
        write_jar(
            &jar,
            &[("A.java", "A"), ("B.java", "B"), ("C.java", "C")],
        );
        let failing_id = format!("{}:A.java", jar.display());
        let sink = Arc::new(MemorySink::failing_on([failing_id]));
        let (job, counters) = job_with(Arc::clone(&sink));

        let outcome = job.run(&jar).await;

        assert_eq!(outcome.state(), JobState::Completed);
        assert_eq!(
            sink.ids(),
            vec![
                format!("{}:B.java", jar.display()),
                format!("{}:C.java", jar.display()),
            ]
        );
        let snapshot = counters.snapshot();
        assert_eq!(snapshot.documents_uploaded, 2);
        assert_eq!(snapshot.upload_failures, 1);
    }

    #[tokio::test]
    async fn test_rejected_status_counts_as_failure() {
        let temp_dir = tempdir().unwrap();
        let jar = temp_dir.path().join("rejected-sources.jar");
        write_jar(&jar, &[("A.java", "A"), ("B.java", "B")]);

        let mut mock = MockSink::new();
        mock.expect_upsert()
            .with(eq(format!("{}:A.java", jar.display())), eq("A"))
            .times(1)
            .returning(|_, _| Ok(UpsertStatus::rejected(400)));
        mock.expect_upsert()
            .with(eq(format!("{}:B.java", jar.display())), eq("B"))
            .times(1)
            .returning(|_, _| Ok(UpsertStatus::accepted()));
        let (job, counters) = job_with(Arc::new(mock));

        let outcome = job.run(&jar).await;

        match outcome {
            JobOutcome::Completed { stats, .. } => {
                assert_eq!(stats.uploaded, 1);
                assert_eq!(stats.upload_failures, 1);
            }
            other => panic!("Expected Completed, got {other:?}"),
        }
        assert_eq!(counters.snapshot().upload_failures, 1);
    }

    #[tokio::test]
    async fn test_test_sources_are_skipped_without_opening() {
        let mut mock = MockSink::new();
        mock.expect_upsert().never();
        let (job, _) = job_with(Arc::new(mock));

        // 存在しないファイルでも開かずにスキップされる
        let path = Path::new("/repo/lib/a-test-sources.jar");
        let outcome = job.run(path).await;

        assert_eq!(
            outcome,
            JobOutcome::Skipped {
                path: path.to_path_buf(),
                reason: SkipReason::TestSources,
            }
        );
    }

    #[tokio::test]
    async fn test_snapshot_is_skipped() {
        let mut mock = MockSink::new();
        mock.expect_upsert().never();
        let (job, _) = job_with(Arc::new(mock));

        let outcome = job.run(Path::new("/repo/lib/b-1.0-SNAPSHOT-sources.jar")).await;

        assert!(matches!(
            outcome,
            JobOutcome::Skipped {
                reason: SkipReason::PreRelease,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_non_archive_fails() {
        let temp_dir = tempdir().unwrap();
        let bogus = temp_dir.path().join("bogus-sources.jar");
        std::fs::write(&bogus, b"plain text").unwrap();
        let sink = Arc::new(MemorySink::new());
        let (job, _) = job_with(Arc::clone(&sink));

        let outcome = job.run(&bogus).await;

        match outcome {
            JobOutcome::Failed { path, error } => {
                assert_eq!(path, bogus);
                assert!(error.contains("bogus-sources.jar"));
            }
            other => panic!("Expected Failed, got {other:?}"),
        }
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_read_archive_reports_open_error() {
        let (upload_tx, _upload_rx) = mpsc::channel(1);
        let missing = PathBuf::from("/nonexistent/x-sources.jar");

        let result = tokio::task::spawn_blocking(move || {
            read_archive(&missing, &WhitelistRule::default(), upload_tx)
        })
        .await
        .unwrap();

        assert!(matches!(result, Err(IndexerError::ArchiveOpen { .. })));
    }

    /// 2番目のエントリの中身を1バイト書き換えたjarを作る
    fn write_jar_with_corrupt_second_entry(path: &Path) {
        write_stored_jar(
            path,
            &[
                ("A.java", "class Alpha {}"),
                ("B.java", "class Bravo {}"),
                ("C.java", "class Charlie {}"),
            ],
        );
        let mut bytes = std::fs::read(path).unwrap();
        let needle = b"class Bravo {}";
        let offset = bytes
            .windows(needle.len())
            .position(|window| window == needle)
            .unwrap();
        bytes[offset + 6] ^= 0xFF;
        std::fs::write(path, bytes).unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_entry_fails_job_after_earlier_entries() {
        let temp_dir = tempdir().unwrap();
        let jar = temp_dir.path().join("corrupt-sources.jar");
        write_jar_with_corrupt_second_entry(&jar);
        let sink = Arc::new(MemorySink::new());
        let (job, counters) = job_with(Arc::clone(&sink));

        let outcome = job.run(&jar).await;

        match outcome {
            JobOutcome::Failed { path, error } => {
                assert_eq!(path, jar);
                assert!(error.contains("アーカイブ読み込みエラー"), "{error}");
            }
            other => panic!("Expected Failed, got {other:?}"),
        }
        assert_eq!(sink.ids(), vec![format!("{}:A.java", jar.display())]);
        assert_eq!(counters.snapshot().documents_uploaded, 1);
    }

    #[tokio::test]
    async fn test_read_archive_reports_entry_read_error() {
        let temp_dir = tempdir().unwrap();
        let jar = temp_dir.path().join("corrupt-sources.jar");
        write_jar_with_corrupt_second_entry(&jar);
        let (upload_tx, mut upload_rx) = mpsc::channel(1);

        let reader = tokio::task::spawn_blocking(move || {
            read_archive(&jar, &WhitelistRule::default(), upload_tx)
        });
        let mut forwarded = Vec::new();
        while let Some((record, ack)) = upload_rx.recv().await {
            forwarded.push(record.id.clone());
            let _ = ack.send(());
        }
        let result = reader.await.unwrap();

        assert!(matches!(result, Err(IndexerError::ArchiveRead { .. })));
        assert_eq!(forwarded.len(), 1);
        assert!(forwarded[0].ends_with(":A.java"));
    }

    #[tokio::test]
    async fn test_execute_via_job_runner() {
        let temp_dir = tempdir().unwrap();
        let jar = temp_dir.path().join("runner-sources.jar");
        write_jar(&jar, &[("pom.xml", "<project/>")]);
        let sink = Arc::new(MemorySink::new());
        let (job, _) = job_with(Arc::clone(&sink));

        let outcome = job.execute(Job::new(7, &jar)).await;

        assert_eq!(outcome.state(), JobState::Completed);
        assert_eq!(sink.len(), 1);
    }
}
