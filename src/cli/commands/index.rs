use crate::cli::Cli;
use crate::core::ScanSummary;
use crate::engine::IndexingPipeline;
use crate::services::config::IndexerConfig;
use crate::sink::{LogSink, Sink, SolrSink};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// 引数から設定とシンクを組み立ててインデクシングを実行する
pub async fn execute_index(cli: &Cli) -> Result<ScanSummary> {
    let config = cli.indexer_config()?;

    let sink: Arc<dyn Sink> = if cli.dry_run {
        Arc::new(LogSink::new())
    } else {
        Arc::new(SolrSink::new(&config.sink_url).context("シンクの作成に失敗しました")?)
    };

    run_index(config, sink, &cli.roots).await
}

/// 任意のシンクでインデクシングを実行する
pub async fn run_index<S>(config: IndexerConfig, sink: Arc<S>, roots: &[PathBuf]) -> Result<ScanSummary>
where
    S: Sink + ?Sized + 'static,
{
    let pipeline = IndexingPipeline::new(config, sink)?;
    let config = pipeline.config();
    info!(
        pattern = %config.pattern,
        workers = config.workers,
        queue_capacity = config.queue_capacity(),
        roots = roots.len(),
        "Starting"
    );

    let summary = pipeline.run(roots).await?;

    Ok(summary)
}

pub fn format_summary(summary: &ScanSummary) -> String {
    let counters = &summary.counters;
    format!(
        "DONE ({} ms)\n\
         roots scanned: {} (failed: {}, walk errors: {})\n\
         archives matched: {}\n\
         completed: {}, skipped: {}, failed: {}\n\
         documents uploaded: {} (failures: {})",
        summary.elapsed_ms,
        summary.roots_scanned,
        summary.roots_failed,
        summary.walk_errors,
        counters.matched,
        counters.completed,
        counters.skipped,
        counters.failed,
        counters.documents_uploaded,
        counters.upload_failures,
    )
}

pub fn print_summary(summary: &ScanSummary) {
    println!("{}", format_summary(summary));
}
