use crate::logging::{LogConfig, LogFormat, LogLevel};
use crate::services::config::IndexerConfig;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "source-indexer")]
#[command(about = "Find source jars under the given roots and upload their sources to a search index")]
#[command(version)]
pub struct Cli {
    /// Root directories to search
    #[arg(required = true)]
    pub roots: Vec<PathBuf>,

    /// Number of worker threads
    #[arg(short, long, env = "SOURCE_INDEXER_THREADS")]
    pub threads: Option<usize>,

    /// Glob pattern matched against file names
    #[arg(short, long, env = "SOURCE_INDEXER_PATTERN")]
    pub pattern: Option<String>,

    /// Solr core URL
    #[arg(long, env = "SOURCE_INDEXER_SINK_URL")]
    pub sink_url: Option<String>,

    /// Base directory for relative roots
    #[arg(long, env = "SOURCE_INDEXER_BASE_DIR")]
    pub base_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log matched documents instead of uploading them
    #[arg(long)]
    pub dry_run: bool,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, value_enum, default_value_t = LogLevel::Info, env = "SOURCE_INDEXER_LOG_LEVEL")]
    pub log_level: LogLevel,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, env = "SOURCE_INDEXER_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Extra filter directives, e.g. "reqwest=warn,source_indexer=debug"
    #[arg(long, env = "SOURCE_INDEXER_LOG_FILTER")]
    pub log_filter: Option<String>,
}

impl Cli {
    /// デフォルト値 → 設定ファイル → 引数 の順に重ねた設定
    pub fn indexer_config(&self) -> Result<IndexerConfig> {
        let mut config = match &self.config {
            Some(path) => IndexerConfig::from_json_file(path)?,
            None => IndexerConfig::default(),
        };

        if let Some(threads) = self.threads {
            config = config.with_workers(threads);
        }
        if let Some(pattern) = &self.pattern {
            config = config.with_pattern(pattern.clone());
        }
        if let Some(url) = &self.sink_url {
            config = config.with_sink_url(url.clone());
        }
        if let Some(base_dir) = &self.base_dir {
            config = config.with_base_dir(base_dir.clone());
        }

        Ok(config)
    }

    pub fn log_config(&self) -> LogConfig {
        let config = LogConfig::new(self.log_level, self.log_format);
        match &self.log_filter {
            Some(directives) => config.with_filter_directives(directives.clone()),
            None => config,
        }
    }
}
