use anyhow::Result;
use clap::Parser;
use source_indexer::cli::{execute_index, print_summary, Cli};
use source_indexer::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_config())?;

    let summary = execute_index(&cli).await?;
    print_summary(&summary);

    // 個々のジョブの失敗では終了コードを変えない
    if summary.roots_scanned == 0 {
        anyhow::bail!("走査できたルートがありません");
    }

    Ok(())
}
