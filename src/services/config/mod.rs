// 設定管理 - デフォルト値、JSON設定ファイル、CLI引数の順に上書きする

pub mod implementations;

pub use implementations::{
    IndexerConfig, DEFAULT_PATTERN, DEFAULT_WORKERS, MAX_QUEUE_CAPACITY, MAX_WORKERS,
};
