//! エラー型定義
//!
//! 統一エラー型（thiserror使用）

use thiserror::Error;

/// llmkeeper error type
#[derive(Debug, Error)]
pub enum KeeperError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Http(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// llmkeeper全体で使うResultエイリアス
pub type KeeperResult<T> = Result<T, KeeperError>;
