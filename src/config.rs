//! 設定管理
//!
//! `config.yaml`の読み込みと検証。読み込み後は不変。

use crate::error::{KeeperError, KeeperResult};
use crate::strategy::StrategyKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// サーバー設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// ホストアドレス (デフォルト: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// ポート番号 (デフォルト: 8080)
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// バインドアドレス文字列を返す
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// スケジュール設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// 実行間隔（時間）(デフォルト: 12)
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,

    /// 起動時に即時実行するか (デフォルト: true)
    #[serde(default = "default_true")]
    pub run_on_start: bool,
}

fn default_interval_hours() -> u64 {
    12
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_hours: default_interval_hours(),
            run_on_start: true,
        }
    }
}

/// ログ設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// ログ出力ディレクトリ (デフォルト: "./logs")
    #[serde(default = "default_log_path")]
    pub path: PathBuf,

    /// ログレベル（tracingのフィルタ指定）(デフォルト: "info")
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_path() -> PathBuf {
    PathBuf::from("./logs")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            path: default_log_path(),
            level: default_log_level(),
        }
    }
}

/// エンドポイント設定
///
/// ウォームアップ対象のOpenAI互換APIを1件表す。インスタンス間で状態は共有しない。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// 表示名
    pub name: String,
    /// ベースURL（末尾スラッシュは無視される）
    pub url: String,
    /// APIキー（シリアライズ時はスキップ）
    #[serde(skip_serializing)]
    pub api_key: String,
    /// リクエストするモデル名
    pub model: String,
    /// 最大トークン数 (デフォルト: 100)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// サンプリング温度 (デフォルト: 0.7)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// 有効フラグ (デフォルト: true)
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_max_tokens() -> u32 {
    100
}

fn default_temperature() -> f32 {
    0.7
}

fn default_true() -> bool {
    true
}

impl EndpointConfig {
    /// 実効リクエストURL（末尾スラッシュを除去して`/chat/completions`を連結）
    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.url.trim_end_matches('/'))
    }
}

/// 戦略設定
///
/// `config`は戦略種別ごとの固有設定で、この層では不透明なまま保持し、
/// 戦略構築時に型付きで解釈する。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// 戦略種別
    #[serde(rename = "type")]
    pub kind: StrategyKind,
    /// 有効フラグ (デフォルト: true)
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 優先度（昇順、同値は宣言順）(デフォルト: 999)
    #[serde(default = "default_priority")]
    pub priority: u32,
    /// 戦略種別ごとの固有設定
    #[serde(default)]
    pub config: serde_yaml::Value,
}

fn default_priority() -> u32 {
    999
}

/// アプリケーション設定全体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeeperConfig {
    /// サーバー設定
    #[serde(default)]
    pub server: ServerConfig,
    /// スケジュール設定
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// ログ設定
    #[serde(default)]
    pub logging: LoggingConfig,
    /// ウォームアップ対象エンドポイント一覧
    pub apis: Vec<EndpointConfig>,
    /// プロンプト生成戦略一覧
    pub request_strategies: Vec<StrategyConfig>,
}

impl KeeperConfig {
    /// 設定ファイルを読み込み、検証して返す
    pub fn load(path: &Path) -> KeeperResult<Self> {
        if !path.exists() {
            return Err(KeeperError::Config(format!(
                "configuration file not found: {} (copy config.example.yaml and fill in your endpoints)",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// YAML文字列から読み込む（検証込み）
    pub fn from_yaml(content: &str) -> KeeperResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> KeeperResult<()> {
        if self.apis.is_empty() {
            return Err(KeeperError::Config(
                "'apis' must be a non-empty list".to_string(),
            ));
        }
        for (idx, api) in self.apis.iter().enumerate() {
            for (field, value) in [
                ("name", &api.name),
                ("url", &api.url),
                ("api_key", &api.api_key),
                ("model", &api.model),
            ] {
                if value.is_empty() {
                    return Err(KeeperError::Config(format!(
                        "apis[{idx}]: '{field}' must not be empty"
                    )));
                }
            }
        }
        if self.request_strategies.is_empty() {
            return Err(KeeperError::Config(
                "'request_strategies' must be a non-empty list".to_string(),
            ));
        }
        if self.schedule.interval_hours == 0 {
            return Err(KeeperError::Config(
                "'schedule.interval_hours' must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// 有効なエンドポイントのみを返す
    pub fn enabled_apis(&self) -> Vec<EndpointConfig> {
        self.apis.iter().filter(|api| api.enabled).cloned().collect()
    }
}
