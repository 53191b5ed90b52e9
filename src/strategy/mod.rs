//! プロンプト生成戦略
//!
//! 優先度順フォールバックで選択される、交換可能なプロンプト生成器群。
//! 戦略を追加する場合は`StrategyKind`にバリアントを足し、
//! 対応するモジュールを実装して`build_strategies`へ1アームを追加する。
//! リゾルバ側の変更は不要。

mod news;
mod random_question;
/// 優先度順フォールバック解決
pub mod resolver;
mod webpage;

pub use news::NewsStrategy;
pub use random_question::RandomQuestionStrategy;
pub use resolver::resolve;
pub use webpage::WebpageStrategy;

use crate::config::StrategyConfig;
use crate::error::{KeeperError, KeeperResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 戦略種別
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// RSSフィードの見出しからプロンプトを生成
    News,
    /// Webページのタイトルからプロンプトを生成
    Webpage,
    /// テンプレートと変数からランダムな質問を生成
    RandomQuestion,
}

impl StrategyKind {
    /// StrategyKindを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::News => "news",
            Self::Webpage => "webpage",
            Self::RandomQuestion => "random_question",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// StrategyKind のパースエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStrategyKindError(pub String);

impl std::fmt::Display for ParseStrategyKindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown strategy type: '{}'", self.0)
    }
}

impl std::error::Error for ParseStrategyKindError {}

impl FromStr for StrategyKind {
    type Err = ParseStrategyKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "news" => Ok(Self::News),
            "webpage" => Ok(Self::Webpage),
            "random_question" => Ok(Self::RandomQuestion),
            _ => Err(ParseStrategyKindError(s.to_string())),
        }
    }
}

/// プロンプト生成戦略の共通インターフェース
///
/// 実装は内部のあらゆる失敗（ネットワークエラー、空のソース一覧、
/// パース失敗）を自身で吸収して`None`を返す。呼び出し側には
/// 「プロンプトなし」以外の失敗を伝播させない。
#[async_trait]
pub trait PromptStrategy: Send + Sync {
    /// 戦略種別
    fn kind(&self) -> StrategyKind;

    /// プロンプトを1件生成する。生成できない場合は`None`
    async fn generate(&self) -> Option<String>;
}

/// 有効な戦略を優先度昇順で構築する
///
/// 無効化された戦略は除外し、優先度の同値は宣言順を保つ（安定ソート）。
/// 戦略固有設定が不正な場合は起動エラーとする。
pub fn build_strategies(
    configs: &[StrategyConfig],
    client: &reqwest::Client,
) -> KeeperResult<Vec<Box<dyn PromptStrategy>>> {
    let mut entries: Vec<&StrategyConfig> = configs.iter().filter(|c| c.enabled).collect();
    entries.sort_by_key(|c| c.priority);

    let mut strategies: Vec<Box<dyn PromptStrategy>> = Vec::with_capacity(entries.len());
    for entry in entries {
        let strategy: Box<dyn PromptStrategy> = match entry.kind {
            StrategyKind::News => {
                Box::new(NewsStrategy::from_config(&entry.config, client.clone())?)
            }
            StrategyKind::Webpage => {
                Box::new(WebpageStrategy::from_config(&entry.config, client.clone())?)
            }
            StrategyKind::RandomQuestion => {
                Box::new(RandomQuestionStrategy::from_config(&entry.config)?)
            }
        };
        strategies.push(strategy);
    }
    Ok(strategies)
}

/// 戦略固有設定を型付きで解釈する
///
/// `config`キーの省略（null）は空のマッピングとして扱う。
pub(crate) fn typed_config<T>(raw: &serde_yaml::Value, kind: StrategyKind) -> KeeperResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let value = if raw.is_null() {
        serde_yaml::Value::Mapping(serde_yaml::Mapping::new())
    } else {
        raw.clone()
    };
    serde_yaml::from_value(value)
        .map_err(|err| KeeperError::Config(format!("invalid {kind} strategy config: {err}")))
}
