//! ニュース戦略
//!
//! 設定されたRSSフィードから1本選び、その見出しをテンプレートへ差し込む。

use super::{PromptStrategy, StrategyKind};
use crate::client::BROWSER_USER_AGENT;
use crate::error::{KeeperError, KeeperResult};
use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use rand::Rng;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// フィード取得タイムアウト（秒）
const FEED_FETCH_TIMEOUT_SECS: u64 = 10;

/// 1フィードから候補にする最大エントリ数
const MAX_CANDIDATE_ENTRIES: usize = 10;

/// ニュース戦略の設定
#[derive(Debug, Clone, Deserialize)]
pub struct NewsConfig {
    /// RSSフィードURL一覧
    #[serde(default)]
    pub rss_urls: Vec<String>,
    /// 見出しの最大文字数 (デフォルト: 200)
    #[serde(default = "default_max_news_length")]
    pub max_news_length: usize,
    /// `{news_title}`プレースホルダを含むテンプレート
    pub prompt_template: String,
}

fn default_max_news_length() -> usize {
    200
}

/// ニュース戦略
pub struct NewsStrategy {
    config: NewsConfig,
    client: reqwest::Client,
}

impl NewsStrategy {
    /// 戦略固有設定から構築する
    pub fn from_config(raw: &serde_yaml::Value, client: reqwest::Client) -> KeeperResult<Self> {
        let config: NewsConfig = super::typed_config(raw, StrategyKind::News)?;
        Ok(Self { config, client })
    }

    async fn try_generate(&self) -> KeeperResult<Option<String>> {
        if self.config.rss_urls.is_empty() {
            return Ok(None);
        }
        let url = pick(&self.config.rss_urls).clone();

        let body = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(FEED_FETCH_TIMEOUT_SECS))
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await
            .map_err(|err| KeeperError::Http(err.to_string()))?
            .error_for_status()
            .map_err(|err| KeeperError::Http(err.to_string()))?
            .text()
            .await
            .map_err(|err| KeeperError::Http(err.to_string()))?;

        let titles = parse_feed_titles(&body);
        if titles.is_empty() {
            return Ok(None);
        }

        let candidates = &titles[..titles.len().min(MAX_CANDIDATE_ENTRIES)];
        let title = truncate_with_ellipsis(pick(candidates).as_str(), self.config.max_news_length);

        Ok(Some(self.config.prompt_template.replace("{news_title}", &title)))
    }
}

#[async_trait]
impl PromptStrategy for NewsStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::News
    }

    async fn generate(&self) -> Option<String> {
        match self.try_generate().await {
            Ok(prompt) => prompt,
            Err(err) => {
                debug!(error = %err, "news strategy failed");
                None
            }
        }
    }
}

/// RSS/Atomフィードから記事タイトルを文書順に取り出す
///
/// チャンネル/フィード自体のタイトルは対象外。壊れたXMLでも
/// エラー位置までに拾えたタイトルを返す。
fn parse_feed_titles(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);

    let mut titles = Vec::new();
    let mut in_entry = false;
    let mut in_title = false;
    let mut current = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"item" | b"entry" => in_entry = true,
                b"title" if in_entry => {
                    in_title = true;
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Text(t)) if in_title => {
                if let Ok(text) = t.unescape() {
                    current.push_str(&text);
                }
            }
            Ok(Event::CData(t)) if in_title => {
                current.push_str(&String::from_utf8_lossy(&t.into_inner()));
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"item" | b"entry" => in_entry = false,
                b"title" if in_title => {
                    in_title = false;
                    let title = current.trim().to_string();
                    if !title.is_empty() {
                        titles.push(title);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    titles
}

/// 最大文字数を超える場合は切り詰めて`...`を付ける（文字単位）
fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

fn pick<T>(items: &[T]) -> &T {
    let mut rng = rand::rng();
    &items[rng.random_range(0..items.len())]
}
