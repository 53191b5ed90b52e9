//! Webページ戦略
//!
//! 設定されたURLから1件選んで取得し、ページタイトルをテンプレートへ差し込む。
//! `<title>`要素が無いページはURL自体をタイトルとして扱う。

use super::{PromptStrategy, StrategyKind};
use crate::client::BROWSER_USER_AGENT;
use crate::error::{KeeperError, KeeperResult};
use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Webページ戦略の設定
#[derive(Debug, Clone, Deserialize)]
pub struct WebpageConfig {
    /// 取得対象URL一覧
    #[serde(default)]
    pub urls: Vec<String>,
    /// 取得タイムアウト（秒）(デフォルト: 10)
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// `{page_title}`プレースホルダを含むテンプレート
    pub prompt_template: String,
}

fn default_timeout() -> u64 {
    10
}

/// Webページ戦略
pub struct WebpageStrategy {
    config: WebpageConfig,
    client: reqwest::Client,
}

impl WebpageStrategy {
    /// 戦略固有設定から構築する
    pub fn from_config(raw: &serde_yaml::Value, client: reqwest::Client) -> KeeperResult<Self> {
        let config: WebpageConfig = super::typed_config(raw, StrategyKind::Webpage)?;
        Ok(Self { config, client })
    }

    async fn try_generate(&self) -> KeeperResult<Option<String>> {
        if self.config.urls.is_empty() {
            return Ok(None);
        }
        let url = pick(&self.config.urls).clone();

        let body = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(self.config.timeout))
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await
            .map_err(|err| KeeperError::Http(err.to_string()))?
            .error_for_status()
            .map_err(|err| KeeperError::Http(err.to_string()))?
            .text()
            .await
            .map_err(|err| KeeperError::Http(err.to_string()))?;

        let title = extract_title(&body).unwrap_or_else(|| url.clone());

        Ok(Some(self.config.prompt_template.replace("{page_title}", &title)))
    }
}

#[async_trait]
impl PromptStrategy for WebpageStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Webpage
    }

    async fn generate(&self) -> Option<String> {
        match self.try_generate().await {
            Ok(prompt) => prompt,
            Err(err) => {
                debug!(error = %err, "webpage strategy failed");
                None
            }
        }
    }
}

/// HTMLから最初の`<title>`要素のテキストを取り出す
///
/// `scraper::Html`は`Send`でないため、awaitをまたがない同期関数に閉じ込める。
fn extract_title(html: &str) -> Option<String> {
    let document = scraper::Html::parse_document(html);
    let selector = scraper::Selector::parse("title").ok()?;
    let element = document.select(&selector).next()?;
    let title = element.text().collect::<String>().trim().to_string();
    (!title.is_empty()).then_some(title)
}

fn pick<T>(items: &[T]) -> &T {
    let mut rng = rand::rng();
    &items[rng.random_range(0..items.len())]
}
