//! エンドポイントクライアント
//!
//! 1エンドポイントへのチャット補完リクエスト送信と応答の分類。
//! リモート側は応答形式について信用しない。`stream: false`を指定しても
//! SSE形式で返すエンドポイントや、独自形式のエラー封筒を返すものがある。

pub mod sse;

use crate::config::EndpointConfig;
use crate::types::{DispatchResult, TokenUsage};
use serde_json::{json, Value};
use std::time::Duration;

/// リクエストタイムアウト（秒）
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// UA検査で弾くエンドポイント向けのブラウザ風User-Agent
pub(crate) const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// SSEパース失敗時に添付する生ボディの最大文字数
const SSE_ERROR_EXCERPT_CHARS: usize = 300;
/// JSONパース失敗時に添付する生ボディの最大文字数
const JSON_ERROR_EXCERPT_CHARS: usize = 500;
/// エラーレスポンス本文の最大文字数
const ERROR_BODY_EXCERPT_CHARS: usize = 300;

/// エンドポイントクライアント
///
/// 1エンドポイント分の接続パラメータを保持する。HTTPクライアント自体は
/// 共有インスタンス（接続プーリング有効）を受け取る。
pub struct EndpointClient {
    client: reqwest::Client,
    config: EndpointConfig,
    url: String,
}

impl EndpointClient {
    /// 新しいクライアントを作成する
    pub fn new(client: reqwest::Client, config: EndpointConfig) -> Self {
        let url = config.chat_completions_url();
        Self {
            client,
            config,
            url,
        }
    }

    /// プロンプトを送信し、結果を分類して返す
    ///
    /// トランスポート障害・プロトコル障害はすべて`DispatchResult`の
    /// 失敗として畳み込む。この層での再試行はない。
    pub async fn send(&self, prompt: &str) -> DispatchResult {
        let payload = json!({
            "model": self.config.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "stream": false,
        });

        let response = match self
            .client
            .post(&self.url)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return self.transport_failure(prompt, &err),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => return self.transport_failure(prompt, &err),
        };

        if status != reqwest::StatusCode::OK {
            return self.failure(
                prompt,
                format!("HTTP {}: {}", status.as_u16(), extract_error_detail(&body)),
            );
        }

        if body.starts_with(sse::DATA_PREFIX) {
            return match sse::parse_event_stream(&body, &self.config.model) {
                Ok(normalized) => self.success(
                    prompt,
                    normalized.content,
                    normalized.usage,
                    normalized.model,
                ),
                Err(err) => self.failure(
                    prompt,
                    format!(
                        "SSE parse error: {}. Raw: {}",
                        err,
                        excerpt(&body, SSE_ERROR_EXCERPT_CHARS)
                    ),
                ),
            };
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(data) => match data
                .get("choices")
                .and_then(|c| c.get(0))
                .and_then(|c| c.get("message"))
                .and_then(|m| m.get("content"))
                .and_then(|v| v.as_str())
            {
                Some(content) => {
                    let usage = data
                        .get("usage")
                        .and_then(usage_from_value)
                        .unwrap_or_default();
                    let model = data
                        .get("model")
                        .and_then(|m| m.as_str())
                        .unwrap_or(&self.config.model)
                        .to_string();
                    self.success(prompt, content.to_string(), usage, model)
                }
                None => self.failure(
                    prompt,
                    format!(
                        "JSON parse error: missing choices[0].message.content. Raw response: {}",
                        excerpt(&body, JSON_ERROR_EXCERPT_CHARS)
                    ),
                ),
            },
            Err(err) => {
                let raw = if body.is_empty() {
                    "(empty response)".to_string()
                } else {
                    excerpt(&body, JSON_ERROR_EXCERPT_CHARS)
                };
                self.failure(prompt, format!("JSON parse error: {err}. Raw response: {raw}"))
            }
        }
    }

    fn success(
        &self,
        prompt: &str,
        content: String,
        usage: TokenUsage,
        model: String,
    ) -> DispatchResult {
        DispatchResult::success(&self.config.name, prompt, content, usage, model)
    }

    fn failure(&self, prompt: &str, error: String) -> DispatchResult {
        DispatchResult::failure(&self.config.name, prompt, error)
    }

    fn transport_failure(&self, prompt: &str, err: &reqwest::Error) -> DispatchResult {
        self.failure(prompt, format!("{}: {}", transport_error_kind(err), err))
    }
}

/// トランスポート障害の種別タグ
///
/// TLSハンドシェイク失敗は接続エラーとして分類される。
fn transport_error_kind(err: &reqwest::Error) -> &'static str {
    if err.is_timeout() {
        "Timeout"
    } else if err.is_connect() {
        "Connection error"
    } else {
        "Request error"
    }
}

/// 非200応答のエラー封筒から人間可読なメッセージを取り出す
///
/// `error.message`、`error.msg`の順に探し、どちらも無ければ`error`の値
/// そのもの、JSONでなければ切り詰めた生ボディを返す。
fn extract_error_detail(body: &str) -> String {
    if let Ok(data) = serde_json::from_str::<Value>(body) {
        if let Some(err) = data.get("error") {
            for field in ["message", "msg"] {
                if let Some(message) = err
                    .get(field)
                    .and_then(|m| m.as_str())
                    .filter(|m| !m.is_empty())
                {
                    return message.to_string();
                }
            }
            return err.to_string();
        }
    }
    if body.is_empty() {
        "(empty response)".to_string()
    } else {
        excerpt(body, ERROR_BODY_EXCERPT_CHARS)
    }
}

/// 非空の`usage`フィールドを`TokenUsage`として解釈する
///
/// null・空オブジェクト・解釈不能な値は`None`。
pub(crate) fn usage_from_value(value: &Value) -> Option<TokenUsage> {
    match value {
        Value::Null => None,
        Value::Object(map) if map.is_empty() => None,
        _ => serde_json::from_value(value.clone()).ok(),
    }
}

/// 文字単位で先頭`max_chars`文字を切り出す
fn excerpt(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
