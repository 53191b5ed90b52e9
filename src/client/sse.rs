//! SSE応答の正規化
//!
//! `stream: false`を要求しても`text/event-stream`形式で応答を返す
//! エンドポイントがあるため、チャンク列を単一の応答へ合成する。

use crate::types::TokenUsage;
use serde_json::Value;
use thiserror::Error;

/// イベントストリーム行のプレフィックス
pub(crate) const DATA_PREFIX: &str = "data:";

/// ストリーム終端のセンチネル
const DONE_SENTINEL: &str = "[DONE]";

/// 正規化エラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SseError {
    /// コンテンツ断片を1つも含まないストリーム
    #[error("no content found in SSE response")]
    NoContent,
}

/// 正規化済み応答
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResponse {
    /// 連結済みコンテンツ
    pub content: String,
    /// 最後に観測したモデル名（未観測ならリクエストしたモデル）
    pub model: String,
    /// 最後に観測した使用量（未観測ならゼロ埋め）
    pub usage: TokenUsage,
}

/// イベントストリーム形式のボディを単一の応答へ合成する
///
/// `data:`プレフィックスを持つ行だけを処理し、`[DONE]`で残りを打ち切る。
/// JSONとして解釈できない行（キープアライブ等）は黙って読み飛ばす。
/// `model`と`usage`は後勝ち、コンテンツ断片は到着順に連結する。
pub fn parse_event_stream(
    body: &str,
    requested_model: &str,
) -> Result<NormalizedResponse, SseError> {
    let mut content = String::new();
    let mut model: Option<String> = None;
    let mut usage: Option<TokenUsage> = None;

    for line in body.lines() {
        let Some(data) = line.trim().strip_prefix(DATA_PREFIX) else {
            continue;
        };
        let data = data.trim();
        if data == DONE_SENTINEL {
            break;
        }

        let Ok(chunk) = serde_json::from_str::<Value>(data) else {
            continue;
        };

        if let Some(m) = chunk.get("model").and_then(|v| v.as_str()) {
            model = Some(m.to_string());
        }
        if let Some(parsed) = chunk.get("usage").and_then(super::usage_from_value) {
            usage = Some(parsed);
        }
        if let Some(fragment) = chunk
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("delta"))
            .and_then(|d| d.get("content"))
            .and_then(|v| v.as_str())
        {
            content.push_str(fragment);
        }
    }

    if content.is_empty() {
        return Err(SseError::NoContent);
    }

    Ok(NormalizedResponse {
        content,
        model: model.unwrap_or_else(|| requested_model.to_string()),
        usage: usage.unwrap_or_default(),
    })
}
