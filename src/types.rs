//! ディスパッチ結果の型定義

use serde::{Deserialize, Serialize};

/// トークン使用量
///
/// エンドポイントが`usage`を返さない場合はゼロ埋めのデフォルトを使う。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// プロンプト側トークン数
    #[serde(default)]
    pub prompt_tokens: u64,
    /// 生成側トークン数
    #[serde(default)]
    pub completion_tokens: u64,
    /// 合計トークン数
    #[serde(default)]
    pub total_tokens: u64,
}

/// 1エンドポイント・1回分の送信結果
///
/// 構築後は変更しない。成功時は`response_text`/`usage`/`model`が、
/// 失敗時は`error`のみが設定される。
#[derive(Debug, Clone, Serialize)]
pub struct DispatchResult {
    /// エンドポイント名（設定の`name`）
    pub api_name: String,
    /// 成功/失敗
    pub success: bool,
    /// 送信したプロンプト
    pub prompt: String,
    /// 応答本文（成功時のみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_text: Option<String>,
    /// トークン使用量（成功時のみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    /// 応答したモデル名（成功時のみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// エラーメッセージ（失敗時のみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DispatchResult {
    /// 成功結果を作成する
    pub fn success(
        api_name: impl Into<String>,
        prompt: impl Into<String>,
        response_text: impl Into<String>,
        usage: TokenUsage,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_name: api_name.into(),
            success: true,
            prompt: prompt.into(),
            response_text: Some(response_text.into()),
            usage: Some(usage),
            model: Some(model.into()),
            error: None,
        }
    }

    /// 失敗結果を作成する
    pub fn failure(
        api_name: impl Into<String>,
        prompt: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            api_name: api_name.into(),
            success: false,
            prompt: prompt.into(),
            response_text: None,
            usage: None,
            model: None,
            error: Some(error.into()),
        }
    }
}
