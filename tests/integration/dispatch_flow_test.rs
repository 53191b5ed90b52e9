//! Integration Test: ディスパッチャ
//!
//! 成否が混在する複数エンドポイントへの順次送信で、集計の不変条件
//! （合計=エンドポイント数、相互非干渉）を検証する。

use llmkeeper::config::EndpointConfig;
use llmkeeper::keeper::dispatcher::dispatch;
use llmkeeper::logger::KeeperLog;
use llmkeeper::strategy::StrategyKind;
use llmkeeper::types::DispatchResult;
use serde_json::json;
use std::sync::Mutex;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 転送された結果を記録するロガー
#[derive(Default)]
struct RecordingLogger {
    requests: Mutex<Vec<(String, bool)>>,
}

impl RecordingLogger {
    fn requests(&self) -> Vec<(String, bool)> {
        self.requests.lock().unwrap().clone()
    }
}

impl KeeperLog for RecordingLogger {
    fn log_request(&self, _strategy: StrategyKind, result: &DispatchResult) {
        self.requests
            .lock()
            .unwrap()
            .push((result.api_name.clone(), result.success));
    }

    fn log_strategy_failure(&self, _strategy: StrategyKind, _reason: &str) {}

    fn log_info(&self, _message: &str) {}

    fn log_error(&self, _message: &str) {}
}

fn endpoint(name: &str, url: &str) -> EndpointConfig {
    EndpointConfig {
        name: name.to_string(),
        url: url.to_string(),
        api_key: "sk-test".to_string(),
        model: "test-model".to_string(),
        max_tokens: 100,
        temperature: 0.7,
        enabled: true,
    }
}

async fn mock_success_server() -> MockServer {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "warm"}}],
            "usage": {"prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2}
        })))
        .mount(&mock)
        .await;
    mock
}

/// 成否混在でも合計は常にエンドポイント数
#[tokio::test]
async fn test_mixed_outcomes_tally_to_endpoint_count() {
    let ok_server = mock_success_server().await;

    let failing = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"message": "down for maintenance"}
        })))
        .mount(&failing)
        .await;

    let endpoints = vec![
        endpoint("ok", &ok_server.uri()),
        endpoint("failing", &failing.uri()),
        endpoint("unreachable", "http://127.0.0.1:1"),
    ];
    let logger = RecordingLogger::default();
    let client = reqwest::Client::new();

    let summary = dispatch(&client, "ping", StrategyKind::News, &endpoints, &logger).await;

    assert_eq!(summary.success_count, 1);
    assert_eq!(summary.failure_count, 2);
    assert_eq!(
        summary.success_count + summary.failure_count,
        endpoints.len()
    );
}

/// 先行エンドポイントの障害が後続の結果に影響しない
#[tokio::test]
async fn test_endpoint_failure_does_not_affect_others() {
    let ok_server = mock_success_server().await;

    let endpoints = vec![
        endpoint("unreachable-1", "http://127.0.0.1:1"),
        endpoint("ok", &ok_server.uri()),
        endpoint("unreachable-2", "http://127.0.0.1:1"),
    ];
    let logger = RecordingLogger::default();
    let client = reqwest::Client::new();

    let summary = dispatch(&client, "ping", StrategyKind::Webpage, &endpoints, &logger).await;

    assert_eq!(summary.success_count, 1);
    assert_eq!(summary.failure_count, 2);

    // すべての結果が成否を問わずロガーへ届き、個別の成否が保たれている
    let requests = logger.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(
        requests,
        vec![
            ("unreachable-1".to_string(), false),
            ("ok".to_string(), true),
            ("unreachable-2".to_string(), false),
        ]
    );
}
