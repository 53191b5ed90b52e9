//! Integration Test: 実行フロー
//!
//! 戦略解決からディスパッチ・記録までの1実行と、実行ガードを経由した
//! 単一実行の制約を検証する。

use llmkeeper::{keeper, AppState};
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::test_config;

/// 1回の実行でエンドポイントが1度だけ呼ばれ、詳細ログが残る
#[tokio::test]
async fn test_full_run_records_details() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "served-model",
            "choices": [{"message": {"content": "kept warm"}}],
            "usage": {"prompt_tokens": 2, "completion_tokens": 3, "total_tokens": 5}
        })))
        .expect(1)
        .mount(&mock)
        .await;

    let log_dir = TempDir::new().unwrap();
    let config = test_config(&[("warm-target", &mock.uri())], log_dir.path());
    let state = AppState::from_config(config).unwrap();

    keeper::run_keeper_task(&state).await;

    let detail = std::fs::read_to_string(state.logger.detail_log_path()).unwrap();
    let lines: Vec<&str> = detail.lines().collect();
    assert_eq!(lines.len(), 1);

    let entry: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(entry["api_name"], "warm-target");
    assert_eq!(entry["strategy"], "random_question");
    assert_eq!(entry["response"], "kept warm");
    assert_eq!(entry["usage"]["total_tokens"], 5);
    // プロンプトはテンプレートから生成されたもの
    assert!(entry["prompt"].as_str().unwrap().starts_with("What is "));
}

/// 全戦略が失敗した実行ではディスパッチが発生しない
#[tokio::test]
async fn test_no_dispatch_when_all_strategies_fail() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "should never happen"}}]
        })))
        .expect(0)
        .mount(&mock)
        .await;

    let log_dir = TempDir::new().unwrap();
    let yaml = format!(
        r#"
logging:
  path: "{}"
apis:
  - name: "warm-target"
    url: "{}"
    api_key: "sk-test"
    model: "test-model"
request_strategies:
  - type: news
    priority: 1
    config:
      rss_urls: ["http://127.0.0.1:1/feed.xml"]
      prompt_template: "news: {{news_title}}"
"#,
        log_dir.path().display(),
        mock.uri()
    );
    let config = llmkeeper::config::KeeperConfig::from_yaml(&yaml).unwrap();
    let state = AppState::from_config(config).unwrap();

    keeper::run_keeper_task(&state).await;

    // expect(0)はmockのdrop時に検証される
    assert!(!state.logger.detail_log_path().exists());
}

/// try_spawn_runは同時に1実行しか受理しない
#[tokio::test]
async fn test_try_spawn_run_is_single_flight() {
    let log_dir = TempDir::new().unwrap();
    let config = test_config(&[("unreachable", "http://127.0.0.1:1")], log_dir.path());
    let state = AppState::from_config(config).unwrap();

    // 実行権を押さえている間は拒否される
    let permit = state.run_guard.try_start().unwrap();
    assert!(!keeper::try_spawn_run(state.clone()));
    drop(permit);

    assert!(keeper::try_spawn_run(state.clone()));

    // ワーカー完了後にフラグが戻ることを確認
    for _ in 0..100 {
        if !state.run_guard.is_running() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(!state.run_guard.is_running());
}
