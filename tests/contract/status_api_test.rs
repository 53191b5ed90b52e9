//! Contract Test: 状態API

use reqwest::Client;
use serde_json::Value;

use crate::support::spawn_keeper;

/// 初回実行前は running=false、スケジューラ未起動なら next_scheduled_run=null
#[tokio::test]
async fn test_status_initial_shape() {
    let server = spawn_keeper(&[("unreachable", "http://127.0.0.1:1")]).await;
    let client = Client::new();

    let resp = client.get(server.url("/api/status")).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["running"], false);
    assert!(body["next_scheduled_run"].is_null());
}

/// 実行権の保持状況がrunningへ反映される
#[tokio::test]
async fn test_status_reflects_running_flag() {
    let server = spawn_keeper(&[("unreachable", "http://127.0.0.1:1")]).await;
    let client = Client::new();

    let permit = server.state.run_guard.try_start().expect("claim permit");

    let body: Value = client
        .get(server.url("/api/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["running"], true);

    drop(permit);

    let body: Value = client
        .get(server.url("/api/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["running"], false);
}
