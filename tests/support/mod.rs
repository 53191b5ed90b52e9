//! テスト用の共通ハーネス
//!
//! 一時ログディレクトリ付きのテスト設定と、graceful shutdown可能な
//! テストサーバーを提供する。

use llmkeeper::{api, config::KeeperConfig, AppState};
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use tempfile::TempDir;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

/// テスト用に起動したkeeperサーバー
#[allow(dead_code)]
pub struct TestKeeper {
    addr: SocketAddr,
    /// サーバーと同じアプリケーション状態（ガード操作等に使う）
    pub state: AppState,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<Result<(), io::Error>>>,
    // ログディレクトリはサーバーの寿命まで保持する
    _log_dir: TempDir,
}

#[allow(dead_code)]
impl TestKeeper {
    /// サーバーがバインドしているアドレスを返す
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// パスからフルURLを組み立てる
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestKeeper {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// エンドポイントを差し替え可能なテスト設定を生成する
#[allow(dead_code)]
pub fn test_config(endpoint_urls: &[(&str, &str)], log_dir: &Path) -> KeeperConfig {
    let mut apis = String::new();
    for (name, url) in endpoint_urls {
        apis.push_str(&format!(
            "  - name: \"{name}\"\n    url: \"{url}\"\n    api_key: \"sk-test\"\n    model: \"test-model\"\n"
        ));
    }
    let yaml = format!(
        r#"
logging:
  path: "{log_dir}"
apis:
{apis}
request_strategies:
  - type: random_question
    priority: 1
    config:
      question_templates: ["What is {{n}} plus {{n}}?"]
      variables:
        n: [1, 9]
"#,
        log_dir = log_dir.display()
    );
    KeeperConfig::from_yaml(&yaml).expect("test config should be valid")
}

/// テスト用keeperサーバーを起動する
#[allow(dead_code)]
pub async fn spawn_keeper(endpoint_urls: &[(&str, &str)]) -> TestKeeper {
    let log_dir = TempDir::new().expect("failed to create temp log dir");
    let config = test_config(endpoint_urls, log_dir.path());
    spawn_keeper_with(config, log_dir).await
}

/// 任意の設定でテスト用keeperサーバーを起動する
#[allow(dead_code)]
pub async fn spawn_keeper_with(config: KeeperConfig, log_dir: TempDir) -> TestKeeper {
    let state = AppState::from_config(config).expect("failed to build app state");
    let app = api::create_app(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().expect("failed to read local addr");

    let (tx, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = rx.await;
            })
            .await
    });

    TestKeeper {
        addr,
        state,
        shutdown: Some(tx),
        handle: Some(handle),
        _log_dir: log_dir,
    }
}
