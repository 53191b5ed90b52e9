//! Integration Test: 外部取得を伴う戦略
//!
//! 偽サーバーからのフィード/ページ取得を通してプロンプト生成の契約
//! （成功時はテンプレート差し込み、失敗時は「プロンプトなし」）を検証する。

use llmkeeper::strategy::{NewsStrategy, PromptStrategy, WebpageStrategy};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// RSSフィードの見出しがテンプレートへ差し込まれる
#[tokio::test]
async fn test_news_strategy_generates_from_feed() {
    let mock = MockServer::start().await;

    let rss = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Feed Title</title>
    <item><title>Only headline</title></item>
  </channel>
</rss>"#;

    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(rss, "application/rss+xml"))
        .mount(&mock)
        .await;

    let config = serde_yaml::from_str(&format!(
        r#"
rss_urls: ["{}/feed.xml"]
prompt_template: "news: {{news_title}}"
"#,
        mock.uri()
    ))
    .unwrap();

    let strategy = NewsStrategy::from_config(&config, reqwest::Client::new()).unwrap();
    assert_eq!(
        strategy.generate().await.as_deref(),
        Some("news: Only headline")
    );
}

/// 見出しが最大長を超えると切り詰められて省略記号が付く
#[tokio::test]
async fn test_news_strategy_truncates_long_headline() {
    let mock = MockServer::start().await;

    let rss = r#"<rss version="2.0"><channel>
<item><title>abcdefghij-this-part-is-cut</title></item>
</channel></rss>"#;

    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(rss, "application/rss+xml"))
        .mount(&mock)
        .await;

    let config = serde_yaml::from_str(&format!(
        r#"
rss_urls: ["{}/feed.xml"]
max_news_length: 10
prompt_template: "{{news_title}}"
"#,
        mock.uri()
    ))
    .unwrap();

    let strategy = NewsStrategy::from_config(&config, reqwest::Client::new()).unwrap();
    assert_eq!(strategy.generate().await.as_deref(), Some("abcdefghij..."));
}

/// ページタイトルがテンプレートへ差し込まれる
#[tokio::test]
async fn test_webpage_strategy_uses_title() {
    let mock = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><head><title>Example Domain</title></head><body></body></html>",
            "text/html",
        ))
        .mount(&mock)
        .await;

    let config = serde_yaml::from_str(&format!(
        r#"
urls: ["{}/"]
prompt_template: "page: {{page_title}}"
"#,
        mock.uri()
    ))
    .unwrap();

    let strategy = WebpageStrategy::from_config(&config, reqwest::Client::new()).unwrap();
    assert_eq!(
        strategy.generate().await.as_deref(),
        Some("page: Example Domain")
    );
}

/// title要素の無いページはURL自体がタイトルになる
#[tokio::test]
async fn test_webpage_strategy_falls_back_to_url() {
    let mock = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><body>no title here</body></html>", "text/html"),
        )
        .mount(&mock)
        .await;

    let url = format!("{}/", mock.uri());
    let config = serde_yaml::from_str(&format!(
        r#"
urls: ["{url}"]
prompt_template: "page: {{page_title}}"
"#
    ))
    .unwrap();

    let strategy = WebpageStrategy::from_config(&config, reqwest::Client::new()).unwrap();
    let expected = format!("page: {url}");
    assert_eq!(strategy.generate().await.as_deref(), Some(expected.as_str()));
}

/// HTTPエラーを返すソースは「プロンプトなし」に畳み込まれる
#[tokio::test]
async fn test_news_strategy_http_error_yields_none() {
    let mock = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock)
        .await;

    let config = serde_yaml::from_str(&format!(
        r#"
rss_urls: ["{}/feed.xml"]
prompt_template: "news: {{news_title}}"
"#,
        mock.uri()
    ))
    .unwrap();

    let strategy = NewsStrategy::from_config(&config, reqwest::Client::new()).unwrap();
    assert!(strategy.generate().await.is_none());
}
