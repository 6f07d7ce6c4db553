use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn mount_monitor(
        server: &MockServer,
        endpoint: &str,
        page: &str,
        status_code: u16,
        body: &str,
    ) {
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/{endpoint}")))
            .and(query_param("page", page))
            .respond_with(ResponseTemplate::new(status_code).set_body_string(body))
            .mount(server)
            .await;
    }

    /// A healthy provider: BCV quotes in regional format, Binance already
    /// dotted-decimal.
    pub async fn mount_healthy_provider(server: &MockServer) {
        mount_monitor(
            server,
            "dollar",
            "bcv",
            200,
            r#"{"monitors": {"bcv": {"price": "100,00", "title": "BCV"}}}"#,
        )
        .await;
        mount_monitor(
            server,
            "euro",
            "bcv",
            200,
            r#"{"monitors": {"bcv": {"price": "108,50", "title": "BCV"}}}"#,
        )
        .await;
        mount_monitor(
            server,
            "dollar",
            "criptodolar",
            200,
            r#"{"monitors": {"binance": {"price": 105.25, "title": "Binance P2P"}}}"#,
        )
        .await;
    }
}

/// Build the application router from a config file pointing at a mock
/// provider, the same path production takes.
fn router_for(mock_uri: &str, failure_policy: &str) -> axum::Router {
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_content = format!(
        r#"
providers:
  pydolar:
    base_url: {mock_uri}
failure_policy: "{failure_policy}"
"#
    );
    std::fs::write(config_file.path(), &config_content).expect("Failed to write config file");

    let config = vdolar::config::AppConfig::load_from_path(config_file.path())
        .expect("Failed to load config");
    vdolar::api::app_router(vdolar::build_state(&config))
}

async fn get_rates(router: axum::Router) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::builder().uri("/rates").body(Body::empty()).unwrap())
        .await
        .expect("request should not fail at the protocol level");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[test_log::test(tokio::test)]
async fn test_full_rates_flow() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_healthy_provider(&mock_server).await;

    let (status, body) = get_rates(router_for(&mock_server.uri(), "isolated")).await;

    info!(?body, "Received rates envelope");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"BCV": 100.0, "EURO": 108.5, "USDT": 105.25, "status": "success"})
    );
}

#[test_log::test(tokio::test)]
async fn test_single_provider_failure_degrades_one_rate() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_monitor(
        &mock_server,
        "dollar",
        "bcv",
        200,
        r#"{"monitors": {"bcv": {"price": "100,00"}}}"#,
    )
    .await;
    test_utils::mount_monitor(&mock_server, "euro", "bcv", 500, "Server Error").await;
    test_utils::mount_monitor(
        &mock_server,
        "dollar",
        "criptodolar",
        200,
        r#"{"monitors": {"binance": {"price": 105.25}}}"#,
    )
    .await;

    let (status, body) = get_rates(router_for(&mock_server.uri(), "isolated")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "BCV": 100.0,
            "EURO": 0.0,
            "USDT": 105.25,
            "status": "success",
            "degraded": ["EURO"]
        })
    );
}

#[test_log::test(tokio::test)]
async fn test_monolithic_policy_returns_error_envelope() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_monitor(&mock_server, "dollar", "bcv", 500, "Server Error").await;

    let (status, body) = get_rates(router_for(&mock_server.uri(), "monolithic")).await;

    // Still a well-formed 200 body, never a protocol-level fault.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("HTTP error: 500 Internal Server Error for monitor: BCV")
    );
    assert!(body.get("BCV").is_none());
}

#[test_log::test(tokio::test)]
async fn test_schema_change_zeroes_all_rates_under_isolated_policy() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_monitor(
        &mock_server,
        "dollar",
        "bcv",
        200,
        r#"{"monitors": {"bcv": {"value": "100,00"}}}"#,
    )
    .await;
    test_utils::mount_monitor(
        &mock_server,
        "euro",
        "bcv",
        200,
        r#"{"monitors": {"bcv": {"value": "108,50"}}}"#,
    )
    .await;
    test_utils::mount_monitor(
        &mock_server,
        "dollar",
        "criptodolar",
        200,
        r#"{"monitors": {"binance": {"value": 105.25}}}"#,
    )
    .await;

    let (status, body) = get_rates(router_for(&mock_server.uri(), "isolated")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "BCV": 0.0,
            "EURO": 0.0,
            "USDT": 0.0,
            "status": "success",
            "degraded": ["BCV", "EURO", "USDT"]
        })
    );
}

#[test_log::test(tokio::test)]
async fn test_rates_flow_is_idempotent() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_healthy_provider(&mock_server).await;

    let (_, first) = get_rates(router_for(&mock_server.uri(), "isolated")).await;
    let (_, second) = get_rates(router_for(&mock_server.uri(), "isolated")).await;

    assert_eq!(first, second);
}
