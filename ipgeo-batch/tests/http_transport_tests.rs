//! Integration tests for the HTTP lookup transport
//!
//! Runs an axum stub of the lookup service on an ephemeral local port.

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use ipgeo_batch::{Field, FieldSet, LookupClient, ResolutionEngine};
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

async fn lookup_handler(
    Path(address): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    match address.as_str() {
        "1.1.1.1" => Json(json!({
            "country": "Australia",
            "isp": "Cloudflare, Inc",
            "lat": -27.4766,
            "mobile": false
        }))
        .into_response(),
        // Echo the received field list back through a requested field
        "echo" => Json(json!({ "country": params.get("fields") })).into_response(),
        "reserved" => Json(json!({
            "status": "fail",
            "message": "reserved range"
        }))
        .into_response(),
        "down" => (StatusCode::SERVICE_UNAVAILABLE, "busy").into_response(),
        "garbage" => (StatusCode::OK, "<html>not json</html>").into_response(),
        "array" => Json(json!(["country"])).into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({ "country": "Late" })).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn spawn_stub_service() -> String {
    let app = Router::new().route("/json/:address", get(lookup_handler));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/json", addr)
}

fn client(endpoint: &str) -> LookupClient {
    LookupClient::http(endpoint, Duration::from_secs(1)).unwrap()
}

#[tokio::test]
async fn test_success_projects_requested_fields() {
    let endpoint = spawn_stub_service().await;
    let fields = FieldSet::new([Field::Country, Field::Isp, Field::Lat, Field::Mobile, Field::City])
        .unwrap();

    let result = client(&endpoint).lookup("1.1.1.1".into(), &fields).await;

    assert!(!result.is_failure());
    assert_eq!(result.get(Field::Country), Some("Australia"));
    assert_eq!(result.get(Field::Isp), Some("Cloudflare, Inc"));
    assert_eq!(result.get(Field::Lat), Some("-27.4766"));
    assert_eq!(result.get(Field::Mobile), Some("false"));
    assert_eq!(result.get(Field::City), Some("Not found"));
}

#[tokio::test]
async fn test_field_list_sent_as_comma_joined_query() {
    let endpoint = spawn_stub_service().await;
    let fields = FieldSet::new([Field::Country, Field::RegionName, Field::Org]).unwrap();

    let result = client(&endpoint).lookup("echo".into(), &fields).await;

    assert_eq!(result.get(Field::Country), Some("country,regionName,org"));
}

#[tokio::test]
async fn test_service_level_fail_is_data_not_error() {
    let endpoint = spawn_stub_service().await;
    let fields = FieldSet::new([Field::Status, Field::Message, Field::Country]).unwrap();

    let result = client(&endpoint).lookup("reserved".into(), &fields).await;

    assert!(!result.is_failure());
    assert_eq!(result.get(Field::Status), Some("fail"));
    assert_eq!(result.get(Field::Message), Some("reserved range"));
    assert_eq!(result.get(Field::Country), Some("Not found"));
}

#[tokio::test]
async fn test_failures_become_markers() {
    let endpoint = spawn_stub_service().await;
    let fields = FieldSet::new([Field::Country, Field::Isp]).unwrap();
    let client = client(&endpoint);

    let down = client.lookup("down".into(), &fields).await;
    assert_eq!(down.get(Field::Country), Some("Error: HTTP status 503"));
    assert_eq!(down.get(Field::Isp), Some("Error: HTTP status 503"));

    let garbage = client.lookup("garbage".into(), &fields).await;
    assert!(garbage
        .get(Field::Country)
        .unwrap()
        .starts_with("Error: malformed payload"));

    let array = client.lookup("array".into(), &fields).await;
    assert_eq!(
        array.get(Field::Isp),
        Some("Error: malformed payload: expected JSON object, got array")
    );

    let slow = client.lookup("slow".into(), &fields).await;
    assert_eq!(slow.get(Field::Country), Some("Error: timeout"));
    assert_eq!(slow.failure(), Some("timeout"));
}

#[tokio::test]
async fn test_connection_refused_becomes_marker() {
    // Bind then drop to get a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let fields = FieldSet::new([Field::Country]).unwrap();
    let result = client(&format!("http://{}/json", addr))
        .lookup("1.1.1.1".into(), &fields)
        .await;

    assert!(result
        .get(Field::Country)
        .unwrap()
        .starts_with("Error: connection failed"));
}

#[tokio::test]
async fn test_batch_over_http_isolates_failures() {
    let endpoint = spawn_stub_service().await;
    let engine = ResolutionEngine::new(client(&endpoint), 4);
    let fields = FieldSet::new([Field::Country]).unwrap();

    let results = engine
        .resolve_batch(
            vec!["1.1.1.1".into(), "down".into(), "garbage".into(), "1.1.1.1".into()],
            &fields,
            |_| {},
            |_| {},
        )
        .await;

    assert_eq!(results.len(), 4);
    assert_eq!(results.failed_count(), 2);
    assert_eq!(results.resolved_count(), 2);
}
