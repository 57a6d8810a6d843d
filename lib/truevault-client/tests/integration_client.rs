// lib/truevault-client/tests/integration_client.rs

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use truevault_client::{ErrorKind, TrueVaultError, VaultClient};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "0b5e6e5a-7a8c-4b2f-9a3d-5c7e1f2d3b4a";
const VAULT_ID: &str = "a7f5b7c2-3d4e-4f50-8a9b-0c1d2e3f4a5b";
const REDACTED: &str = "<REDACTED>";

fn mock_client(mock_uri: &str) -> VaultClient {
    VaultClient::builder()
        .api_key(API_KEY)
        .account_id("test-account")
        .base_url(mock_uri)
        .build()
        .unwrap()
}

fn basic_auth() -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:", API_KEY)))
}

#[tokio::test]
async fn test_health_check() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/"))
        .and(header("Authorization", basic_auth().as_str()))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": "success",
            "message": "Hello from API."
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server.uri());
    let health = client.health_check().await.expect("health check should succeed");

    assert!(health.is_success());
    assert_eq!(
        health.get("message").and_then(|m| m.as_str()),
        Some("Hello from API.")
    );
}

#[tokio::test]
async fn test_list_vaults() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/vaults"))
        .and(header("Authorization", basic_auth().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": "success",
            "transaction_id": REDACTED,
            "vaults": [
                {"id": VAULT_ID, "name": "patients", "account_id": "test-account"}
            ]
        })))
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server.uri());
    let response = client.list_vaults().await.expect("should list vaults");

    assert_eq!(response.result(), Some("success"));
    assert_eq!(response.transaction_id(), Some(REDACTED));
    assert!(response.get("vaults").is_some_and(|v| v.is_array()));

    let vaults = response.vaults().unwrap();
    assert_eq!(vaults.len(), 1);
    assert_eq!(vaults[0].id, VAULT_ID);
}

#[tokio::test]
async fn test_create_document() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/v1/vaults/{}/documents", VAULT_ID)))
        .and(header("Authorization", basic_auth().as_str()))
        .and(body_json(serde_json::json!({"a": "document"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": "success",
            "transaction_id": REDACTED,
            "document_id": REDACTED
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server.uri());
    let response = client
        .create_document(VAULT_ID, &serde_json::json!({"a": "document"}))
        .await
        .expect("should create document");

    assert!(response.is_success());
    assert_eq!(response.transaction_id(), Some(REDACTED));
    let document_id = response.get("document_id").and_then(|d| d.as_str());
    assert!(document_id.is_some_and(|d| !d.is_empty()));
}

#[tokio::test]
async fn test_get_update_delete_document() {
    let mock_server = MockServer::start().await;
    let document_path = format!("/v1/vaults/{}/documents/doc-1", VAULT_ID);

    Mock::given(method("GET"))
        .and(path(document_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": "success",
            "transaction_id": "t-get",
            "document": {"a": "document"}
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path(document_path.as_str()))
        .and(body_json(serde_json::json!({"a": "changed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": "success",
            "transaction_id": "t-put",
            "document_id": "doc-1"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(document_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": "success",
            "transaction_id": "t-delete"
        })))
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server.uri());

    let fetched = client.get_document(VAULT_ID, "doc-1").await.unwrap();
    assert_eq!(fetched.transaction_id(), Some("t-get"));
    assert_eq!(
        fetched.get("document"),
        Some(&serde_json::json!({"a": "document"}))
    );

    let updated = client
        .update_document(VAULT_ID, "doc-1", &serde_json::json!({"a": "changed"}))
        .await
        .unwrap();
    assert_eq!(updated.transaction_id(), Some("t-put"));

    let deleted = client.delete_document(VAULT_ID, "doc-1").await.unwrap();
    assert!(deleted.is_success());
    assert_eq!(deleted.transaction_id(), Some("t-delete"));
}

#[tokio::test]
async fn test_api_version_prefixes_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/vaults"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": "success",
            "transaction_id": "t",
            "vaults": []
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = VaultClient::builder()
        .api_key(API_KEY)
        .api_version("v2")
        .base_url(mock_server.uri())
        .build()
        .unwrap();

    let response = client.list_vaults().await.unwrap();
    assert!(response.vaults().unwrap().is_empty());
}

#[tokio::test]
async fn test_error_status_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/vaults"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "result": "error",
            "transaction_id": "t-401",
            "error": {"code": "AUTH.INVALID_API_KEY", "message": "Invalid API key"}
        })))
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server.uri());
    let err = client.list_vaults().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.status(), Some(401));
    match err {
        TrueVaultError::Status {
            body,
            response_data,
            ..
        } => {
            assert!(body.contains("AUTH.INVALID_API_KEY"));
            let data = response_data.expect("JSON error body should be parsed");
            assert_eq!(data["transaction_id"], "t-401");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_error_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("/v1/vaults/{}/documents/missing", VAULT_ID)))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server.uri());
    let err = client.delete_document(VAULT_ID, "missing").await.unwrap_err();

    match err {
        TrueVaultError::Status {
            status,
            body,
            response_data,
        } => {
            assert_eq!(status, 404);
            assert_eq!(body, "Not Found");
            assert!(response_data.is_none());
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_undecodable_success_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server.uri());
    let err = client.health_check().await.unwrap_err();

    assert!(matches!(err, TrueVaultError::Decode(_)));
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let client = mock_client("http://127.0.0.1:1");
    let err = client.health_check().await.unwrap_err();

    assert!(matches!(err, TrueVaultError::Request(_)));
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_user_agent_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/"))
        .and(header("User-Agent", "truevault-tests/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": "success",
            "message": "Hello from API."
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = VaultClient::builder()
        .api_key(API_KEY)
        .base_url(mock_server.uri())
        .user_agent("truevault-tests/1.0")
        .build()
        .unwrap();

    assert!(client.health_check().await.unwrap().is_success());
}

#[tokio::test]
async fn test_shared_client_across_tasks() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/vaults"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": "success",
            "transaction_id": "t",
            "vaults": []
        })))
        .expect(4)
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server.uri());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.list_vaults().await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().unwrap().is_success());
    }
}

#[tokio::test]
async fn test_ids_are_percent_encoded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/vaults/a%2Fb%3Fc/documents/doc%231"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": "success",
            "transaction_id": "t-encoded"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server.uri());
    let response = client.get_document("a/b?c", "doc#1").await.unwrap();

    assert_eq!(response.transaction_id(), Some("t-encoded"));
}

#[tokio::test]
async fn test_query_in_id_does_not_reach_other_endpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/vaults/evil"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": "success",
            "hit": "wrong-endpoint"
        })))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/v1/vaults/other"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": "success",
            "hit": "wrong-endpoint"
        })))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server.uri());

    let err = client.get_document("evil?x=", "doc-1").await.unwrap_err();
    assert_eq!(err.status(), Some(404));

    let err = client
        .delete_document(VAULT_ID, "../../other")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_blank_ids_are_rejected_before_sending() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server.uri());

    let err = client.get_document(VAULT_ID, "").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = client.get_document(" ", "doc-1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = client.get_blob(VAULT_ID, "..").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = client.get_user("").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}
