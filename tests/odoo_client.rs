//! Integration tests for the Odoo JSON-RPC client against a mock ERP.
//!
//! Covers the authenticate/call contract: session extraction, missing-uid
//! auth failure, remote error propagation, and session-cache behavior.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use approval_gateway::config::OdooConfig;
use approval_gateway::odoo::client::ephemeral_config;
use approval_gateway::odoo::{OdooClient, OdooError};

fn cached_config(base_url: &str, ttl_secs: u64) -> OdooConfig {
    OdooConfig {
        session_ttl: Some(Duration::from_secs(ttl_secs)),
        ..ephemeral_config(base_url)
    }
}

async fn mount_auth_ok(server: &MockServer, expect: u64) {
    Mock::given(method("POST"))
        .and(path("/web/session/authenticate"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "session_id=abc123; Path=/; HttpOnly")
                .set_body_json(json!({ "jsonrpc": "2.0", "result": { "uid": 2 } })),
        )
        .expect(expect)
        .mount(server)
        .await;
}

#[tokio::test]
async fn authenticate_extracts_session_cookie_and_uid() {
    let server = MockServer::start().await;
    mount_auth_ok(&server, 1).await;

    let client = OdooClient::new(ephemeral_config(&server.uri()));
    let session = client.authenticate().await.unwrap();

    assert_eq!(session.uid, 2);
    assert_eq!(session.cookie, "session_id=abc123");
}

#[tokio::test]
async fn authenticate_fails_without_uid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/web/session/authenticate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "result": {} })),
        )
        .mount(&server)
        .await;

    let client = OdooClient::new(ephemeral_config(&server.uri()));
    let err = client.authenticate().await.unwrap_err();
    assert!(matches!(err, OdooError::Auth(_)), "got {err:?}");
}

#[tokio::test]
async fn call_surfaces_remote_error_message() {
    let server = MockServer::start().await;
    mount_auth_ok(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/web/dataset/call_kw"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "error": {
                "message": "Odoo Server Error",
                "data": { "message": "Invalid field 'foo' on model 'product.template'" }
            }
        })))
        .mount(&server)
        .await;

    let client = OdooClient::new(ephemeral_config(&server.uri()));
    let session = client.authenticate().await.unwrap();
    let err = client
        .create(&session, "product.template", json!({ "foo": 1 }))
        .await
        .unwrap_err();

    match err {
        OdooError::Remote(message) => assert!(message.contains("Invalid field")),
        other => panic!("expected Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn create_returns_assigned_record_id() {
    let server = MockServer::start().await;
    mount_auth_ok(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/web/dataset/call_kw"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "result": 42 })),
        )
        .mount(&server)
        .await;

    let client = OdooClient::new(ephemeral_config(&server.uri()));
    let session = client.authenticate().await.unwrap();
    let id = client
        .create(&session, "product.template", json!({ "name": "x" }))
        .await
        .unwrap();
    assert_eq!(id, 42);
}

#[tokio::test]
async fn search_read_returns_rows() {
    let server = MockServer::start().await;
    mount_auth_ok(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/web/dataset/call_kw"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "result": [{ "id": 7, "name": "Goat Curry Cut (by Fresh Farm)", "active": true }]
        })))
        .mount(&server)
        .await;

    let client = OdooClient::new(ephemeral_config(&server.uri()));
    let session = client.authenticate().await.unwrap();
    let rows = client
        .search_read(
            &session,
            "product.template",
            json!([["name", "ilike", "Goat Curry Cut"]]),
            &["id", "name", "active"],
            1,
        )
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], 7);
}

#[tokio::test]
async fn default_config_authenticates_per_operation() {
    let server = MockServer::start().await;
    mount_auth_ok(&server, 2).await;

    let client = OdooClient::new(ephemeral_config(&server.uri()));
    client.session().await.unwrap();
    client.session().await.unwrap();
    // expect(2) on the mock verifies both operations re-authenticated.
}

#[tokio::test]
async fn session_ttl_reuses_cached_session() {
    let server = MockServer::start().await;
    mount_auth_ok(&server, 1).await;

    let client = OdooClient::new(cached_config(&server.uri(), 60));
    let first = client.session().await.unwrap();
    let second = client.session().await.unwrap();

    assert_eq!(first.cookie, second.cookie);
    // expect(1) on the mock verifies the second call hit the cache.
}
