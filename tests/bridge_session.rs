//! Integration tests for the bridge gateway.
//!
//! Each test spawns orbd with a temporary config and drives it over the
//! JSON-lines protocol.

mod common;

use common::TestServer;
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn test_launch_and_query_configuration() {
    let server = TestServer::spawn().await.expect("Failed to spawn test server");
    let mut client = server.connect().await.expect("Failed to connect");

    let token = client.launch(1).await.expect("Launch failed");
    assert!(token["payload"].is_string());
    assert!(token["signature"].is_string());

    let response = client
        .request("Configuration.getCountryId", &token, json!({}))
        .await
        .unwrap();
    assert_eq!(response, json!({ "result": "GBR" }));

    let response = client
        .request("Broadcast.getCurrentChannel", &token, json!({}))
        .await
        .unwrap();
    assert_eq!(response["result"]["ccid"], "ccid:dvbt.1");
}

#[tokio::test]
async fn test_unknown_method_and_forged_token_are_indistinguishable() {
    let server = TestServer::spawn().await.unwrap();
    let mut client = server.connect().await.unwrap();
    let token = client.launch(1).await.unwrap();

    let unknown = client
        .request("Broadcast.selfDestruct", &token, json!({}))
        .await
        .unwrap();
    assert_eq!(unknown, json!({ "error": "Unknown method" }));

    let mut forged = token.clone();
    forged["payload"] = json!(r#"{"appId":3,"uri":"http://127.0.0.1/runner.html","origin":"http://127.0.0.1"}"#);
    let response = client
        .request("Configuration.getCountryId", &forged, json!({}))
        .await
        .unwrap();
    assert_eq!(response, unknown);
}

#[tokio::test]
async fn test_security_levels_follow_running_app() {
    let server = TestServer::spawn().await.unwrap();
    let mut client = server.connect().await.unwrap();

    let red = client.launch(1).await.unwrap();
    let portal = client.launch(2).await.unwrap();

    // App 1 is no longer running.
    let response = client
        .request("Broadcast.setChannelToNull", &red, json!({}))
        .await
        .unwrap();
    assert_eq!(response, json!({ "error": "SecurityError" }));

    // App 2 runs but is broadcast-independent.
    let response = client
        .request("Broadcast.setChannelToCcid", &portal, json!({ "ccid": "ccid:dvbt.2" }))
        .await
        .unwrap();
    assert_eq!(response, json!({ "error": "SecurityError" }));

    // AnyApp methods stay open to a stale token.
    let response = client
        .request("Configuration.getPreferredUILanguage", &red, json!({}))
        .await
        .unwrap();
    assert_eq!(response, json!({ "result": "eng" }));
}

#[tokio::test]
async fn test_channel_change_event_follows_response() {
    let server = TestServer::spawn().await.unwrap();
    let mut client = server.connect().await.unwrap();
    let token = client.launch(1).await.unwrap();

    client
        .send(json!({
            "type": "request",
            "id": 42,
            "method": "Broadcast.setChannelToCcid",
            "token": token,
            "params": { "ccid": "ccid:dvbt.2" },
        }))
        .await
        .unwrap();

    let first = client.recv().await.unwrap();
    assert_eq!(first["type"], "response");
    assert_eq!(first["id"], 42);

    let event = client.expect_event("ChannelStatusChanged").await.unwrap();
    assert_eq!(event["properties"]["servId"], 4228);
}

#[tokio::test]
async fn test_events_reach_every_client() {
    let server = TestServer::spawn().await.unwrap();
    let mut driver = server.connect().await.unwrap();
    let mut observer = server.connect().await.unwrap();

    // A round trip guarantees the observer is subscribed.
    observer.send(json!({ "type": "stop", "app": 99 })).await.unwrap();
    assert_eq!(observer.recv_reply().await.unwrap()["type"], "stopped");

    let token = driver.launch(1).await.unwrap();

    let response = driver
        .request("Broadcast.setChannelToCcid", &token, json!({ "ccid": "ccid:dvbt.2" }))
        .await
        .unwrap();
    assert!(response.get("result").is_some());

    let event = observer.expect_event("ChannelStatusChanged").await.unwrap();
    assert_eq!(event["properties"]["servId"], 4228);
}

#[tokio::test]
async fn test_parameter_errors_are_reported() {
    let server = TestServer::spawn().await.unwrap();
    let mut client = server.connect().await.unwrap();
    let token = client.launch(1).await.unwrap();

    let response = client
        .request("Broadcast.setChannelToCcid", &token, json!({}))
        .await
        .unwrap();
    assert_eq!(response, json!({ "error": "missing parameter: ccid" }));
}

#[tokio::test]
async fn test_debug_methods_absent_without_test_reports() {
    let server = TestServer::spawn_with(false).await.unwrap();
    let mut client = server.connect().await.unwrap();
    let token = client.launch(3).await.unwrap();

    let response = client
        .request(
            "Debug.publishTestReport",
            &token,
            json!({ "testSuite": "suite", "xml": "<testcase/>" }),
        )
        .await
        .unwrap();
    assert_eq!(response, json!({ "error": "Unknown method" }));
}

#[tokio::test]
async fn test_protocol_errors() {
    let server = TestServer::spawn().await.unwrap();
    let mut client = server.connect().await.unwrap();

    client.send_raw("this is not json").await.unwrap();
    let reply = client.recv_reply().await.unwrap();
    assert_eq!(reply["type"], "error");
    assert!(reply["message"].as_str().unwrap().starts_with("malformed frame"));

    client.send(json!({ "type": "launch", "app": 99 })).await.unwrap();
    let reply = client.recv_reply().await.unwrap();
    assert_eq!(reply, json!({ "type": "error", "message": "unknown application 99" }));

    // The connection survives both.
    client.send(json!({ "type": "stop", "app": 1 })).await.unwrap();
    let reply = client.recv_reply().await.unwrap();
    assert_eq!(reply, json!({ "type": "stopped", "appId": 1 }));
}

#[tokio::test]
async fn test_undecodable_lines_keep_the_connection() {
    let server = TestServer::spawn().await.unwrap();
    let mut client = server.connect().await.unwrap();

    client.send_bytes(b"\xff\xfe\n").await.unwrap();
    let reply = client.recv_reply().await.unwrap();
    assert_eq!(reply["type"], "error");
    assert!(reply["message"].as_str().unwrap().starts_with("malformed frame"));

    client.send(json!({ "type": "stop", "app": 1 })).await.unwrap();
    let reply = client.recv_reply().await.unwrap();
    assert_eq!(reply, json!({ "type": "stopped", "appId": 1 }));
}

#[tokio::test]
async fn test_oversized_line_is_skipped() {
    let server = TestServer::spawn().await.unwrap();
    let mut client = server.connect().await.unwrap();

    let mut line = vec![b'a'; 70 * 1024];
    line.push(b'\n');
    client.send_bytes(&line).await.unwrap();
    let reply = client.recv_reply().await.unwrap();
    assert_eq!(reply["type"], "error");
    assert!(reply["message"].as_str().unwrap().starts_with("malformed frame"));

    client.send(json!({ "type": "stop", "app": 2 })).await.unwrap();
    let reply = client.recv_reply().await.unwrap();
    assert_eq!(reply, json!({ "type": "stopped", "appId": 2 }));
}

#[tokio::test]
async fn test_idle_client_receives_nothing() {
    let server = TestServer::spawn().await.unwrap();
    let mut client = server.connect().await.unwrap();
    assert!(
        client
            .recv_timeout(Duration::from_millis(200))
            .await
            .is_err()
    );
}
