//! Integration tests for the RPL language server lifecycle and request handling

use rpl_lsp::{types::ServerState, LspServer};
use serde_json::json;

async fn initialized_server() -> LspServer {
    let mut server = LspServer::new();
    server
        .handle_initialize(json!({ "capabilities": {} }))
        .await
        .unwrap();
    server.handle_initialized().await.unwrap();
    server
}

#[tokio::test]
async fn test_server_initialization() {
    let server = LspServer::new();
    assert_eq!(server.state(), ServerState::Initializing);

    let caps = server.capabilities();
    assert!(caps.completion_provider);
    assert!(caps.document_formatting_provider);
    assert_eq!(caps.text_document_sync, 1);
}

#[tokio::test]
async fn test_initialize_result() {
    let mut server = LspServer::new();
    let result = server
        .handle_initialize(json!({ "capabilities": { "textDocument": {} } }))
        .await
        .unwrap();

    assert_eq!(result["serverInfo"]["name"], "rpl-lsp");
    assert_eq!(result["serverInfo"]["languageId"], "rpl");
    assert!(result["capabilities"]["completionProvider"]["triggerCharacters"].is_array());
    assert!(server.client_capabilities().is_some());

    // A second initialize is rejected once initialized
    server.handle_initialized().await.unwrap();
    assert!(server.handle_initialize(json!({})).await.is_err());
}

#[tokio::test]
async fn test_server_state_transitions() {
    let mut server = LspServer::new();
    assert_eq!(server.state(), ServerState::Initializing);

    server
        .handle_initialize(json!({ "capabilities": {} }))
        .await
        .unwrap();
    assert_eq!(server.state(), ServerState::Initializing);

    server.handle_initialized().await.unwrap();
    assert_eq!(server.state(), ServerState::Initialized);

    server.handle_shutdown().await.unwrap();
    assert_eq!(server.state(), ServerState::ShuttingDown);

    server.handle_exit().await.unwrap();
    assert_eq!(server.state(), ServerState::ShutDown);
    assert!(server.shutdown_requested());
}

#[tokio::test]
async fn test_shutdown_requires_initialized() {
    let mut server = LspServer::new();
    assert!(server.handle_shutdown().await.is_err());
}

#[tokio::test]
async fn test_document_lifecycle() {
    let mut server = initialized_server().await;
    let uri = "file:///patterns/transmute.rpl";

    assert_eq!(server.get_document(uri), None);

    server
        .handle_did_open(json!({
            "textDocument": {
                "uri": uri,
                "languageId": "rpl",
                "version": 1,
                "text": "patt { $a }"
            }
        }))
        .await
        .unwrap();
    assert_eq!(server.get_document(uri), Some("patt { $a }"));

    server
        .handle_did_change(json!({
            "textDocument": { "uri": uri, "version": 2 },
            "contentChanges": [{ "text": "patt { $a $b }" }]
        }))
        .await
        .unwrap();
    assert_eq!(server.get_document(uri), Some("patt { $a $b }"));

    server
        .handle_did_close(json!({ "textDocument": { "uri": uri } }))
        .await
        .unwrap();
    assert_eq!(server.get_document(uri), None);
}

#[tokio::test]
async fn test_did_open_missing_text() {
    let mut server = initialized_server().await;
    let result = server
        .handle_did_open(json!({ "textDocument": { "uri": "file:///a.rpl" } }))
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_completion_request() {
    let mut server = initialized_server().await;
    let uri = "file:///a.rpl";
    server.set_document(
        uri.to_string(),
        "use std::mem::transmute;\npatt { let $src: T = _; $dst }".to_string(),
    );

    let result = server
        .handle_completion(json!({
            "textDocument": { "uri": uri },
            "position": { "line": 1, "character": 10 }
        }))
        .await
        .unwrap();

    let items = result.as_array().unwrap();
    let labels: Vec<&str> = items.iter().filter_map(|i| i["label"].as_str()).collect();
    for expected in ["src", "dst", "transmute", "patt", "Transmute", "without!", "fn", "pub fn"] {
        assert!(labels.contains(&expected), "missing completion {}", expected);
    }
}

#[tokio::test]
async fn test_formatting_request_is_identity_by_default() {
    let mut server = initialized_server().await;
    let uri = "file:///a.rpl";
    let text = "patt {\n    $x   \n}\n";
    server.set_document(uri.to_string(), text.to_string());

    let result = server
        .handle_formatting(json!({
            "textDocument": { "uri": uri },
            "options": { "tabSize": 4, "insertSpaces": true }
        }))
        .await
        .unwrap();

    let edits = result.as_array().unwrap();
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0]["newText"], text);
    assert_eq!(edits[0]["range"]["end"]["line"], 3);
    assert_eq!(edits[0]["range"]["end"]["character"], 0);
}
