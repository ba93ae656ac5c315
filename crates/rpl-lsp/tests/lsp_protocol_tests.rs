//! Drives the server run loop over in-memory streams

use rpl_lsp::transport::{frame, LspMessage, Transport};
use rpl_lsp::LspServer;
use serde_json::{json, Value};

/// Frame every message and concatenate them into one input stream
fn session(messages: &[Value]) -> String {
    messages.iter().map(|m| frame(&m.to_string())).collect()
}

/// Run a server over `input` and collect every response it wrote
async fn run_session(input: &str) -> (LspServer, Vec<Value>) {
    let mut server = LspServer::new();
    let mut transport = Transport::new(input.as_bytes(), Vec::new());
    server.run(&mut transport).await.unwrap();

    let (_, written) = transport.into_inner();
    let written = String::from_utf8(written).unwrap();

    let mut output = Transport::new(written.as_bytes(), Vec::new());
    let mut responses = Vec::new();
    while let Some(message) = output.read_message().await.unwrap() {
        match message {
            LspMessage::Response(resp) => responses.push(serde_json::to_value(resp).unwrap()),
            other => panic!("server wrote a non-response: {:?}", other),
        }
    }

    (server, responses)
}

#[tokio::test]
async fn test_full_session() {
    let uri = "file:///p.rpl";
    let input = session(&[
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {"capabilities": {}}}),
        json!({"jsonrpc": "2.0", "method": "initialized", "params": {}}),
        json!({"jsonrpc": "2.0", "method": "textDocument/didOpen", "params": {
            "textDocument": {"uri": uri, "languageId": "rpl", "version": 1, "text": "fn deref($p: u8) {}"}
        }}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "textDocument/completion", "params": {
            "textDocument": {"uri": uri}, "position": {"line": 0, "character": 3}
        }}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "textDocument/formatting", "params": {
            "textDocument": {"uri": uri}, "options": {"tabSize": 4, "insertSpaces": true}
        }}),
        json!({"jsonrpc": "2.0", "id": 4, "method": "shutdown"}),
        json!({"jsonrpc": "2.0", "method": "exit"}),
    ]);

    let (server, responses) = run_session(&input).await;

    assert!(server.shutdown_requested());
    assert_eq!(responses.len(), 4);

    assert_eq!(responses[0]["id"], 1);
    assert!(responses[0]["result"]["capabilities"]["completionProvider"].is_object());

    assert_eq!(responses[1]["id"], 2);
    let items = responses[1]["result"].as_array().unwrap();
    assert!(items
        .iter()
        .any(|i| i["label"] == "deref" && i["detail"] == "RPL Function"));
    assert!(items
        .iter()
        .any(|i| i["label"] == "p" && i["detail"] == "RPL Metavariable"));

    assert_eq!(responses[2]["id"], 3);
    assert_eq!(responses[2]["result"][0]["newText"], "fn deref($p: u8) {}");

    assert_eq!(responses[3]["id"], 4);
    assert!(responses[3]["result"].is_null());
}

#[tokio::test]
async fn test_errors_are_reported_and_loop_continues() {
    let input = session(&[
        json!({"jsonrpc": "2.0", "id": 1, "method": "textDocument/completion", "params": {}}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "initialize", "params": {}}),
        json!({"jsonrpc": "2.0", "method": "initialized"}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "textDocument/definition", "params": {}}),
        json!({"jsonrpc": "2.0", "id": 4, "method": "textDocument/completion", "params": {
            "textDocument": {"uri": "file:///nowhere.rpl"}, "position": {"line": 0, "character": 0}
        }}),
    ]);

    let (server, responses) = run_session(&input).await;

    // Input ended without shutdown/exit
    assert!(!server.shutdown_requested());
    assert_eq!(responses.len(), 4);
    assert_eq!(responses[0]["error"]["code"], -32600);
    assert!(responses[1]["result"].is_object());
    assert_eq!(responses[2]["error"]["code"], -32601);
    assert_eq!(responses[3]["error"]["code"], -32602);
}

#[tokio::test]
async fn test_malformed_body_is_skipped() {
    let input = format!(
        "{}{}",
        frame("{ this is not json"),
        session(&[json!({"jsonrpc": "2.0", "id": 9, "method": "initialize", "params": {}})])
    );

    let (_, responses) = run_session(&input).await;
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], 9);
}

#[tokio::test]
async fn test_oversized_frame_does_not_stop_server() {
    let input = format!(
        "Content-Length: 18446744073709551615\r\n\r\n{}",
        session(&[json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}})])
    );

    let (_, responses) = run_session(&input).await;
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], 1);
    assert!(responses[0]["result"]["capabilities"].is_object());
}

#[tokio::test]
async fn test_frame_without_content_length_loses_only_itself() {
    let input = format!(
        "Content-Type: application/vscode-jsonrpc\r\n\r\n{}{}",
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
        session(&[json!({"jsonrpc": "2.0", "id": 2, "method": "initialize", "params": {}})])
    );

    let (_, responses) = run_session(&input).await;
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], 2);
}
