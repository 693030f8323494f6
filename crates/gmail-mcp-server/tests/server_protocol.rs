mod common;

use common::*;
use gmail_mcp_server::McpServer;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn run_session(server: &MockServer, input: &str) -> Vec<Value> {
    run_bytes(server, input.as_bytes()).await
}

async fn run_bytes(server: &MockServer, input: &[u8]) -> Vec<Value> {
    let tmp = TempDir::new().unwrap();
    let mut mcp = McpServer::new(authed_dispatcher(test_config(&tmp, server)));
    let mut out: Vec<u8> = Vec::new();
    mcp.run(input, &mut out).await.unwrap();
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[tokio::test]
async fn test_initialize_list_and_notifications() {
    let server = MockServer::start().await;
    let input = [
        json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize",
                "params": { "protocolVersion": "2025-03-26", "capabilities": {} } }),
        json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
        json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }),
        json!({ "jsonrpc": "2.0", "id": 3, "method": "ping" }),
    ]
    .iter()
    .map(|v| v.to_string() + "\n")
    .collect::<String>();

    let replies = run_session(&server, &input).await;
    assert_eq!(replies.len(), 3);

    assert_eq!(replies[0]["id"], 1);
    assert_eq!(replies[0]["result"]["protocolVersion"], "2025-03-26");
    assert_eq!(replies[0]["result"]["serverInfo"]["name"], "gmail-mcp");
    assert!(replies[0]["result"]["capabilities"]["tools"].is_object());

    let tools = replies[1]["result"]["tools"].as_array().unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names.len(), 8);
    assert!(!names.contains(&"list_labels"));
    assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));

    assert_eq!(replies[2]["id"], 3);
    assert_eq!(replies[2]["result"], json!({}));
}

#[tokio::test]
async fn test_protocol_errors() {
    let server = MockServer::start().await;
    let input = concat!(
        "this is not json\n",
        "\n",
        "{\"jsonrpc\":\"2.0\",\"id\":\"a\",\"method\":\"resources/list\"}\n",
        "{\"jsonrpc\":\"2.0\",\"id\":\"b\",\"method\":\"tools/call\",\"params\":{}}\n",
    );

    let replies = run_session(&server, input).await;
    assert_eq!(replies.len(), 3);
    assert_eq!(replies[0]["error"]["code"], -32700);
    assert_eq!(replies[0]["id"], Value::Null);
    assert_eq!(replies[1]["id"], "a");
    assert_eq!(replies[1]["error"]["code"], -32601);
    assert_eq!(replies[2]["error"]["code"], -32602);
}

#[tokio::test]
async fn test_non_utf8_line_keeps_serving() {
    let server = MockServer::start().await;
    let mut input = b"\xff\xfe garbage\n".to_vec();
    input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"id\":7,\"method\":\"ping\"}\r\n");

    let replies = run_bytes(&server, &input).await;
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0]["error"]["code"], -32700);
    assert_eq!(replies[0]["id"], Value::Null);
    assert_eq!(replies[1]["id"], 7);
    assert_eq!(replies[1]["result"], json!({}));
}

#[tokio::test]
async fn test_null_id_is_answered() {
    let server = MockServer::start().await;
    let input = concat!(
        "{\"jsonrpc\":\"2.0\",\"id\":null,\"method\":\"ping\"}\n",
        "{\"jsonrpc\":\"2.0\",\"method\":\"ping\"}\n",
    );

    let replies = run_session(&server, input).await;
    assert_eq!(replies.len(), 1);
    assert!(replies[0].get("id").is_some());
    assert_eq!(replies[0]["id"], Value::Null);
    assert_eq!(replies[0]["result"], json!({}));
}

#[tokio::test]
async fn test_tool_call_success_and_tool_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("labels")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "labels": [{ "id": "INBOX", "name": "INBOX", "type": "system" }]
        })))
        .mount(&server)
        .await;

    let input = [
        json!({ "jsonrpc": "2.0", "id": 10, "method": "tools/call",
                "params": { "name": "list_labels" } }),
        json!({ "jsonrpc": "2.0", "id": 11, "method": "tools/call",
                "params": { "name": "send_email",
                            "arguments": { "to": ["not-an-email"], "subject": "s", "body": "b" } } }),
    ]
    .iter()
    .map(|v| v.to_string() + "\n")
    .collect::<String>();

    let replies = run_session(&server, &input).await;
    assert_eq!(replies.len(), 2);

    let ok = &replies[0]["result"];
    assert_eq!(ok["isError"], false);
    assert_eq!(ok["content"][0]["type"], "text");
    let text: Value = serde_json::from_str(ok["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(text["labels"][0]["id"], "INBOX");
    assert_eq!(ok["structuredContent"]["count"], 1);

    let err = &replies[1]["result"];
    assert_eq!(replies[1]["id"], 11);
    assert!(replies[1].get("error").is_none());
    assert_eq!(err["isError"], true);
    assert!(err["content"][0]["text"]
        .as_str()
        .unwrap()
        .starts_with("Error: Invalid arguments:"));
    assert_eq!(err["structuredContent"]["error"]["code"], "E_VALIDATION");
}

#[tokio::test]
async fn test_eof_ends_cleanly() {
    let server = MockServer::start().await;
    assert!(run_session(&server, "").await.is_empty());
}
