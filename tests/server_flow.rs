//! End-to-end protocol tests
//!
//! Drive the server through its JSON-RPC surface against a scratch tools
//! directory: discovery, listing, meta tools, execution, and resources.

use armory_mcp::config::ServerConfig;
use armory_mcp::mcp::McpServer;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[cfg(unix)]
fn write_tool(dir: &Path, name: &str, script: &str) {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
}

fn server_for(root: &Path) -> McpServer {
    let config = ServerConfig {
        tools_root: root.to_path_buf(),
        help_timeout: Duration::from_secs(5),
        exec_timeout: Duration::from_secs(10),
        cache_ttl: Duration::from_secs(300),
        ..ServerConfig::default()
    };
    McpServer::new(Arc::new(config))
}

async fn request(server: &McpServer, body: Value) -> Value {
    let line = serde_json::to_string(&body).unwrap();
    let response = server.handle_line(&line).await.expect("expected a response");
    serde_json::to_value(response).unwrap()
}

/// The nmap_scan fixture: help text on --help, argument echo otherwise
const NMAP_SCAN: &str = r#"#!/bin/sh
if [ "$1" = "--help" ]; then
  echo "Usage: nmap_scan --target <host> --ports <ports> [--verbose]"
  exit 0
fi
printf '%s\n' "$@"
"#;

#[cfg(unix)]
#[tokio::test]
async fn initialize_reports_capabilities() {
    let root = TempDir::new().unwrap();
    let server = server_for(root.path());

    let resp = request(
        &server,
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
    )
    .await;

    assert_eq!(resp["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(resp["result"]["serverInfo"]["name"], "armory-mcp");
    assert!(resp["result"]["capabilities"]["tools"].is_object());
}

#[cfg(unix)]
#[tokio::test]
async fn notifications_get_no_response() {
    let root = TempDir::new().unwrap();
    let server = server_for(root.path());

    let line = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
    assert!(server.handle_line(line).await.is_none());
}

#[cfg(unix)]
#[tokio::test]
async fn list_tools_projects_schemas_and_meta_tools() {
    let root = TempDir::new().unwrap();
    write_tool(root.path(), "nmap_scan", NMAP_SCAN);
    let server = server_for(root.path());

    let resp = request(
        &server,
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
    )
    .await;

    let tools = resp["result"]["tools"].as_array().unwrap();
    let names: Vec<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();

    assert!(names.contains(&"nmap_scan"));
    for meta in ["list_categories", "get_tool_help", "search_tools"] {
        assert!(names.contains(&meta), "missing meta tool {meta}");
    }

    let nmap = tools.iter().find(|t| t["name"] == "nmap_scan").unwrap();
    let schema = &nmap["inputSchema"];
    assert_eq!(schema["properties"]["target"]["type"], "string");
    assert_eq!(schema["properties"]["ports"]["type"], "string");
    assert_eq!(schema["properties"]["verbose"]["type"], "boolean");
    assert!(schema["required"]
        .as_array()
        .unwrap()
        .contains(&json!("target")));
}

#[cfg(unix)]
#[tokio::test]
async fn call_tool_reconstructs_argument_vector() {
    let root = TempDir::new().unwrap();
    write_tool(root.path(), "nmap_scan", NMAP_SCAN);
    let server = server_for(root.path());

    let resp = request(
        &server,
        json!({
            "jsonrpc": "2.0", "id": 3, "method": "tools/call",
            "params": {
                "name": "nmap_scan",
                "arguments": {"target": "10.0.0.5", "ports": "80,443", "verbose": true}
            }
        }),
    )
    .await;

    assert_eq!(resp["result"]["isError"], false);
    let text = resp["result"]["content"][0]["text"].as_str().unwrap();
    // The fixture echoes one argv entry per line
    assert!(text.contains("--target\n10.0.0.5\n--ports\n80,443\n--verbose"));
}

#[cfg(unix)]
#[tokio::test]
async fn call_tool_unknown_name_is_error_envelope_not_failure() {
    let root = TempDir::new().unwrap();
    let server = server_for(root.path());

    let resp = request(
        &server,
        json!({
            "jsonrpc": "2.0", "id": 4, "method": "tools/call",
            "params": {"name": "no_such_tool", "arguments": {}}
        }),
    )
    .await;

    // RPC-level success: the failure travels inside the envelope
    assert!(resp["error"].is_null());
    assert_eq!(resp["result"]["isError"], true);
    let text = resp["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("Tool not found"));
}

#[cfg(unix)]
#[tokio::test]
async fn meta_tools_answer_from_cache() {
    let root = TempDir::new().unwrap();
    write_tool(root.path(), "nmap_scan", NMAP_SCAN);
    let server = server_for(root.path());

    let categories = request(
        &server,
        json!({
            "jsonrpc": "2.0", "id": 5, "method": "tools/call",
            "params": {"name": "list_categories"}
        }),
    )
    .await;
    let text = categories["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("reconnaissance"));

    let help = request(
        &server,
        json!({
            "jsonrpc": "2.0", "id": 6, "method": "tools/call",
            "params": {"name": "get_tool_help", "arguments": {"tool_name": "nmap_scan"}}
        }),
    )
    .await;
    let text = help["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("/nmap_scan"));
    assert!(text.contains("Usage: nmap_scan"));

    let missing = request(
        &server,
        json!({
            "jsonrpc": "2.0", "id": 7, "method": "tools/call",
            "params": {"name": "get_tool_help", "arguments": {"tool_name": "ghost"}}
        }),
    )
    .await;
    assert_eq!(missing["result"]["isError"], true);

    let search = request(
        &server,
        json!({
            "jsonrpc": "2.0", "id": 8, "method": "tools/call",
            "params": {"name": "search_tools", "arguments": {"query": "nmap"}}
        }),
    )
    .await;
    let text = search["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("nmap_scan"));
}

#[cfg(unix)]
#[tokio::test]
async fn list_categories_follows_precedence_order() {
    let root = TempDir::new().unwrap();
    write_tool(root.path(), "nmap_scan", NMAP_SCAN);
    // Sorts before nmap_scan by name, but its category ranks after
    // reconnaissance in the precedence table
    write_tool(
        root.path(),
        "hydra",
        "#!/bin/sh\necho \"Usage: hydra --target <host> password login attacks\"\n",
    );
    let server = server_for(root.path());

    let resp = request(
        &server,
        json!({
            "jsonrpc": "2.0", "id": 20, "method": "tools/call",
            "params": {"name": "list_categories"}
        }),
    )
    .await;

    let text = resp["result"]["content"][0]["text"].as_str().unwrap();
    let listing: Value = serde_json::from_str(text).unwrap();
    let categories: Vec<&str> = listing
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|entry| entry["category"].as_str())
        .collect();

    assert_eq!(categories, vec!["reconnaissance", "credential"]);
    assert_eq!(listing[0]["tools"], 1);
    assert_eq!(listing[1]["tools"], 1);
}

#[cfg(unix)]
#[tokio::test]
async fn resources_list_and_read() {
    let root = TempDir::new().unwrap();
    write_tool(root.path(), "nmap_scan", NMAP_SCAN);
    let server = server_for(root.path());

    let listed = request(
        &server,
        json!({"jsonrpc": "2.0", "id": 9, "method": "resources/list"}),
    )
    .await;
    let uris: Vec<&str> = listed["result"]["resources"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["uri"].as_str())
        .collect();
    assert_eq!(uris, vec!["armory://docs", "armory://catalog"]);

    let docs = request(
        &server,
        json!({
            "jsonrpc": "2.0", "id": 10, "method": "resources/read",
            "params": {"uri": "armory://docs"}
        }),
    )
    .await;
    let text = docs["result"]["contents"][0]["text"].as_str().unwrap();
    assert!(text.contains("# Tool Catalog"));
    assert!(text.contains("nmap_scan"));

    let catalog = request(
        &server,
        json!({
            "jsonrpc": "2.0", "id": 11, "method": "resources/read",
            "params": {"uri": "armory://catalog"}
        }),
    )
    .await;
    let text = catalog["result"]["contents"][0]["text"].as_str().unwrap();
    let parsed: Value = serde_json::from_str(text).unwrap();
    assert_eq!(parsed[0]["name"], "nmap_scan");

    let unknown = request(
        &server,
        json!({
            "jsonrpc": "2.0", "id": 12, "method": "resources/read",
            "params": {"uri": "armory://nope"}
        }),
    )
    .await;
    assert_eq!(unknown["error"]["code"], -32602);
}

#[cfg(unix)]
#[tokio::test]
async fn unknown_method_and_bad_json_are_rejected() {
    let root = TempDir::new().unwrap();
    let server = server_for(root.path());

    let resp = request(
        &server,
        json!({"jsonrpc": "2.0", "id": 13, "method": "prompts/list"}),
    )
    .await;
    assert_eq!(resp["error"]["code"], -32601);

    let garbage = server.handle_line("{not json").await.unwrap();
    let garbage = serde_json::to_value(garbage).unwrap();
    assert_eq!(garbage["error"]["code"], -32700);
}

#[cfg(unix)]
#[tokio::test]
async fn short_help_output_tool_never_listed() {
    let root = TempDir::new().unwrap();
    // Four characters of output on every variant
    write_tool(root.path(), "terse", "#!/bin/sh\nprintf 'ok42'\n");
    let server = server_for(root.path());

    let resp = request(
        &server,
        json!({"jsonrpc": "2.0", "id": 14, "method": "tools/list"}),
    )
    .await;
    let names: Vec<&str> = resp["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    assert!(!names.contains(&"terse"));
}
