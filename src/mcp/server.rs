//! Protocol Front
//!
//! The request/response surface a caller uses to list tools, call tools,
//! and read documentation resources. Speaks JSON-RPC 2.0 over stdio, one
//! message per line; stderr is reserved for logs.
//!
//! Every `tools/call` outcome (success, tool error, engine failure) is
//! wrapped into one uniform [`CallToolResult`] envelope carrying an
//! `isError` flag. Nothing in this layer propagates a panic or an unhandled
//! error to the transport.

use crate::config::ServerConfig;
use crate::discovery::{all_categories, sanitize_name, DiscoveredTool, DiscoveryCache};
use crate::execution::{build_argv, ExecutionError, ToolExecutor};
use crate::mcp::protocol::{
    CallToolResult, InitializeResult, JsonRpcRequest, JsonRpcResponse, ResourceContents, RpcError,
    ServerInfo, ToolCallParams, ToolDescriptor, JSONRPC_VERSION, PROTOCOL_VERSION,
};
use crate::mcp::resources::{
    catalog_json, render_docs, resource_descriptors, CATALOG_URI, DOCS_URI,
};
use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

/// Names of the built-in read-only meta tools
const META_TOOLS: &[&str] = &["list_categories", "get_tool_help", "search_tools"];

/// The MCP server instance
///
/// Owns the discovery cache and the executor; readers receive the cache by
/// reference from here, never through a global.
pub struct McpServer {
    config: Arc<ServerConfig>,
    cache: Arc<DiscoveryCache>,
    executor: ToolExecutor,
}

impl McpServer {
    pub fn new(config: Arc<ServerConfig>) -> Self {
        let cache = Arc::new(DiscoveryCache::new(Arc::clone(&config)));
        let executor = ToolExecutor::new(Arc::clone(&config));
        Self {
            config,
            cache,
            executor,
        }
    }

    /// The shared discovery cache (also used by the `scan` subcommand)
    pub fn cache(&self) -> Arc<DiscoveryCache> {
        Arc::clone(&self.cache)
    }

    /// Serve JSON-RPC over stdin/stdout until EOF
    pub async fn run_stdio(&self) -> Result<()> {
        info!(
            "Serving MCP over stdio (tools root: {})",
            self.config.tools_root.display()
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        while let Some(line) = lines.next_line().await.context("reading stdin")? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line).await {
                let payload =
                    serde_json::to_string(&response).context("serializing response")?;
                stdout.write_all(payload.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
        }

        info!("stdin closed, shutting down");
        Ok(())
    }

    /// Handle one raw JSON-RPC line; `None` means no response is owed
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(err) => {
                warn!("Rejecting unparseable message: {}", err);
                return Some(JsonRpcResponse::err(
                    Value::Null,
                    RpcError::parse_error(err.to_string()),
                ));
            }
        };
        self.dispatch(request).await
    }

    /// Route a parsed request to its handler
    pub async fn dispatch(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != JSONRPC_VERSION {
            return request.id.map(|id| {
                JsonRpcResponse::err(id, RpcError::invalid_request("jsonrpc must be \"2.0\""))
            });
        }

        if request.is_notification() {
            debug!("Notification: {}", request.method);
            return None;
        }
        let id = request.id.unwrap_or(Value::Null);

        debug!("Request: {}", request.method);
        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize()),
            "tools/list" => self.handle_list_tools().await,
            "tools/call" => self.handle_call_tool(request.params).await,
            "resources/list" => Ok(json!({ "resources": resource_descriptors() })),
            "resources/read" => self.handle_read_resource(request.params).await,
            other => Err(RpcError::method_not_found(other)),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::ok(id, result),
            Err(error) => JsonRpcResponse::err(id, error),
        })
    }

    fn handle_initialize(&self) -> Value {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: json!({ "tools": {}, "resources": {} }),
            server_info: ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };
        serde_json::to_value(result).unwrap_or(Value::Null)
    }

    async fn handle_list_tools(&self) -> Result<Value, RpcError> {
        let tools = self.cache.tools().await;

        let mut descriptors: Vec<ToolDescriptor> = tools
            .iter()
            .map(|tool| ToolDescriptor {
                name: tool.name.clone(),
                description: format!("[{}] {}", tool.category, tool.description),
                input_schema: input_schema(tool),
            })
            .collect();
        descriptors.extend(meta_tool_descriptors());

        Ok(json!({ "tools": descriptors }))
    }

    async fn handle_call_tool(&self, params: Option<Value>) -> Result<Value, RpcError> {
        let params: ToolCallParams = parse_params(params)?;
        let args = match params.arguments {
            None => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(RpcError::invalid_params("arguments must be an object"));
            }
        };

        let result = if META_TOOLS.contains(&params.name.as_str()) {
            self.call_meta_tool(&params.name, &args).await
        } else {
            self.call_discovered_tool(&params.name, &args).await
        };

        serde_json::to_value(result).map_err(|e| RpcError::internal_error(e.to_string()))
    }

    /// Execute a discovered tool, folding every failure into the envelope
    async fn call_discovered_tool(&self, name: &str, args: &Map<String, Value>) -> CallToolResult {
        let Some(tool) = self.cache.find(name).await else {
            return CallToolResult::error(format!("Tool not found: {}", name));
        };

        let argv = build_argv(args);
        match self.executor.execute(&tool.path, &argv).await {
            Ok(result) => {
                let exit = result
                    .exit_code
                    .map(|code| code.to_string())
                    .unwrap_or_else(|| "killed".to_string());
                let mut text = format!("Exit code: {}\n", exit);
                if !result.stdout.is_empty() {
                    text.push_str("\n--- stdout ---\n");
                    text.push_str(&result.stdout);
                }
                if !result.stderr.is_empty() {
                    text.push_str("\n--- stderr ---\n");
                    text.push_str(&result.stderr);
                }
                CallToolResult::text(text)
            }
            Err(err @ ExecutionError::Timeout(_)) => {
                CallToolResult::error(format!("{}: {}", tool.name, err))
            }
            Err(err) => CallToolResult::error(format!("Execution failed: {}", err)),
        }
    }

    /// Answer one of the three meta tools from the current cache
    async fn call_meta_tool(&self, name: &str, args: &Map<String, Value>) -> CallToolResult {
        let tools = self.cache.tools().await;

        match name {
            "list_categories" => {
                // Listed in categorizer precedence order, empty buckets omitted
                let listing: Vec<Value> = all_categories()
                    .into_iter()
                    .filter_map(|category| {
                        let count = tools
                            .iter()
                            .filter(|t| t.category.as_str() == category)
                            .count();
                        (count > 0).then(|| json!({ "category": category, "tools": count }))
                    })
                    .collect();
                CallToolResult::text(
                    serde_json::to_string_pretty(&listing).unwrap_or_else(|_| "[]".to_string()),
                )
            }
            "get_tool_help" => {
                let Some(requested) = args.get("tool_name").and_then(Value::as_str) else {
                    return CallToolResult::error("get_tool_help requires a tool_name argument");
                };
                let alias = sanitize_name(requested);
                match tools
                    .iter()
                    .find(|t| t.name == requested || t.name == alias)
                {
                    Some(tool) => CallToolResult::text(format!(
                        "{}\nPath: {}\nCategory: {}\n\n{}",
                        tool.description,
                        tool.path.display(),
                        tool.category,
                        tool.help_text
                    )),
                    None => CallToolResult::error(format!("Tool not found: {}", requested)),
                }
            }
            "search_tools" => {
                let query = args
                    .get("query")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_lowercase();
                let hits: Vec<String> = tools
                    .iter()
                    .filter(|t| {
                        t.name.to_lowercase().contains(&query)
                            || t.description.to_lowercase().contains(&query)
                            || t.category.as_str().contains(&query)
                    })
                    .map(|t| format!("{} [{}]: {}", t.name, t.category, t.description))
                    .collect();
                if hits.is_empty() {
                    CallToolResult::text(format!("No tools matched {:?}", query))
                } else {
                    CallToolResult::text(hits.join("\n"))
                }
            }
            other => CallToolResult::error(format!("Unknown meta tool: {}", other)),
        }
    }

    async fn handle_read_resource(&self, params: Option<Value>) -> Result<Value, RpcError> {
        #[derive(serde::Deserialize)]
        struct ReadParams {
            uri: String,
        }
        let params: ReadParams = parse_params(params)?;
        let tools = self.cache.tools().await;

        let contents = match params.uri.as_str() {
            DOCS_URI => ResourceContents {
                uri: params.uri,
                mime_type: "text/markdown".to_string(),
                text: render_docs(&tools, self.config.docs_root.as_deref()),
            },
            CATALOG_URI => ResourceContents {
                uri: params.uri,
                mime_type: "application/json".to_string(),
                text: catalog_json(&tools),
            },
            other => {
                return Err(RpcError::invalid_params(format!(
                    "Unknown resource URI: {}",
                    other
                )));
            }
        };

        Ok(json!({ "contents": [contents] }))
    }
}

/// Project a discovered tool into its JSON-Schema input shape
///
/// Derived on demand, never stored. The `required` list mirrors the
/// advisory hints from inference; the server itself never rejects a call
/// for omitting one of them.
fn input_schema(tool: &DiscoveredTool) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in &tool.parameters {
        let mut prop = Map::new();
        prop.insert("type".to_string(), json!(param.param_type.as_str()));
        if !param.description.is_empty() {
            prop.insert("description".to_string(), json!(param.description));
        }
        if param.param_type == crate::discovery::ParamType::Array {
            prop.insert("items".to_string(), json!({ "type": "string" }));
        }
        if let Some(default) = &param.default {
            prop.insert("default".to_string(), json!(default));
        }
        properties.insert(param.name.clone(), Value::Object(prop));

        if param.required {
            required.push(param.name.clone());
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Schemas for the three built-in meta tools
fn meta_tool_descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "list_categories".to_string(),
            description: "List the distinct tool categories currently in the catalog".to_string(),
            input_schema: json!({ "type": "object", "properties": {}, "required": [] }),
        },
        ToolDescriptor {
            name: "get_tool_help".to_string(),
            description: "Return the stored description, path, category and raw help text for one tool"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "tool_name": { "type": "string", "description": "Name of the tool to describe" }
                },
                "required": ["tool_name"],
            }),
        },
        ToolDescriptor {
            name: "search_tools".to_string(),
            description: "Search tool names, descriptions and categories by substring".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Case-insensitive substring" }
                },
                "required": ["query"],
            }),
        },
    ]
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Option<Value>) -> Result<T, RpcError> {
    let params = params.ok_or_else(|| RpcError::invalid_params("missing params"))?;
    serde_json::from_value(params).map_err(|err| RpcError::invalid_params(err.to_string()))
}
