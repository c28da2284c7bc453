//! MCP (Model Context Protocol) Server Implementation
//!
//! A pure Rust MCP server built on Tokio and Serde (no external SDK).
//!
//! # Architecture
//!
//! The implementation is organized into three layers:
//!
//! 1. **Protocol Layer** (`protocol`): JSON-RPC 2.0 message types
//! 2. **Resource Layer** (`resources`): the two read-only resources
//! 3. **Server Layer** (`server`): the stdio loop and method dispatch
//!
//! # Design Principles
//!
//! - **Uniform envelopes**: every `tools/call` outcome is a
//!   `CallToolResult`; the transport never sees an unhandled error
//! - **Stateless dispatch**: no per-connection state beyond the shared
//!   discovery cache
//! - **stderr logging**: stdout belongs exclusively to the protocol

pub mod protocol;
pub mod resources;
pub mod server;

pub use protocol::{
    CallToolResult, ContentBlock, InitializeResult, JsonRpcRequest, JsonRpcResponse,
    ResourceContents, ResourceDescriptor, RpcError, ServerInfo, ToolCallParams, ToolDescriptor,
    JSONRPC_VERSION, PROTOCOL_VERSION,
};
pub use resources::{CATALOG_URI, DOCS_URI};
pub use server::McpServer;
