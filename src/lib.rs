//! Armory MCP Server Library
//!
//! Discovers command-line security tools under a filesystem root, infers
//! how to invoke each one from its own `--help` output, and executes tools
//! on behalf of a remote MCP caller under strict time and output bounds.

pub mod config;
pub mod discovery;
pub mod execution;
pub mod mcp;
