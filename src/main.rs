// Armory MCP Server - Main Entry Point
//
// Serves the Model Context Protocol over stdio. Discovers security CLI
// tools under a configured root, infers their schemas from help output,
// and executes them as bounded subprocesses on behalf of the caller.

use anyhow::Result;
use armory_mcp::config::ServerConfig;
use armory_mcp::mcp::McpServer;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Armory: security-tool discovery and execution over MCP
#[derive(Parser, Debug)]
#[command(name = "armory")]
#[command(author = "Armory Contributors")]
#[command(version)]
#[command(about = "MCP server for discovered security CLI tools", long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Root directory to scan for tool executables
    #[arg(long)]
    tools_root: Option<PathBuf>,

    /// Directory of markdown documentation files
    #[arg(long)]
    docs_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve MCP over stdio (the default)
    Serve,
    /// Run discovery once and print the catalog as JSON
    Scan,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries the JSON-RPC stream; all logs go to stderr
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .init();

    let mut config = ServerConfig::from_env();
    if let Some(root) = args.tools_root {
        config.tools_root = root;
    }
    if let Some(docs) = args.docs_root {
        config.docs_root = Some(docs);
    }

    let server = McpServer::new(Arc::new(config));

    match args.command {
        Some(Commands::Scan) => {
            let tools = server.cache().tools().await;
            println!("{}", serde_json::to_string_pretty(tools.as_slice())?);
            info!("Scan complete: {} tools", tools.len());
        }
        Some(Commands::Serve) | None => {
            server.run_stdio().await?;
        }
    }

    Ok(())
}
