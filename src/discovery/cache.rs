//! Discovery Cache
//!
//! Memoizes the full scan → harvest → infer → categorize pipeline with a
//! time-to-live. The cache entry is replaced wholesale on every rebuild;
//! readers only ever observe a complete catalog, never a partial one.
//!
//! Refreshing is lazy: the protocol front calls [`DiscoveryCache::tools`]
//! before any listing or lookup, and a rebuild happens only when the entry
//! is missing or older than the TTL. The async mutex is held across the
//! rebuild, so two callers racing past an expired TTL trigger exactly one
//! recomputation.

use crate::config::ServerConfig;
use crate::discovery::categorize::{categorize, ToolCategory};
use crate::discovery::harvester::harvest_help_text;
use crate::discovery::inference::{infer_parameters, ToolParameter};
use crate::discovery::scanner::scan_executables;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Maximum stored length for the one-line tool description
const MAX_DESCRIPTION_LEN: usize = 200;

/// One invocable tool in the catalog
///
/// Immutable once constructed; recomputed wholesale on every cache refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredTool {
    /// Sanitized protocol-facing name (lowercase `[a-z0-9_]`)
    pub name: String,

    /// Absolute path of the underlying executable
    pub path: PathBuf,

    /// One-line description taken from the head of the help text
    pub description: String,

    /// Heuristic category bucket
    pub category: ToolCategory,

    /// Inferred parameter list; non-empty, at most 20 entries
    pub parameters: Vec<ToolParameter>,

    /// Raw harvested help text (already truncated by the harvester)
    pub help_text: String,
}

struct CacheEntry {
    tools: Arc<Vec<DiscoveredTool>>,
    refreshed_at: Instant,
}

/// TTL-bound memo of the discovery pipeline
///
/// Owned by the server instance and shared by reference; there is no
/// module-level singleton.
pub struct DiscoveryCache {
    config: Arc<ServerConfig>,
    entry: Mutex<Option<CacheEntry>>,
}

impl DiscoveryCache {
    pub fn new(config: Arc<ServerConfig>) -> Self {
        Self {
            config,
            entry: Mutex::new(None),
        }
    }

    /// Return the current catalog, rebuilding it when stale
    ///
    /// The returned `Arc` stays valid even if a later refresh swaps the
    /// entry underneath.
    pub async fn tools(&self) -> Arc<Vec<DiscoveredTool>> {
        let mut guard = self.entry.lock().await;

        if let Some(entry) = guard.as_ref() {
            if entry.refreshed_at.elapsed() < self.config.cache_ttl {
                return Arc::clone(&entry.tools);
            }
            debug!("Catalog cache expired, rebuilding");
        }

        let tools = Arc::new(build_catalog(&self.config).await);
        *guard = Some(CacheEntry {
            tools: Arc::clone(&tools),
            refreshed_at: Instant::now(),
        });
        tools
    }

    /// Look up one tool by exact name or sanitized alias
    pub async fn find(&self, requested: &str) -> Option<DiscoveredTool> {
        let alias = sanitize_name(requested);
        self.tools()
            .await
            .iter()
            .find(|tool| tool.name == requested || tool.name == alias)
            .cloned()
    }
}

/// Run the full discovery pipeline over the tools root
///
/// Candidates are processed one at a time; a candidate that yields no help
/// text is excluded entirely, and nothing here is fatal for the rest of the
/// catalog.
async fn build_catalog(config: &ServerConfig) -> Vec<DiscoveredTool> {
    let started = Instant::now();
    let candidates = scan_executables(&config.tools_root);

    let mut tools = Vec::new();
    for path in candidates {
        let Some(help_text) = harvest_help_text(&path, config.help_timeout).await else {
            debug!("Excluding {} (no usable help output)", path.display());
            continue;
        };

        let name = tool_name_for(&path);
        let parameters = infer_parameters(&help_text);
        let category = categorize(&name, &help_text);
        let description = summarize(&help_text);

        tools.push(DiscoveredTool {
            name,
            path,
            description,
            category,
            parameters,
            help_text,
        });
    }

    // Deterministic listing order for callers; discovery order carries no meaning
    tools.sort_by(|a, b| a.name.cmp(&b.name));

    info!(
        "Discovered {} tools under {} in {:?}",
        tools.len(),
        config.tools_root.display(),
        started.elapsed()
    );
    tools
}

/// Derive the protocol-facing tool name from an executable path
fn tool_name_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("tool");
    sanitize_name(stem)
}

/// Normalize a name to a valid MCP tool identifier
///
/// Lowercases and maps every non-alphanumeric run to a single underscore.
pub fn sanitize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_sep = true;
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('_');
            last_was_sep = true;
        }
    }
    let trimmed = out.trim_end_matches('_');
    if trimmed.is_empty() {
        "tool".to_string()
    } else {
        trimmed.to_string()
    }
}

/// First meaningful help line, capped for catalog listings
fn summarize(help_text: &str) -> String {
    let line = help_text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("No description available");

    let mut summary = line.to_string();
    if summary.len() > MAX_DESCRIPTION_LEN {
        let mut cut = MAX_DESCRIPTION_LEN;
        while !summary.is_char_boundary(cut) {
            cut -= 1;
        }
        summary.truncate(cut);
    }
    summary
}
