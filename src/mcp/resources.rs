//! Read-Only Addressable Resources
//!
//! The server exposes two resources over `resources/list`/`resources/read`:
//! a generated markdown index of the catalog (plus any operator-supplied
//! docs), and the raw catalog itself as structured JSON. Both are pure
//! reads over the current cache; reading a resource never triggers tool
//! execution.

use crate::discovery::DiscoveredTool;
use crate::mcp::protocol::ResourceDescriptor;
use std::fmt::Write as _;
use std::path::Path;
use tracing::warn;

/// URI of the generated documentation resource
pub const DOCS_URI: &str = "armory://docs";

/// URI of the raw catalog resource
pub const CATALOG_URI: &str = "armory://catalog";

/// The fixed resource listing
pub fn resource_descriptors() -> Vec<ResourceDescriptor> {
    vec![
        ResourceDescriptor {
            uri: DOCS_URI.to_string(),
            name: "Tool documentation".to_string(),
            description: "Generated markdown index of every discovered tool, grouped by category"
                .to_string(),
            mime_type: "text/markdown".to_string(),
        },
        ResourceDescriptor {
            uri: CATALOG_URI.to_string(),
            name: "Tool catalog".to_string(),
            description: "The raw discovered-tool catalog as structured JSON".to_string(),
            mime_type: "application/json".to_string(),
        },
    ]
}

/// Render the markdown documentation resource
///
/// Tools are grouped by category; when a docs root is configured, its
/// markdown files are appended verbatim after the generated index.
pub fn render_docs(tools: &[DiscoveredTool], docs_root: Option<&Path>) -> String {
    let mut out = String::new();
    out.push_str("# Tool Catalog\n\n");
    let _ = writeln!(out, "{} tools discovered.\n", tools.len());

    let mut categories: Vec<&str> = tools.iter().map(|t| t.category.as_str()).collect();
    categories.sort_unstable();
    categories.dedup();

    for category in categories {
        let _ = writeln!(out, "## {}\n", category);
        for tool in tools.iter().filter(|t| t.category.as_str() == category) {
            let _ = writeln!(out, "### {}\n", tool.name);
            let _ = writeln!(out, "{}\n", tool.description);
            let _ = writeln!(out, "- Path: `{}`", tool.path.display());
            let _ = writeln!(out, "- Parameters:");
            for param in &tool.parameters {
                let marker = if param.required { " (required)" } else { "" };
                let _ = writeln!(
                    out,
                    "  - `{}` ({}){}{}",
                    param.name,
                    param.param_type.as_str(),
                    marker,
                    if param.description.is_empty() {
                        String::new()
                    } else {
                        format!(": {}", param.description)
                    }
                );
            }
            out.push('\n');
        }
    }

    if let Some(root) = docs_root {
        append_doc_files(&mut out, root);
    }

    out
}

/// Serialize the raw catalog resource
pub fn catalog_json(tools: &[DiscoveredTool]) -> String {
    serde_json::to_string_pretty(tools).unwrap_or_else(|err| {
        warn!("Failed to serialize catalog: {}", err);
        "[]".to_string()
    })
}

/// Append operator-supplied markdown files from the docs root
fn append_doc_files(out: &mut String, root: &Path) {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("Cannot read docs root {}: {}", root.display(), err);
            return;
        }
    };

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
        .collect();
    paths.sort();

    for path in paths {
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                out.push_str("\n---\n\n");
                out.push_str(&text);
            }
            Err(err) => warn!("Skipping unreadable doc {}: {}", path.display(), err),
        }
    }
}
