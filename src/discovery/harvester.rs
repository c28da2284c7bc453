//! Help-Text Harvester
//!
//! Invokes a candidate executable with conventional help flags to obtain
//! its usage text. Variants are tried in a fixed order, each under its own
//! short timeout; stdout and stderr are combined because tools print usage
//! to either stream. The first variant whose combined output clears a
//! minimum-length threshold wins. If no variant produces enough output the
//! candidate is excluded from the catalog entirely.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, trace};

/// Help-flag variants, tried in order
const HELP_VARIANTS: &[&str] = &["--help", "-h", "help"];

/// Combined output must be strictly longer than this to count
const MIN_HELP_LEN: usize = 10;

/// Stored help text is capped so a hostile binary cannot bloat the catalog
const MAX_HELP_LEN: usize = 4000;

/// Try each help variant against `path`, returning the first usable text
///
/// Returns `None` when every variant fails to spawn, times out, or prints
/// less than the minimum threshold. Spawn failures are treated exactly like
/// empty output: the next variant is tried.
pub async fn harvest_help_text(path: &Path, timeout: Duration) -> Option<String> {
    for variant in HELP_VARIANTS {
        match run_variant(path, variant, timeout).await {
            Some(text) if text.trim().len() > MIN_HELP_LEN => {
                debug!("Harvested {} via {}", path.display(), variant);
                return Some(truncate(text));
            }
            Some(_) => {
                trace!("{} {} printed too little output", path.display(), variant);
            }
            None => {
                trace!("{} {} failed or timed out", path.display(), variant);
            }
        }
    }
    None
}

/// Run one help variant, combining stdout and stderr
async fn run_variant(path: &Path, flag: &str, timeout: Duration) -> Option<String> {
    let child = Command::new(path)
        .arg(flag)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let output = tokio::time::timeout(timeout, child).await.ok()?.ok()?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&stderr);
    }
    Some(text)
}

/// Cap stored help text at a char boundary
fn truncate(mut text: String) -> String {
    if text.len() > MAX_HELP_LEN {
        let mut cut = MAX_HELP_LEN;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
    }
    text
}
