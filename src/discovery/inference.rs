//! Schema Inference Engine
//!
//! Turns one tool's raw help text into a typed parameter list. Help output
//! is adversarially varied, so everything here is best-effort: the matchers
//! are an ordered table of pure functions tried per line, a failed or
//! ambiguous parse is never fatal, and the worst case degrades to the
//! synthesized `target` parameter so every tool stays callable.
//!
//! Inferred `required` flags are advisory hints only. They come from a
//! substring scan of the trailing description and from the primary-argument
//! name set; callers must never reject an invocation for omitting one.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Maximum parameters retained per tool, in discovery order
pub const MAX_PARAMETERS: usize = 20;

/// Parameter names treated as a tool's primary argument
///
/// When none of these is detected, a generic `target` parameter is
/// synthesized and prepended so the tool is callable with one argument.
const PRIMARY_NAMES: &[&str] = &["target", "url", "host", "input"];

/// Inferred parameter type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
    Array,
}

impl ParamType {
    /// JSON-Schema type name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
        }
    }
}

/// One inferred tool parameter
///
/// Derived, not authoritative: `param_type` and `required` are heuristic
/// inferences from help text, never verified against the tool itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Canonical name: dashes stripped, inner dashes replaced by underscores
    pub name: String,

    /// Inferred value type
    #[serde(rename = "type")]
    pub param_type: ParamType,

    /// Trailing description text from the matched line (may be empty)
    pub description: String,

    /// Advisory required hint
    pub required: bool,

    /// Default value extracted from `(default: ...)` markers, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl ToolParameter {
    /// The synthesized fallback parameter
    fn synthesized_target() -> Self {
        Self {
            name: "target".to_string(),
            param_type: ParamType::String,
            description: "Target host, URL, or input for this tool".to_string(),
            required: true,
            default: None,
        }
    }
}

/// A flag occurrence extracted by one line matcher
#[derive(Debug)]
struct RawFlag {
    /// Flag token as written, dashes included
    flag: String,

    /// Value placeholder (e.g. `host` from `<host>`), absent for presence flags
    placeholder: Option<String>,

    /// Trailing description text, already cut before the next flag token
    description: String,
}

/// A pure line matcher: returns every flag occurrence it recognizes
type LineMatcher = fn(&str) -> Vec<RawFlag>;

/// Ordered matcher table; earlier matchers claim a flag name first
///
/// Order is the explicit precedence from the original heuristics:
/// `--flag <VALUE>`, then `--flag=<VALUE>`, then bare `--flag`. A later
/// matcher never overrides a name an earlier one already claimed.
const LINE_MATCHERS: &[LineMatcher] = &[
    match_flag_spaced_value,
    match_flag_equals_value,
    match_bare_flag,
];

// `--flag <VALUE>` or `--flag [VALUE]`; the placeholder must not itself
// start with a dash, so `[--verbose]` is not mistaken for a value.
static FLAG_SPACED_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-{2}[A-Za-z0-9][A-Za-z0-9-]*)[ \t]+[<\[]([A-Za-z0-9][A-Za-z0-9_,. -]*)[>\]]")
        .expect("spaced-value matcher regex")
});

// `--flag=<VALUE>`, `--flag=[VALUE]` or `--flag=VALUE`
static FLAG_EQUALS_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-{2}[A-Za-z0-9][A-Za-z0-9-]*)=[<\[]?([A-Za-z0-9][A-Za-z0-9_,.-]*)[>\]]?")
        .expect("equals-value matcher regex")
});

// Any long or short flag token; presence (boolean) semantics
static BARE_FLAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-{1,2}[A-Za-z0-9][A-Za-z0-9-]*)").expect("bare-flag matcher regex")
});

// Start of the next flag token; bounds a match's trailing description
static NEXT_FLAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\[(]-{1,2}[A-Za-z0-9]").expect("next-flag regex"));

// `(default: 80)` / `[default: auto]` markers inside descriptions
static DEFAULT_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[\[(]default:?\s*([^\])]+)[\])]").expect("default marker regex")
});

fn match_flag_spaced_value(line: &str) -> Vec<RawFlag> {
    FLAG_SPACED_VALUE
        .captures_iter(line)
        .map(|caps| RawFlag {
            flag: caps[1].to_string(),
            placeholder: Some(caps[2].to_string()),
            description: trailing_description(line, caps.get(0).map_or(0, |m| m.end())),
        })
        .collect()
}

fn match_flag_equals_value(line: &str) -> Vec<RawFlag> {
    FLAG_EQUALS_VALUE
        .captures_iter(line)
        .map(|caps| RawFlag {
            flag: caps[1].to_string(),
            placeholder: Some(caps[2].to_string()),
            description: trailing_description(line, caps.get(0).map_or(0, |m| m.end())),
        })
        .collect()
}

fn match_bare_flag(line: &str) -> Vec<RawFlag> {
    BARE_FLAG
        .captures_iter(line)
        .map(|caps| RawFlag {
            flag: caps[1].to_string(),
            placeholder: None,
            description: trailing_description(line, caps.get(0).map_or(0, |m| m.end())),
        })
        .collect()
}

/// Description text following a match, cut before the next flag token
fn trailing_description(line: &str, from: usize) -> String {
    let rest = &line[from..];
    let cut = NEXT_FLAG.find(rest).map_or(rest.len(), |m| m.start());
    let mut desc = rest[..cut]
        .trim()
        .trim_start_matches([':', ','])
        .trim_start()
        .to_string();
    // Drop unbalanced closers left over from `[--flag]` usage syntax without
    // eating the closer of a `(default: ...)` marker.
    while (desc.ends_with(']') && !desc.contains('['))
        || (desc.ends_with(')') && !desc.contains('('))
    {
        desc.pop();
        desc.truncate(desc.trim_end().len());
    }
    desc
}

/// Infer the full parameter list from harvested help text
///
/// Deterministic and idempotent: identical text always yields an identical
/// list. The result is non-empty (the fallback target is injected when no
/// primary argument was detected) and at most [`MAX_PARAMETERS`] long,
/// in first-match discovery order.
pub fn infer_parameters(help_text: &str) -> Vec<ToolParameter> {
    let mut params: Vec<ToolParameter> = Vec::new();

    for line in help_text.lines() {
        for matcher in LINE_MATCHERS {
            for raw in matcher(line) {
                let Some(name) = canonical_name(&raw.flag) else {
                    continue;
                };
                // Dedup by name, first occurrence wins
                if params.iter().any(|p| p.name == name) {
                    continue;
                }
                params.push(build_parameter(name, &raw));
            }
        }
    }

    if !params.iter().any(|p| PRIMARY_NAMES.contains(&p.name.as_str())) {
        params.insert(0, ToolParameter::synthesized_target());
    }

    params.truncate(MAX_PARAMETERS);
    params
}

/// Canonicalize a flag token into a parameter name
///
/// Strips leading dashes and replaces the rest with underscores; names
/// shorter than 2 or longer than 30 characters are rejected as noise.
fn canonical_name(flag: &str) -> Option<String> {
    let name = flag.trim_start_matches('-').replace('-', "_").to_lowercase();
    if (2..=30).contains(&name.len()) {
        Some(name)
    } else {
        None
    }
}

fn build_parameter(name: String, raw: &RawFlag) -> ToolParameter {
    let param_type = match &raw.placeholder {
        Some(placeholder) => infer_type(placeholder),
        None => ParamType::Boolean,
    };

    let lowered = raw.description.to_lowercase();
    let required = lowered.contains("required")
        || lowered.contains("must be")
        || PRIMARY_NAMES.contains(&name.as_str());

    let default = DEFAULT_MARKER
        .captures(&raw.description)
        .map(|caps| caps[1].trim().to_string());

    ToolParameter {
        name,
        param_type,
        description: raw.description.clone(),
        required,
        default,
    }
}

/// Infer a value type from its placeholder token
///
/// Number keywords match whole words of the placeholder so that `<ports>`
/// stays a string while `<port>` becomes a number; the string and array
/// keyword sets have no such collisions and use plain containment.
fn infer_type(placeholder: &str) -> ParamType {
    let lowered = placeholder.to_lowercase();

    let number_words = ["int", "integer", "num", "number", "port", "count"];
    if lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| number_words.contains(&word))
    {
        return ParamType::Number;
    }

    if lowered.contains("list") || lowered.contains("array") {
        return ParamType::Array;
    }

    let string_keywords = ["file", "path", "string", "url", "host", "dir"];
    if string_keywords.iter().any(|kw| lowered.contains(kw)) {
        return ParamType::String;
    }

    ParamType::String
}
