//! Tool Discovery Pipeline
//!
//! Everything needed to turn a directory of unknown executables into a
//! typed, callable catalog:
//!
//! - `scanner`: walk the tools root for executables
//! - `harvester`: invoke candidates with help flags for usage text
//! - `inference`: parse help text into a typed parameter list
//! - `categorize`: bucket tools by keyword heuristics
//! - `cache`: memoize the whole pipeline with a TTL
//!
//! Discovery errors are always recovered locally: one malformed or hostile
//! executable can never blacklist the rest of the catalog.

pub mod cache;
pub mod categorize;
pub mod harvester;
pub mod inference;
pub mod scanner;

pub use cache::{sanitize_name, DiscoveredTool, DiscoveryCache};
pub use categorize::{all_categories, categorize, ToolCategory};
pub use inference::{infer_parameters, ParamType, ToolParameter, MAX_PARAMETERS};
