//! Argument Vector Reconstruction
//!
//! Rebuilds a command line from the flat argument map a caller supplies.
//! The output is passed to process creation as a vector, never through a
//! shell, which is what makes caller-supplied values injection-proof at
//! this layer.
//!
//! Rules, per argument in caller order:
//! - `null` and empty-string values are skipped entirely
//! - single-character names become `-x`, longer names `--kebab-case`
//! - `true` emits the bare flag, `false` emits nothing
//! - arrays repeat the flag once per element, each followed by the
//!   element's string form
//! - any other scalar emits `flag, value` as two entries

use serde_json::{Map, Value};

/// Build the argument vector for one tool call
pub fn build_argv(args: &Map<String, Value>) -> Vec<String> {
    let mut argv = Vec::new();

    for (name, value) in args {
        match value {
            Value::Null => {}
            Value::String(s) if s.is_empty() => {}
            Value::Bool(true) => argv.push(flag_token(name)),
            Value::Bool(false) => {}
            Value::Array(items) => {
                for item in items {
                    if item.is_null() {
                        continue;
                    }
                    argv.push(flag_token(name));
                    argv.push(value_string(item));
                }
            }
            scalar => {
                argv.push(flag_token(name));
                argv.push(value_string(scalar));
            }
        }
    }

    argv
}

/// Derive the flag token for an argument name
fn flag_token(name: &str) -> String {
    if name.chars().count() == 1 {
        format!("-{}", name)
    } else {
        format!("--{}", name.replace('_', "-"))
    }
}

/// String form of a JSON value for the command line
fn value_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_scan_invocation_round_trip() {
        let argv = build_argv(&args(json!({
            "target": "10.0.0.5",
            "ports": "80,443",
            "verbose": true
        })));

        assert_eq!(
            argv,
            vec!["--target", "10.0.0.5", "--ports", "80,443", "--verbose"]
        );
    }

    #[test]
    fn test_false_boolean_is_omitted() {
        let argv = build_argv(&args(json!({"target": "a.example", "verbose": false})));
        assert_eq!(argv, vec!["--target", "a.example"]);
    }

    #[test]
    fn test_array_repeats_flag_per_element() {
        let argv = build_argv(&args(json!({"ports": ["80", "443"]})));
        assert_eq!(argv, vec!["--ports", "80", "--ports", "443"]);
    }

    #[test]
    fn test_null_and_empty_values_skipped() {
        let argv = build_argv(&args(json!({
            "target": "h",
            "output": "",
            "rate": null
        })));
        assert_eq!(argv, vec!["--target", "h"]);
    }

    #[test]
    fn test_single_char_and_kebab_flags() {
        let argv = build_argv(&args(json!({"o": "out.txt", "max_retries": 3})));
        assert_eq!(argv, vec!["-o", "out.txt", "--max-retries", "3"]);
    }

    #[test]
    fn test_numbers_stringified_without_quotes() {
        let argv = build_argv(&args(json!({"rate": 150, "ratio": 0.5})));
        assert_eq!(argv, vec!["--rate", "150", "--ratio", "0.5"]);
    }

    #[test]
    fn test_caller_order_preserved() {
        // serde_json preserve_order keeps map insertion order
        let argv = build_argv(&args(json!({"zz": "1", "aa": "2"})));
        assert_eq!(argv, vec!["--zz", "1", "--aa", "2"]);
    }

    #[test]
    fn test_shell_metacharacters_stay_literal() {
        // The vector form carries metacharacters as data; nothing here
        // needs to reject or escape them.
        let argv = build_argv(&args(json!({"target": "a; rm -rf /"})));
        assert_eq!(argv, vec!["--target", "a; rm -rf /"]);
    }

    proptest! {
        /// Every emitted value entry is preceded by its flag token
        #[test]
        fn prop_flags_precede_values(
            name in "[a-z][a-z_]{1,10}",
            value in "[a-zA-Z0-9,./:-]{1,20}"
        ) {
            let mut map = Map::new();
            map.insert(name.clone(), Value::String(value.clone()));
            let argv = build_argv(&map);
            prop_assert_eq!(argv.len(), 2);
            prop_assert!(argv[0].starts_with("--"));
            prop_assert_eq!(&argv[1], &value);
        }

        /// Booleans never emit a value entry
        #[test]
        fn prop_booleans_bare(name in "[a-z][a-z_]{1,10}", set in any::<bool>()) {
            let mut map = Map::new();
            map.insert(name, Value::Bool(set));
            let argv = build_argv(&map);
            prop_assert_eq!(argv.len(), usize::from(set));
        }
    }
}
