//! Renders a loaded configuration for the generator.
//!
//! Two forms are supported: the JSON mapping, and a `conf.py` module that the
//! generator can execute directly.

use serde_json::Value;

use crate::config::BuildConfig;

/// Pretty-printed JSON object of all recognized keys.
pub fn to_json(config: &BuildConfig) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Value::Object(config.to_mapping()))
}

/// A Python module assigning every recognized key.
pub fn to_conf_py(config: &BuildConfig) -> String {
    let mut out = String::new();
    out.push_str("\"\"\"Configuration for the Sphinx documentation.\"\"\"\n\n");
    out.push_str("# Generated by docs-conf; edit docs-conf.toml instead.\n\n");

    for (key, value) in config.to_mapping() {
        // intersphinx targets are (url, inventory) tuples
        let tuples = key == "intersphinx_mapping";
        out.push_str(&format!("{} = {}\n", key, python_literal(&value, tuples, 0)));
    }
    out
}

fn python_literal(value: &Value, tuples: bool, depth: usize) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => python_string(s),
        Value::Array(items) if tuples && depth > 0 => {
            let inner: Vec<String> = items
                .iter()
                .map(|v| python_literal(v, tuples, depth + 1))
                .collect();
            if inner.len() == 1 {
                format!("({},)", inner[0])
            } else {
                format!("({})", inner.join(", "))
            }
        }
        Value::Array(items) if items.is_empty() => "[]".to_string(),
        Value::Array(items) => {
            let indent = "    ".repeat(depth + 1);
            let mut out = String::from("[\n");
            for item in items {
                out.push_str(&format!("{}{},\n", indent, python_literal(item, tuples, depth + 1)));
            }
            out.push_str(&"    ".repeat(depth));
            out.push(']');
            out
        }
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Object(map) => {
            let indent = "    ".repeat(depth + 1);
            let mut out = String::from("{\n");
            for (k, v) in map {
                out.push_str(&format!(
                    "{}{}: {},\n",
                    indent,
                    python_string(k),
                    python_literal(v, tuples, depth + 1)
                ));
            }
            out.push_str(&"    ".repeat(depth));
            out.push('}');
            out
        }
    }
}

fn python_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
