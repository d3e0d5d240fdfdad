//! Front-matter parsing for note sources
//!
//! A note may open with a `---`-delimited YAML block. The engine consumes
//! `title`, `tags`, and `complexity`; every other key is preserved
//! verbatim as passthrough metadata. A block that fails to parse is
//! treated as absent and the whole file becomes body.

use std::collections::BTreeMap;

use serde_json::Value;

/// Typed view of a note's metadata block.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub complexity: Option<f64>,
    /// Keys the engine does not interpret.
    pub extra: BTreeMap<String, Value>,
}

/// Split a note source into its front matter (if any) and body.
pub fn parse_note_source(input: &str) -> (Option<FrontMatter>, &str) {
    let Some((raw_yaml, body)) = split_front_matter(input) else {
        return (None, input);
    };
    match parse_yaml_block(raw_yaml) {
        Some(front) => (Some(front), body),
        None => {
            tracing::debug!("unparseable front matter treated as body");
            (None, input)
        }
    }
}

/// Returns `(yaml, body)` when the input opens with a `---` fence closed by
/// `---` or `...`. Tolerates a BOM before the opening fence.
fn split_front_matter(input: &str) -> Option<(&str, &str)> {
    let stripped = input.strip_prefix('\u{feff}').unwrap_or(input);
    let rest = stripped.strip_prefix("---")?;
    let rest = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            if yaml.trim().is_empty() {
                return None;
            }
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}

fn parse_yaml_block(yaml: &str) -> Option<FrontMatter> {
    let parsed: serde_yaml::Value = serde_yaml::from_str(yaml).ok()?;
    let Value::Object(map) = serde_json::to_value(parsed).ok()? else {
        return None;
    };

    let mut front = FrontMatter::default();
    for (key, value) in map {
        match key.as_str() {
            "title" => front.title = value.as_str().map(str::to_string),
            "tags" => front.tags = string_list(&value),
            "complexity" => front.complexity = value.as_f64(),
            _ => {
                front.extra.insert(key, value);
            }
        }
    }
    Some(front)
}

/// Accepts both a YAML list and a single scalar for `tags`.
fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Value::String(s) => vec![s.clone()],
        _ => Vec::new(),
    }
}
