use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use serde_json::Value;

use crate::error::GraderError;

/// Annotation suppressing checks on an object: `*` ignores the whole object,
/// otherwise a comma-separated list of check names.
pub const IGNORE_ANNOTATION: &str = "kube-grader/ignore";

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedObject {
    pub kind: String,
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub data: Value,
}

impl ParsedObject {
    pub fn ignore_filter(&self) -> IgnoreFilter {
        match self.annotations.get(IGNORE_ANNOTATION) {
            None => IgnoreFilter::None,
            Some(value) if value.trim() == "*" => IgnoreFilter::Object,
            Some(value) => IgnoreFilter::Checks(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from)
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreFilter {
    None,
    Object,
    Checks(HashSet<String>),
}

impl IgnoreFilter {
    pub fn object_ignored(&self) -> bool {
        matches!(self, IgnoreFilter::Object)
    }

    pub fn check_ignored(&self, name: &str) -> bool {
        match self {
            IgnoreFilter::None => false,
            IgnoreFilter::Object => true,
            IgnoreFilter::Checks(names) => names.contains(name),
        }
    }
}

/// Parses a multi-document YAML manifest into an ordered object list. Empty
/// documents are skipped; `List` kinds are expanded into independent top-level
/// entries. Any malformed document fails the whole parse.
pub fn parse_manifest(input: &str) -> Result<Vec<ParsedObject>, GraderError> {
    let mut objects = Vec::new();
    for document in serde_yaml::Deserializer::from_str(input) {
        let value = Value::deserialize(document)?;
        if value.is_null() {
            continue;
        }
        collect_objects(value, &mut objects)?;
    }
    Ok(objects)
}

fn collect_objects(mut value: Value, out: &mut Vec<ParsedObject>) -> Result<(), GraderError> {
    let kind = value
        .get("kind")
        .and_then(Value::as_str)
        .ok_or(GraderError::MissingKind)?
        .to_string();

    if kind == "List" {
        if let Some(Value::Array(items)) = value.get_mut("items").map(Value::take) {
            for item in items {
                if !item.is_null() {
                    collect_objects(item, out)?;
                }
            }
        }
        return Ok(());
    }

    let metadata = value.get("metadata");
    let name = metadata_str(metadata, "name");
    let namespace = metadata_str(metadata, "namespace");
    let labels = string_map(metadata.and_then(|m| m.get("labels")));
    let annotations = string_map(metadata.and_then(|m| m.get("annotations")));

    out.push(ParsedObject {
        kind,
        name,
        namespace,
        labels,
        annotations,
        data: value,
    });
    Ok(())
}

fn metadata_str(metadata: Option<&Value>, field: &str) -> String {
    metadata
        .and_then(|m| m.get(field))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn string_map(value: Option<&Value>) -> BTreeMap<String, String> {
    value
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| scalar_string(v).map(|s| (k.clone(), s)))
                .collect()
        })
        .unwrap_or_default()
}

// YAML leaves unquoted label values like `version: 2` as numbers; keep them
// as their string form rather than dropping the key.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Reads one input source, `-` meaning stdin.
pub fn read_input(path: &str) -> Result<String, GraderError> {
    if path == "-" {
        let mut buffer = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)?;
        return Ok(buffer);
    }
    std::fs::read_to_string(path).map_err(|source| GraderError::ManifestRead {
        path: path.to_string(),
        source,
    })
}
