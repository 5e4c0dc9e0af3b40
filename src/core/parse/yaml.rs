use serde_yaml::{Mapping, Value};

use crate::common::{ErrorKind, Result};
use crate::core::parse::Properties;

pub(super) fn parse(input: &str) -> Result<Properties> {
    let mut properties = Properties::new();

    if is_blank_document(input) {
        return Ok(properties);
    }

    match serde_yaml::from_str::<Value>(input)? {
        Value::Null => {}
        Value::Mapping(mapping) => flatten_mapping(None, mapping, &mut properties)?,
        other => {
            return Err(ErrorKind::YamlShape {
                description: format!("document root must be a mapping, got {}", kind(&other)),
            }
            .into())
        }
    }

    Ok(properties)
}

// Only comments, blank lines and document markers.
fn is_blank_document(input: &str) -> bool {
    input.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

fn flatten_mapping(parent: Option<&str>, mapping: Mapping, out: &mut Properties) -> Result<()> {
    for (key, value) in mapping {
        let key = match scalar(&key) {
            Some(key) => key,
            None => {
                return Err(ErrorKind::YamlShape {
                    description: format!("mapping key must be a scalar, got {}", kind(&key)),
                }
                .into())
            }
        };
        // Empty keys are dropped together with everything below them.
        if key.is_empty() {
            continue;
        }
        let name = match parent {
            Some(parent) => format!("{}.{}", parent, key),
            None => key,
        };
        flatten(name, value, out)?;
    }
    Ok(())
}

fn flatten(name: String, value: Value, out: &mut Properties) -> Result<()> {
    match value {
        Value::Mapping(mapping) => flatten_mapping(Some(&name), mapping, out),
        Value::Sequence(items) => {
            // Scalar lists collapse into one comma separated value.
            if items.iter().all(|item| scalar(item).is_some()) {
                let joined = items
                    .iter()
                    .filter_map(scalar)
                    .collect::<Vec<_>>()
                    .join(",");
                out.insert(name, joined);
                return Ok(());
            }
            for (index, item) in items.into_iter().enumerate() {
                flatten(format!("{}[{}]", name, index), item, out)?;
            }
            Ok(())
        }
        scalar_value => {
            out.insert(name, scalar(&scalar_value).unwrap_or_default());
            Ok(())
        }
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
    }
}
