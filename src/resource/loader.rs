//! State Loader
//!
//! Turns a parsed state export into a flat list of [`ResourceRecord`]s.

use super::record::ResourceRecord;
use crate::error::{ArchError, ArchResult};
use serde_json::Value;
use std::path::Path;

/// Path of the root module inside a `terraform show -json` document
const ROOT_MODULE_PATH: &str = "values.root_module";

/// Extract every resource record from a state document.
///
/// Reads `values.root_module.resources` and the resources of nested
/// `child_modules` in document order. Documents without a root module may
/// carry a top-level `resources` array instead.
pub fn records_from_state(state: &Value) -> ArchResult<Vec<ResourceRecord>> {
    let mut records = Vec::new();

    if let Some(root) = lookup_path(state, ROOT_MODULE_PATH) {
        collect_module(root, ROOT_MODULE_PATH, &mut records)?;
    } else if let Some(resources) = state.get("resources") {
        collect_resources(resources, "resources", &mut records)?;
    } else {
        return Err(ArchError::malformed(format!(
            "state document has neither '{}' nor a top-level 'resources' list",
            ROOT_MODULE_PATH
        )));
    }

    tracing::debug!("Loaded {} resource records", records.len());
    Ok(records)
}

/// Read and parse a state file from disk
pub fn load_state_file(path: &Path) -> ArchResult<Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Load records from a state file, degrading to an empty list when the file
/// itself cannot be read or parsed. Shape errors inside a readable document
/// still propagate.
pub fn load_records_or_empty(path: &Path) -> ArchResult<Vec<ResourceRecord>> {
    match load_state_file(path) {
        Ok(state) => records_from_state(&state),
        Err(e) => {
            tracing::warn!(
                "Failed to load state file {:?}: {}, continuing with no resources",
                path,
                e
            );
            Ok(Vec::new())
        }
    }
}

fn collect_module(module: &Value, path: &str, out: &mut Vec<ResourceRecord>) -> ArchResult<()> {
    if !module.is_object() {
        return Err(ArchError::malformed(format!("'{}' is not an object", path)));
    }

    // Terraform omits the key entirely for modules with no resources
    if let Some(resources) = module.get("resources") {
        collect_resources(resources, &format!("{}.resources", path), out)?;
    }

    if let Some(children) = module.get("child_modules") {
        let Some(children) = children.as_array() else {
            return Err(ArchError::malformed(format!(
                "'{}.child_modules' is not a list",
                path
            )));
        };
        for (idx, child) in children.iter().enumerate() {
            collect_module(child, &format!("{}.child_modules.{}", path, idx), out)?;
        }
    }

    Ok(())
}

fn collect_resources(
    resources: &Value,
    path: &str,
    out: &mut Vec<ResourceRecord>,
) -> ArchResult<()> {
    let Some(entries) = resources.as_array() else {
        return Err(ArchError::malformed(format!("'{}' is not a list", path)));
    };

    for (idx, entry) in entries.iter().enumerate() {
        out.push(record_from_entry(entry, &format!("{}.{}", path, idx))?);
    }
    Ok(())
}

fn record_from_entry(entry: &Value, path: &str) -> ArchResult<ResourceRecord> {
    let Some(map) = entry.as_object() else {
        return Err(ArchError::malformed(format!("'{}' is not an object", path)));
    };

    let tag = map
        .get("type")
        .or_else(|| map.get("kind"))
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    let name = map.get("name").and_then(|v| v.as_str()).unwrap_or_default();
    let attributes = map
        .get("values")
        .or_else(|| map.get("attributes"))
        .cloned()
        .unwrap_or(Value::Null);

    Ok(ResourceRecord::new(tag, name, attributes))
}

/// Follow a dot-notation path through nested objects
fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, part| current.get(part))
}
