//! Architecture Merger
//!
//! Field union of independently produced fragment documents. Fragments are
//! trusted as-is; nothing is re-validated across them.

use crate::document::{resolve_region, MergedDocument};
use crate::error::{ArchError, ArchResult};
use serde_json::Value;

/// The three fragment documents, any of which may be missing
#[derive(Debug, Clone, Copy, Default)]
pub struct Fragments<'a> {
    pub topology: Option<&'a Value>,
    pub load_balancers: Option<&'a Value>,
    pub databases: Option<&'a Value>,
}

/// Merge fragments into one document.
///
/// Region: the topology fragment's region unless it is missing or
/// `"unknown"`, then `region_override`, then `"unknown"`. A missing fragment
/// or key yields an empty list; a key holding something other than a list is
/// rejected.
pub fn merge_fragments(
    fragments: Fragments<'_>,
    region_override: Option<&str>,
) -> ArchResult<MergedDocument> {
    let topology_region = fragments
        .topology
        .and_then(|doc| doc.get("region"))
        .and_then(|v| v.as_str());

    let merged = MergedDocument {
        region: resolve_region([topology_region, region_override]),
        // Older topology and ELB documents used `vpcs` / `elbs`
        networks: list_field(fragments.topology, &["networks", "vpcs"])?,
        load_balancers: list_field(fragments.load_balancers, &["load_balancers", "elbs"])?,
        databases: list_field(fragments.databases, &["databases"])?,
        subnet_groups: list_field(fragments.databases, &["subnet_groups"])?,
    };

    tracing::info!(
        "Merged architecture: region={}, {} networks, {} load balancers, {} databases, {} subnet groups",
        merged.region,
        merged.networks.len(),
        merged.load_balancers.len(),
        merged.databases.len(),
        merged.subnet_groups.len()
    );

    Ok(merged)
}

/// First present key among `keys`, which must hold a list
fn list_field(fragment: Option<&Value>, keys: &[&str]) -> ArchResult<Vec<Value>> {
    let Some(fragment) = fragment else {
        return Ok(Vec::new());
    };

    let Some((key, value)) = keys
        .iter()
        .find_map(|key| fragment.get(*key).map(|v| (*key, v)))
    else {
        return Ok(Vec::new());
    };

    match value {
        Value::Array(items) => Ok(items.clone()),
        Value::Null => Ok(Vec::new()),
        other => Err(ArchError::malformed(format!(
            "fragment field '{}' is not a list (found {})",
            key,
            type_name(other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
