//! Resource Registry - Load resource kind definitions from JSON
//!
//! This module loads the recognized resource kinds and the provider type tags
//! that map onto them from embedded JSON files, and provides lookup functions
//! for the classifier.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::OnceLock;

/// Embedded kind definition files (compiled into the binary)
const KIND_FILES: &[&str] = &[include_str!("../resources/aws.json")];

/// Canonical resource kinds understood by the assembler.
///
/// Anything that does not resolve to one of these is dropped during
/// classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Network,
    Subnet,
    Instance,
    LoadBalancer,
    DbInstance,
    DbCluster,
    DbTable,
    DbSubnetGroup,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 8] = [
        ResourceKind::Network,
        ResourceKind::Subnet,
        ResourceKind::Instance,
        ResourceKind::LoadBalancer,
        ResourceKind::DbInstance,
        ResourceKind::DbCluster,
        ResourceKind::DbTable,
        ResourceKind::DbSubnetGroup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Subnet => "subnet",
            Self::Instance => "instance",
            Self::LoadBalancer => "load_balancer",
            Self::DbInstance => "db_instance",
            Self::DbCluster => "db_cluster",
            Self::DbTable => "db_table",
            Self::DbSubnetGroup => "db_subnet_group",
        }
    }

    /// Parse a canonical kind name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    pub fn is_database(&self) -> bool {
        matches!(self, Self::DbInstance | Self::DbCluster | Self::DbTable)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct KindDef {
    pub display_name: String,
    /// Provider type tags (e.g. `aws_vpc`) that classify as this kind
    #[serde(default)]
    pub type_tags: Vec<String>,
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct KindConfig {
    #[serde(default)]
    pub kinds: BTreeMap<String, KindDef>,
}

/// Loaded registry: definitions plus a tag -> kind index
#[derive(Debug)]
pub struct KindRegistry {
    pub kinds: BTreeMap<ResourceKind, KindDef>,
    tags: HashMap<String, ResourceKind>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<KindRegistry> = OnceLock::new();

/// Get the kind registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static KindRegistry {
    REGISTRY.get_or_init(|| {
        let mut kinds = BTreeMap::new();

        for content in KIND_FILES {
            let partial: KindConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded kind JSON: {}", e));
            for (name, def) in partial.kinds {
                match ResourceKind::from_name(&name) {
                    Some(kind) => {
                        kinds.insert(kind, def);
                    }
                    None => tracing::warn!("Ignoring unknown kind '{}' in registry", name),
                }
            }
        }

        let mut tags = HashMap::new();
        for kind in ResourceKind::ALL {
            tags.insert(kind.as_str().to_string(), kind);
        }
        for (kind, def) in &kinds {
            for tag in &def.type_tags {
                tags.insert(tag.clone(), *kind);
            }
        }

        KindRegistry { kinds, tags }
    })
}

/// Resolve a record tag (canonical name or provider type) to its kind
pub fn kind_for_tag(tag: &str) -> Option<ResourceKind> {
    get_registry().tags.get(tag).copied()
}

/// Get the display name for a kind
pub fn display_name(kind: ResourceKind) -> &'static str {
    get_registry()
        .kinds
        .get(&kind)
        .map(|def| def.display_name.as_str())
        .unwrap_or_else(|| kind.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_loads_every_kind() {
        let registry = get_registry();
        for kind in ResourceKind::ALL {
            assert!(
                registry.kinds.contains_key(&kind),
                "Registry should define {}",
                kind
            );
        }
    }

    #[test]
    fn test_provider_tags_resolve() {
        assert_eq!(kind_for_tag("aws_vpc"), Some(ResourceKind::Network));
        assert_eq!(kind_for_tag("aws_elb"), Some(ResourceKind::LoadBalancer));
        assert_eq!(kind_for_tag("aws_rds_cluster"), Some(ResourceKind::DbCluster));
        assert_eq!(
            kind_for_tag("aws_db_subnet_group"),
            Some(ResourceKind::DbSubnetGroup)
        );
    }

    #[test]
    fn test_canonical_names_resolve() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind_for_tag(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_tag_is_none() {
        assert_eq!(kind_for_tag("aws_iam_role"), None);
        assert_eq!(kind_for_tag(""), None);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(ResourceKind::Network), "VPC");
    }
}
