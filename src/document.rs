//! Architecture documents
//!
//! Output shapes for the topology, load-balancer, database and merged
//! documents. Field names are part of the interchange format consumed
//! downstream.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel for values the input does not provide
pub const UNKNOWN: &str = "unknown";

/// Pick the first non-empty, non-sentinel region; `"unknown"` otherwise
pub fn resolve_region<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> String {
    candidates
        .into_iter()
        .flatten()
        .find(|r| !r.is_empty() && *r != UNKNOWN)
        .unwrap_or(UNKNOWN)
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub name: String,
    pub id: String,
    pub cidr_block: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub subnets: Vec<Subnet>,
}

/// Public/private classification of a subnet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    /// `public` when the subnet auto-assigns public IPs or its name says so
    pub fn derive(name: &str, map_public_ip_on_launch: Option<bool>) -> Self {
        if map_public_ip_on_launch == Some(true) || name.to_lowercase().contains("public") {
            Self::Public
        } else {
            Self::Private
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    pub name: String,
    pub id: String,
    pub network_id: String,
    pub cidr_block: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    pub instances: Vec<Instance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    pub id: String,
    pub instance_type: String,
    pub image_id: String,
    pub subnet_id: String,
}

/// Load balancer member reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRef {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancer {
    pub name: String,
    pub id: String,
    pub dns_name: String,
    pub instances: Vec<InstanceRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseKind {
    DbInstance,
    DbCluster,
    DbTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseResource {
    pub kind: DatabaseKind,
    pub name: String,
    pub id: String,
    pub engine: String,
    pub instance_class: String,
    pub db_name: String,
    pub arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetGroup {
    pub name: String,
    pub id: String,
    pub description: String,
    pub subnet_ids: Vec<String>,
}

/// `{region, networks}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyDocument {
    pub region: String,
    pub networks: Vec<Network>,
}

/// `{region, load_balancers}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancerDocument {
    pub region: String,
    pub load_balancers: Vec<LoadBalancer>,
}

/// `{region, databases, subnet_groups}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseDocument {
    pub region: String,
    pub databases: Vec<DatabaseResource>,
    pub subnet_groups: Vec<SubnetGroup>,
}

/// Union of the three fragments. Entries are carried as opaque JSON since
/// the merge trusts each fragment's own shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedDocument {
    pub region: String,
    pub networks: Vec<Value>,
    pub load_balancers: Vec<Value>,
    pub databases: Vec<Value>,
    pub subnet_groups: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_region_skips_sentinels() {
        assert_eq!(resolve_region([None, Some(""), Some("eu-west-1")]), "eu-west-1");
        assert_eq!(resolve_region([Some(UNKNOWN), Some("us-east-1")]), "us-east-1");
        assert_eq!(resolve_region([None, None]), UNKNOWN);
    }

    #[test]
    fn test_visibility_derivation() {
        assert_eq!(Visibility::derive("Public_A", None), Visibility::Public);
        assert_eq!(Visibility::derive("app", Some(true)), Visibility::Public);
        assert_eq!(Visibility::derive("app", Some(false)), Visibility::Private);
        assert_eq!(Visibility::derive("db", None), Visibility::Private);
    }

    #[test]
    fn test_subnet_omits_absent_optionals() {
        let subnet = Subnet {
            name: "a".to_string(),
            id: "sn-1".to_string(),
            network_id: "vpc-1".to_string(),
            cidr_block: "10.0.1.0/24".to_string(),
            availability_zone: None,
            visibility: Some(Visibility::Private),
            instances: vec![],
        };

        assert_eq!(
            serde_json::to_value(&subnet).unwrap(),
            json!({
                "name": "a",
                "id": "sn-1",
                "network_id": "vpc-1",
                "cidr_block": "10.0.1.0/24",
                "visibility": "private",
                "instances": []
            })
        );
    }

    #[test]
    fn test_database_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(DatabaseKind::DbCluster).unwrap(),
            json!("db_cluster")
        );
    }
}
