//! Resource Classifier
//!
//! Partitions the flat record list by kind, then decodes each bucket into
//! typed records. Records sharing an id within a kind collapse into one, so
//! every consumer of a decoded bucket sees the same set of ids.

use super::record::ResourceRecord;
use super::registry::{kind_for_tag, ResourceKind};
use crate::document::DatabaseKind;
use crate::error::ArchResult;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

/// Records partitioned by recognized kind, input order preserved per kind
#[derive(Debug, Default)]
pub struct Classified<'a> {
    buckets: BTreeMap<ResourceKind, Vec<&'a ResourceRecord>>,
    /// All database-kind records in input order, across the three kinds
    databases: Vec<(ResourceKind, &'a ResourceRecord)>,
    dropped: usize,
}

/// Partition records by kind. Records with an unrecognized tag are dropped.
pub fn classify(records: &[ResourceRecord]) -> Classified<'_> {
    let mut classified = Classified::default();

    for record in records {
        match kind_for_tag(&record.kind) {
            Some(kind) => {
                if kind.is_database() {
                    classified.databases.push((kind, record));
                }
                classified.buckets.entry(kind).or_default().push(record);
            }
            None => {
                // Most state exports carry many kinds we do not model
                tracing::trace!(
                    "Dropping unrecognized resource '{}' ({})",
                    record.logical_name,
                    record.kind
                );
                classified.dropped += 1;
            }
        }
    }

    classified
}

impl<'a> Classified<'a> {
    pub fn records(&self, kind: ResourceKind) -> &[&'a ResourceRecord] {
        self.buckets.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of records whose tag matched no known kind
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn networks(&self) -> ArchResult<Vec<NetworkRecord>> {
        let networks = decode_all(self.records(ResourceKind::Network), NetworkRecord::decode)?;
        Ok(collapse_duplicates(networks, |n| n.id.clone(), "network"))
    }

    pub fn subnets(&self) -> ArchResult<Vec<SubnetRecord>> {
        let subnets = decode_all(self.records(ResourceKind::Subnet), SubnetRecord::decode)?;
        Ok(collapse_duplicates(subnets, |s| s.id.clone(), "subnet"))
    }

    pub fn instances(&self) -> ArchResult<Vec<InstanceRecord>> {
        let instances = decode_all(self.records(ResourceKind::Instance), InstanceRecord::decode)?;
        Ok(collapse_duplicates(instances, |i| i.id.clone(), "instance"))
    }

    pub fn load_balancers(&self) -> ArchResult<Vec<LoadBalancerRecord>> {
        let load_balancers = decode_all(
            self.records(ResourceKind::LoadBalancer),
            LoadBalancerRecord::decode,
        )?;
        Ok(collapse_duplicates(load_balancers, |lb| lb.id.clone(), "load balancer"))
    }

    /// All three database kinds in their shared input order
    pub fn databases(&self) -> ArchResult<Vec<DatabaseRecord>> {
        let databases = self
            .databases
            .iter()
            .map(|(kind, r)| DatabaseRecord::decode(*kind, r))
            .collect::<ArchResult<Vec<_>>>()?;
        Ok(collapse_duplicates(databases, |db| (db.kind, db.id.clone()), "database"))
    }

    pub fn subnet_groups(&self) -> ArchResult<Vec<SubnetGroupRecord>> {
        let groups = decode_all(
            self.records(ResourceKind::DbSubnetGroup),
            SubnetGroupRecord::decode,
        )?;
        Ok(collapse_duplicates(groups, |g| g.id.clone(), "subnet group"))
    }
}

fn decode_all<T>(
    records: &[&ResourceRecord],
    decode: fn(&ResourceRecord) -> ArchResult<T>,
) -> ArchResult<Vec<T>> {
    records.iter().map(|r| decode(r)).collect()
}

/// Collapse records sharing a key into one entry. The entry sits where the
/// key first appeared and carries the values of its last occurrence.
fn collapse_duplicates<T, K>(items: Vec<T>, key: impl Fn(&T) -> K, label: &str) -> Vec<T>
where
    K: Eq + Hash + fmt::Debug,
{
    let mut slots: HashMap<K, usize> = HashMap::with_capacity(items.len());
    let mut collapsed: Vec<T> = Vec::with_capacity(items.len());

    for item in items {
        let k = key(&item);
        match slots.get(&k) {
            Some(&slot) => {
                tracing::warn!("Duplicate {} {:?}, later record replaces earlier", label, k);
                collapsed[slot] = item;
            }
            None => {
                slots.insert(k, collapsed.len());
                collapsed.push(item);
            }
        }
    }

    collapsed
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkRecord {
    pub name: String,
    pub id: String,
    pub cidr_block: String,
    pub region: Option<String>,
}

impl NetworkRecord {
    fn decode(r: &ResourceRecord) -> ArchResult<Self> {
        let kind = ResourceKind::Network;
        Ok(Self {
            name: r.logical_name.clone(),
            id: r.require(kind, "id", &[])?,
            cidr_block: r.require(kind, "cidr_block", &[])?,
            region: r.attr_non_empty("region"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubnetRecord {
    pub name: String,
    pub id: String,
    pub network_id: String,
    pub cidr_block: String,
    pub availability_zone: Option<String>,
    pub map_public_ip_on_launch: Option<bool>,
}

impl SubnetRecord {
    fn decode(r: &ResourceRecord) -> ArchResult<Self> {
        let kind = ResourceKind::Subnet;
        Ok(Self {
            name: r.logical_name.clone(),
            id: r.require(kind, "id", &[])?,
            network_id: r.require(kind, "vpc_id", &["network_id"])?,
            cidr_block: r.require(kind, "cidr_block", &[])?,
            availability_zone: r.attr_non_empty("availability_zone"),
            map_public_ip_on_launch: r.attr_bool("map_public_ip_on_launch"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceRecord {
    pub name: String,
    pub id: String,
    pub instance_type: String,
    pub image_id: String,
    /// Absent or empty means the instance is an orphan
    pub subnet_id: Option<String>,
}

impl InstanceRecord {
    fn decode(r: &ResourceRecord) -> ArchResult<Self> {
        let kind = ResourceKind::Instance;
        Ok(Self {
            name: r.logical_name.clone(),
            id: r.require(kind, "id", &[])?,
            instance_type: r.require(kind, "instance_type", &[])?,
            image_id: r.require(kind, "ami", &["image_id"])?,
            subnet_id: r.attr_non_empty("subnet_id"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadBalancerRecord {
    pub name: String,
    pub id: String,
    pub dns_name: String,
    /// Join key only; never emitted
    pub subnet_ids: Vec<String>,
}

impl LoadBalancerRecord {
    fn decode(r: &ResourceRecord) -> ArchResult<Self> {
        Ok(Self {
            name: r.logical_name.clone(),
            id: r.require(ResourceKind::LoadBalancer, "id", &[])?,
            dns_name: r.attr_str("dns_name").unwrap_or_default(),
            subnet_ids: r.attr_string_list(&["subnets", "subnet_ids"]),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseRecord {
    pub kind: DatabaseKind,
    pub name: String,
    pub id: String,
    pub engine: Option<String>,
    pub instance_class: Option<String>,
    pub db_name: Option<String>,
    pub arn: Option<String>,
    pub region: Option<String>,
}

impl DatabaseRecord {
    fn decode(kind: ResourceKind, r: &ResourceRecord) -> ArchResult<Self> {
        let db_kind = match kind {
            ResourceKind::DbCluster => DatabaseKind::DbCluster,
            ResourceKind::DbTable => DatabaseKind::DbTable,
            _ => DatabaseKind::DbInstance,
        };
        Ok(Self {
            kind: db_kind,
            name: r.logical_name.clone(),
            id: r.require(kind, "id", &[])?,
            engine: r.attr_str("engine"),
            instance_class: r.attr_str_any(&["instance_class", "db_cluster_instance_class"]),
            db_name: r.attr_str_any(&["db_name", "database_name"]),
            arn: r.attr_str("arn"),
            region: r.attr_non_empty("region"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubnetGroupRecord {
    pub name: String,
    pub id: String,
    pub description: Option<String>,
    pub subnet_ids: Vec<String>,
}

impl SubnetGroupRecord {
    fn decode(r: &ResourceRecord) -> ArchResult<Self> {
        Ok(Self {
            name: r.logical_name.clone(),
            id: r.require(ResourceKind::DbSubnetGroup, "id", &[])?,
            description: r.attr_str("description"),
            subnet_ids: r.attr_string_list(&["subnet_ids"]),
        })
    }
}
