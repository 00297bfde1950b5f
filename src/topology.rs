//! Topology Builder
//!
//! Joins network, subnet and instance buckets into the nested
//! Network -> Subnet -> Instance tree, using id indexes built once per build.

use crate::document::{
    resolve_region, Instance, Network, Subnet, TopologyDocument, Visibility, UNKNOWN,
};
use crate::resource::{InstanceRecord, NetworkRecord, SubnetRecord};
use std::collections::{HashMap, HashSet};

/// Tree assembly options
#[derive(Debug, Clone, Copy)]
pub struct TopologyOptions {
    /// Classify subnets as public/private
    pub derive_visibility: bool,
}

impl Default for TopologyOptions {
    fn default() -> Self {
        Self {
            derive_visibility: true,
        }
    }
}

/// Result of a topology build
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    pub document: TopologyDocument,
    /// Every decoded subnet id, attached or not, in input order
    pub subnet_ids: Vec<String>,
    known_subnets: HashSet<String>,
    /// Subnets whose network id matched no network
    pub orphan_subnets: Vec<String>,
    /// Instances whose subnet id matched no subnet (or had none)
    pub orphan_instances: Vec<String>,
}

impl Topology {
    pub fn knows_subnet(&self, id: &str) -> bool {
        self.known_subnets.contains(id)
    }
}

/// Build the network tree.
///
/// Ids are expected to be unique per kind, as the `Classified` accessors
/// return them. The document region comes from the first network carrying a
/// known region, then from `region_override`.
pub fn build_topology(
    networks: &[NetworkRecord],
    subnets: &[SubnetRecord],
    instances: &[InstanceRecord],
    region_override: Option<&str>,
    options: TopologyOptions,
) -> Topology {
    // Networks, keyed by id
    let mut network_arena: Vec<Network> = Vec::with_capacity(networks.len());
    let mut network_index: HashMap<&str, usize> = HashMap::new();
    for record in networks {
        network_index.insert(&record.id, network_arena.len());
        network_arena.push(Network {
            name: record.name.clone(),
            id: record.id.clone(),
            cidr_block: record.cidr_block.clone(),
            region: record.region.clone(),
            subnets: Vec::new(),
        });
    }

    // Subnets, keyed by id
    let mut subnet_arena: Vec<Subnet> = Vec::with_capacity(subnets.len());
    let mut subnet_index: HashMap<&str, usize> = HashMap::new();
    for record in subnets {
        let visibility = options
            .derive_visibility
            .then(|| Visibility::derive(&record.name, record.map_public_ip_on_launch));
        subnet_index.insert(&record.id, subnet_arena.len());
        subnet_arena.push(Subnet {
            name: record.name.clone(),
            id: record.id.clone(),
            network_id: record.network_id.clone(),
            cidr_block: record.cidr_block.clone(),
            availability_zone: record.availability_zone.clone(),
            visibility,
            instances: Vec::new(),
        });
    }
    let subnet_ids: Vec<String> = subnet_arena.iter().map(|s| s.id.clone()).collect();
    let known_subnets: HashSet<String> = subnet_ids.iter().cloned().collect();

    // Instances into subnets
    let mut orphan_instances = Vec::new();
    for record in instances {
        let slot = record
            .subnet_id
            .as_deref()
            .and_then(|id| subnet_index.get(id).copied());
        match (slot, record.subnet_id.as_deref()) {
            (Some(idx), Some(subnet_id)) => subnet_arena[idx].instances.push(Instance {
                name: record.name.clone(),
                id: record.id.clone(),
                instance_type: record.instance_type.clone(),
                image_id: record.image_id.clone(),
                subnet_id: subnet_id.to_string(),
            }),
            _ => {
                // Unresolved reference: excluded from the tree, not an error
                tracing::debug!(
                    "Instance {} references unknown subnet {:?}",
                    record.id,
                    record.subnet_id
                );
                orphan_instances.push(record.id.clone());
            }
        }
    }

    // Subnets into networks
    let mut orphan_subnets = Vec::new();
    for subnet in subnet_arena {
        match network_index.get(subnet.network_id.as_str()) {
            Some(&idx) => network_arena[idx].subnets.push(subnet),
            None => {
                tracing::debug!(
                    "Subnet {} references unknown network {}",
                    subnet.id,
                    subnet.network_id
                );
                orphan_subnets.push(subnet.id);
            }
        }
    }

    let first_network_region = networks
        .iter()
        .filter_map(|n| n.region.as_deref())
        .find(|region| !region.is_empty() && *region != UNKNOWN);
    let region = resolve_region([first_network_region, region_override]);

    tracing::info!(
        "Built topology: {} networks, {} subnets, {} orphan subnets, {} orphan instances",
        network_arena.len(),
        subnet_ids.len(),
        orphan_subnets.len(),
        orphan_instances.len()
    );

    Topology {
        document: TopologyDocument {
            region,
            networks: network_arena,
        },
        subnet_ids,
        known_subnets,
        orphan_subnets,
        orphan_instances,
    }
}
