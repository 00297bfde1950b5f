//! Load-Balancer Linker
//!
//! Resolves load balancer membership through shared subnets: an instance is a
//! member of every load balancer whose subnet set contains the instance's
//! subnet.

use crate::document::{InstanceRef, LoadBalancer};
use crate::resource::{InstanceRecord, LoadBalancerRecord};
use std::collections::{HashMap, HashSet};

/// Subnet id -> instances in that subnet, in input order
#[derive(Debug, Default)]
pub struct SubnetMembers<'a> {
    by_subnet: HashMap<&'a str, Vec<&'a InstanceRecord>>,
}

impl<'a> SubnetMembers<'a> {
    /// Index instances by subnet once so each load balancer is a lookup
    pub fn index(instances: &'a [InstanceRecord]) -> Self {
        let mut by_subnet: HashMap<&str, Vec<&InstanceRecord>> = HashMap::new();
        for instance in instances {
            if let Some(subnet_id) = instance.subnet_id.as_deref() {
                by_subnet.entry(subnet_id).or_default().push(instance);
            }
        }
        Self { by_subnet }
    }

    pub fn in_subnet(&self, subnet_id: &str) -> &[&'a InstanceRecord] {
        self.by_subnet
            .get(subnet_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Members for one load balancer, first-seen order, unique by instance id
    pub fn members(&self, subnet_ids: &[String]) -> Vec<InstanceRef> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut members = Vec::new();

        for subnet_id in subnet_ids {
            for instance in self.in_subnet(subnet_id) {
                if seen.insert(instance.id.as_str()) {
                    members.push(InstanceRef {
                        name: instance.name.clone(),
                        id: instance.id.clone(),
                    });
                }
            }
        }

        members
    }
}

/// Link every load balancer to its member instances. The subnet ids are
/// consumed as a join key and do not appear in the output.
pub fn link_load_balancers(
    load_balancers: &[LoadBalancerRecord],
    instances: &[InstanceRecord],
) -> Vec<LoadBalancer> {
    let index = SubnetMembers::index(instances);

    load_balancers
        .iter()
        .map(|lb| {
            let instances = index.members(&lb.subnet_ids);
            tracing::debug!(
                "Load balancer {} spans {} subnets, {} members",
                lb.id,
                lb.subnet_ids.len(),
                instances.len()
            );
            LoadBalancer {
                name: lb.name.clone(),
                id: lb.id.clone(),
                dns_name: lb.dns_name.clone(),
                instances,
            }
        })
        .collect()
}
