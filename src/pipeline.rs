//! Document builds
//!
//! Wires classifier, builders and merger together for one resource list.
//! Each fragment only decodes the kinds it needs, so a defect in a database
//! record does not block the topology document.

use crate::database::{extract_databases, extract_subnet_groups};
use crate::document::{
    resolve_region, DatabaseDocument, LoadBalancerDocument, MergedDocument, TopologyDocument,
    UNKNOWN,
};
use crate::error::ArchResult;
use crate::linker::link_load_balancers;
use crate::merge::{merge_fragments, Fragments};
use crate::resource::{classify, Classified, ResourceRecord};
use crate::topology::{build_topology, Topology, TopologyOptions};

pub fn topology_document(
    records: &[ResourceRecord],
    region_override: Option<&str>,
    options: TopologyOptions,
) -> ArchResult<TopologyDocument> {
    Ok(topology_from(&classify(records), region_override, options)?.document)
}

pub fn load_balancer_document(
    records: &[ResourceRecord],
    region_override: Option<&str>,
) -> ArchResult<LoadBalancerDocument> {
    load_balancers_from(&classify(records), region_override)
}

pub fn database_document(
    records: &[ResourceRecord],
    region_override: Option<&str>,
) -> ArchResult<DatabaseDocument> {
    databases_from(&classify(records), region_override)
}

fn topology_from(
    classified: &Classified<'_>,
    region_override: Option<&str>,
    options: TopologyOptions,
) -> ArchResult<Topology> {
    let networks = classified.networks()?;
    let subnets = classified.subnets()?;
    let instances = classified.instances()?;
    Ok(build_topology(
        &networks,
        &subnets,
        &instances,
        region_override,
        options,
    ))
}

fn load_balancers_from(
    classified: &Classified<'_>,
    region_override: Option<&str>,
) -> ArchResult<LoadBalancerDocument> {
    let load_balancers = classified.load_balancers()?;
    let instances = classified.instances()?;
    Ok(LoadBalancerDocument {
        region: resolve_region([region_override]),
        load_balancers: link_load_balancers(&load_balancers, &instances),
    })
}

fn databases_from(
    classified: &Classified<'_>,
    region_override: Option<&str>,
) -> ArchResult<DatabaseDocument> {
    let databases = classified.databases()?;
    let subnet_groups = classified.subnet_groups()?;
    let first_db_region = databases
        .iter()
        .filter_map(|db| db.region.as_deref())
        .find(|region| *region != UNKNOWN);
    Ok(DatabaseDocument {
        region: resolve_region([first_db_region, region_override]),
        databases: extract_databases(&databases),
        subnet_groups: extract_subnet_groups(&subnet_groups),
    })
}

/// All three fragments plus their merge, from one resource list
#[derive(Debug, Clone, PartialEq)]
pub struct ArchitectureBuild {
    pub topology: TopologyDocument,
    pub load_balancers: LoadBalancerDocument,
    pub databases: DatabaseDocument,
    pub merged: MergedDocument,
}

impl ArchitectureBuild {
    pub fn from_records(
        records: &[ResourceRecord],
        region_override: Option<&str>,
        options: TopologyOptions,
    ) -> ArchResult<Self> {
        let classified = classify(records);
        if classified.dropped() > 0 {
            tracing::debug!(
                "Dropped {} records of unrecognized kind",
                classified.dropped()
            );
        }

        let topology = topology_from(&classified, region_override, options)?;
        let load_balancers = load_balancers_from(&classified, region_override)?;
        let databases = databases_from(&classified, region_override)?;

        for lb in classified.load_balancers()? {
            for subnet_id in lb.subnet_ids.iter().filter(|id| !topology.knows_subnet(id)) {
                tracing::debug!(
                    "Load balancer {} references subnet {} absent from the state",
                    lb.id,
                    subnet_id
                );
            }
        }

        // Fragments go through their serialized form, as they would on disk
        let topology_json = serde_json::to_value(&topology.document)?;
        let load_balancers_json = serde_json::to_value(&load_balancers)?;
        let databases_json = serde_json::to_value(&databases)?;
        let merged = merge_fragments(
            Fragments {
                topology: Some(&topology_json),
                load_balancers: Some(&load_balancers_json),
                databases: Some(&databases_json),
            },
            region_override,
        )?;

        Ok(Self {
            topology: topology.document,
            load_balancers,
            databases,
            merged,
        })
    }
}
