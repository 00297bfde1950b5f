//! Resource abstraction layer
//!
//! This module turns a state export into typed resource buckets. Recognized
//! kinds are loaded from JSON files at compile time, so new provider type tags
//! can be mapped onto existing kinds without code changes.
//!
//! # Architecture
//!
//! - [`registry`] - Loads and caches kind definitions from embedded JSON
//! - [`loader`] - Extracts flat records from a state document
//! - [`record`] - The untyped record shape and attribute accessors
//! - [`classify`] - Partitions records by kind and decodes typed records
//!
//! # Kind Definitions
//!
//! Kinds are defined in JSON files under `src/resources/`:
//! - `aws.json` - AWS provider type tags (VPCs, subnets, EC2, ELB, RDS, DynamoDB)
//!
//! # Example
//!
//! ```ignore
//! use tfarch::resource::{classify, records_from_state, InstanceRecord};
//!
//! fn instances(state: &serde_json::Value) -> tfarch::ArchResult<Vec<InstanceRecord>> {
//!     let records = records_from_state(state)?;
//!     classify(&records).instances()
//! }
//! ```

pub mod classify;
pub mod loader;
pub mod record;
mod registry;

pub use classify::{
    classify, Classified, DatabaseRecord, InstanceRecord, LoadBalancerRecord, NetworkRecord,
    SubnetGroupRecord, SubnetRecord,
};
pub use loader::{load_records_or_empty, load_state_file, records_from_state};
pub use record::ResourceRecord;
pub use registry::*;
