//! Rebuild network architecture documents from infrastructure state exports.
//!
//! A state export is a flat list of typed resource records. This crate
//! classifies those records, reconstructs the Network -> Subnet -> Instance
//! tree from their foreign-key attributes, links load balancers to instances
//! through shared subnets, flattens database resources, and merges the
//! resulting fragment documents into one architecture document.
//!
//! # Module Structure
//!
//! - [`resource`] - Record loading, kind registry and classification
//! - [`topology`] - Network tree assembly
//! - [`linker`] - Load balancer membership
//! - [`database`] - Database and subnet group extraction
//! - [`merge`] - Fragment document merge
//! - [`pipeline`] - End-to-end document builds
//! - [`region`], [`output`], [`cost`] - Collaborators used by the CLI
//!
//! # Example
//!
//! ```ignore
//! use tfarch::pipeline::ArchitectureBuild;
//! use tfarch::resource::records_from_state;
//! use tfarch::topology::TopologyOptions;
//!
//! fn build(state: &serde_json::Value) -> tfarch::ArchResult<()> {
//!     let records = records_from_state(state)?;
//!     let build = ArchitectureBuild::from_records(&records, Some("us-east-1"), TopologyOptions::default())?;
//!     println!("{}", build.merged.networks.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod cost;
pub mod database;
pub mod document;
pub mod error;
pub mod linker;
pub mod merge;
pub mod output;
pub mod pipeline;
pub mod region;
pub mod resource;
pub mod topology;

pub use error::{ArchError, ArchResult};
