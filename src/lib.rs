//! # fabric-netgen - Test network generator for permissioned ledger clusters
//!
//! Turns a small YAML description of a network (orderer count and consensus
//! type, peer organizations, peers and users per organization, state
//! database) into everything needed to start it under docker-compose.
//!
//! ## Overview
//!
//! Generation happens in two stages:
//!
//! 1. **Synthesis**: the validated [`config::NetworkSpec`] is expanded into a
//!    [`topology::Topology`], a pure and deterministic graph of
//!    organizations, orderers, peers and storage bindings with their ports.
//! 2. **Artifact pipeline**: templates are rendered against the network description and the
//!    topology, and the `cryptogen` / `configtxgen` tools are run to produce
//!    certificate material, the genesis block and the channel transaction.
//!
//! ## Architecture
//!
//! - `config`: network spec types and validation
//! - `config_loader`: reading the network description from YAML
//! - `topology`: port scheme and topology synthesis
//! - `render`: template set and helper functions
//! - `staging`: output directory layout and file operations
//! - `tools`: external tool resolution and invocation
//! - `pipeline`: dependency-ordered generation steps
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fabric_netgen::config_loader::load_config;
//! use fabric_netgen::pipeline::{NetworkContext, Pipeline};
//! use fabric_netgen::render::TemplateSet;
//! use fabric_netgen::tools::{PlatformResolver, ProcessToolRunner};
//! use std::path::Path;
//!
//! let spec = load_config(Path::new("network.yaml"))?;
//! let context = NetworkContext::new(spec, Path::new("."))?;
//! let templates = TemplateSet::builtin()?;
//! let runner = ProcessToolRunner::new(PlatformResolver::new("tools"));
//!
//! let report = Pipeline::new(&context, &templates, &runner).run()?;
//! println!("network staged in {:?}", report.network_dir);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Configuration Format
//!
//! ```yaml
//! DOCKER_NS: hyperledger
//! ARCH: x86_64
//! VERSION: 1.0.0
//! network: samplenet
//! domain: example.com
//! ordererType: kafka
//! ordererNodes: 3
//! peerOrganizations: 2
//! peersPerOrganization: 2
//! usersPerOrganization: 1
//! db:
//!   provider: CouchDB
//!   port: 5984
//!   hostPort: 5984
//! ```

pub mod config;
pub mod config_loader;
pub mod pipeline;
pub mod render;
pub mod staging;
pub mod tools;
pub mod topology;
