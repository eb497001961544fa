//! Network topology module.
//!
//! This module expands a validated [`NetworkSpec`](crate::config::NetworkSpec)
//! into the fully addressed participant graph every artifact is rendered from:
//! organizations, orderers, peers and the storage backend bound to each peer.

pub mod ports;
pub mod synthesis;
pub mod types;

// Re-export key types and functions for easier access
pub use synthesis::synthesize;
pub use types::{Orderer, Organization, Peer, StorageBinding, Topology};
