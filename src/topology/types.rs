//! Topology type definitions.
//!
//! These values are built once by [`synthesize`](super::synthesize) and then
//! only read: every render step serializes the same [`Topology`] into its
//! template context.

use serde::Serialize;
use std::sync::Arc;

use crate::config::{OrdererKind, StorageProvider};

/// An organization participating in the network.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    /// Short name, e.g. `org1` or `ordererOrg`
    pub name: String,
    /// DNS domain hosting the organization's nodes
    pub domain: String,
}

/// An ordering service node.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Orderer {
    /// Fully qualified host name, e.g. `orderer1.example.com`
    pub name: String,
    /// Owning organization, shared with every other orderer
    pub organization: Arc<Organization>,
    /// Host port mapped to the container
    pub port: u32,
    pub container_port: u32,
}

/// The isolated state database backing one peer.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StorageBinding {
    /// Container name, e.g. `peer1.db.org1.example.com`
    pub name: String,
    pub provider: StorageProvider,
    /// Host port mapped to the container
    pub port: u32,
    pub container_port: u32,
    pub namespace: String,
    pub image: String,
    pub username: String,
    pub password: String,
    pub driver: String,
    pub db: String,
}

/// A peer node.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Peer {
    /// Fully qualified host name, e.g. `peer1.org1.example.com`
    pub name: String,
    pub organization: Arc<Organization>,
    /// Organization issuing ordering for this peer
    pub orderer_organization: Arc<Organization>,
    pub port: u32,
    pub container_port: u32,
    pub event_port: u32,
    pub container_event_port: u32,
    pub db: StorageBinding,
}

/// Fully addressed network description.
///
/// Orderers are listed by index and peers organization-major, peer-minor;
/// templates iterate these lists directly, so the order is part of the
/// output format.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Topology {
    pub docker_ns: String,
    pub arch: String,
    pub version: String,
    pub name: String,
    pub domain: String,
    pub orderer_type: OrdererKind,
    pub db_provider: StorageProvider,
    pub orderer_organization: Arc<Organization>,
    pub orderers: Vec<Orderer>,
    pub peer_organizations: Vec<Arc<Organization>>,
    pub peers: Vec<Peer>,
    pub peers_per_organization: u32,
    pub users_per_organization: u32,
    pub log_level: String,
    pub tls_enabled: bool,
}

impl Topology {
    /// Peers belonging to the given organization, in peer order
    pub fn peers_of<'a>(
        &'a self,
        organization: &'a Organization,
    ) -> impl Iterator<Item = &'a Peer> + 'a {
        self.peers
            .iter()
            .filter(move |peer| peer.organization.as_ref() == organization)
    }

    /// Every host port the topology publishes, grouped by family:
    /// orderers, peers, peer events, storage backends.
    pub fn host_ports(&self) -> [Vec<u32>; 4] {
        [
            self.orderers.iter().map(|o| o.port).collect(),
            self.peers.iter().map(|p| p.port).collect(),
            self.peers.iter().map(|p| p.event_port).collect(),
            self.peers.iter().map(|p| p.db.port).collect(),
        ]
    }
}
