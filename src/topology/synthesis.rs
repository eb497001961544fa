//! Topology synthesis.
//!
//! Pure expansion of a validated [`NetworkSpec`] into a [`Topology`]: no I/O
//! and no failure modes, every invariant having been checked at load.

use log::debug;
use std::sync::Arc;

use super::ports;
use super::types::{Orderer, Organization, Peer, StorageBinding, Topology};
use crate::config::{NetworkSpec, StorageSpec};

/// Name of the organization that owns every orderer
pub const ORDERER_ORG_NAME: &str = "ordererOrg";

/// Build the full participant graph for `spec`.
///
/// Calling this twice with equal specs yields equal topologies.
pub fn synthesize(spec: &NetworkSpec) -> Topology {
    let orderer_organization = Arc::new(Organization {
        name: ORDERER_ORG_NAME.to_string(),
        domain: spec.domain.clone(),
    });

    let orderers = build_orderers(spec.orderer_nodes, &orderer_organization);

    let peer_organizations: Vec<Arc<Organization>> = (0..spec.peer_orgs)
        .map(|i| {
            Arc::new(Organization {
                name: format!("org{}", i + 1),
                domain: format!("org{}.{}", i + 1, spec.domain),
            })
        })
        .collect();

    let mut peers = Vec::with_capacity(spec.total_peers() as usize);
    for (i, organization) in peer_organizations.iter().enumerate() {
        for j in 0..spec.peers_per_org {
            let offset = i as u32 * spec.peers_per_org + j;
            peers.push(build_peer(
                j,
                offset,
                organization,
                &orderer_organization,
                &spec.db,
            ));
        }
    }

    debug!(
        "Synthesized {} orderer(s), {} organization(s), {} peer(s) for '{}'",
        orderers.len(),
        peer_organizations.len(),
        peers.len(),
        spec.network
    );

    Topology {
        docker_ns: spec.docker_ns.clone(),
        arch: spec.arch.clone(),
        version: spec.version.clone(),
        name: spec.network.clone(),
        domain: spec.domain.clone(),
        orderer_type: spec.orderer_type,
        db_provider: spec.db.provider,
        orderer_organization,
        orderers,
        peer_organizations,
        peers,
        peers_per_organization: spec.peers_per_org,
        users_per_organization: spec.users_per_org,
        log_level: spec.log_level.clone(),
        tls_enabled: spec.tls_enabled,
    }
}

fn build_orderers(count: u32, organization: &Arc<Organization>) -> Vec<Orderer> {
    (0..count)
        .map(|i| Orderer {
            name: format!("orderer{}.{}", i + 1, organization.domain),
            organization: Arc::clone(organization),
            port: ports::orderer_port(i),
            container_port: ports::ORDERER_CONTAINER_PORT as u32,
        })
        .collect()
}

/// `index` is the peer's position inside its organization, `offset` its
/// global organization-major position.
fn build_peer(
    index: u32,
    offset: u32,
    organization: &Arc<Organization>,
    orderer_organization: &Arc<Organization>,
    storage: &StorageSpec,
) -> Peer {
    Peer {
        name: format!("peer{}.{}", index + 1, organization.domain),
        organization: Arc::clone(organization),
        orderer_organization: Arc::clone(orderer_organization),
        port: ports::peer_port(offset),
        container_port: ports::PEER_CONTAINER_PORT as u32,
        event_port: ports::event_port(offset),
        container_event_port: ports::EVENT_CONTAINER_PORT as u32,
        db: bind_storage(index, offset, organization, storage),
    }
}

fn bind_storage(
    index: u32,
    offset: u32,
    organization: &Organization,
    storage: &StorageSpec,
) -> StorageBinding {
    StorageBinding {
        name: format!("peer{}.db.{}", index + 1, organization.domain),
        provider: storage.provider,
        port: ports::storage_port(storage.host_port, offset),
        container_port: storage.port as u32,
        namespace: storage.namespace.clone(),
        image: storage.image.clone(),
        username: storage.username.clone(),
        password: storage.password.clone(),
        driver: storage.driver.clone(),
        db: storage.db.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::sample_spec;
    use crate::config::OrdererKind;
    use std::collections::HashSet;

    #[test]
    fn test_end_to_end_example() {
        let topology = synthesize(&sample_spec());

        let orderers: Vec<&str> = topology.orderers.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(orderers, vec!["orderer1.example.com"]);

        let orgs: Vec<&str> = topology
            .peer_organizations
            .iter()
            .map(|o| o.domain.as_str())
            .collect();
        assert_eq!(orgs, vec!["org1.example.com", "org2.example.com"]);

        let peers: Vec<&str> = topology.peers.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(peers, vec!["peer1.org1.example.com", "peer1.org2.example.com"]);

        assert_eq!(topology.orderer_organization.name, "ordererOrg");
        assert_eq!(topology.orderer_organization.domain, "example.com");
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let mut spec = sample_spec();
        spec.orderer_type = OrdererKind::Kafka;
        spec.orderer_nodes = 3;
        spec.peer_orgs = 3;
        spec.peers_per_org = 4;

        assert_eq!(synthesize(&spec), synthesize(&spec));
    }

    #[test]
    fn test_peer_ordering_and_ports() {
        let mut spec = sample_spec();
        spec.peer_orgs = 2;
        spec.peers_per_org = 3;
        let topology = synthesize(&spec);

        let expected: [(&str, u32, u32, u32); 6] = [
            ("peer1.org1.example.com", 7051, 7053, 5984),
            ("peer2.org1.example.com", 7061, 7063, 5985),
            ("peer3.org1.example.com", 7071, 7073, 5986),
            ("peer1.org2.example.com", 7081, 7083, 5987),
            ("peer2.org2.example.com", 7091, 7093, 5988),
            ("peer3.org2.example.com", 7101, 7103, 5989),
        ];
        assert_eq!(topology.peers.len(), expected.len());
        for (peer, (name, port, event, db)) in topology.peers.iter().zip(expected) {
            assert_eq!(peer.name, name);
            assert_eq!(peer.port, port);
            assert_eq!(peer.event_port, event);
            assert_eq!(peer.db.port, db);
            assert_eq!(peer.container_port, 7051);
            assert_eq!(peer.container_event_port, 7053);
            assert_eq!(peer.db.container_port, 5984);
        }
    }

    #[test]
    fn test_orderer_ports() {
        let mut spec = sample_spec();
        spec.orderer_type = OrdererKind::Kafka;
        spec.orderer_nodes = 3;
        let topology = synthesize(&spec);

        let ports: Vec<u32> = topology.orderers.iter().map(|o| o.port).collect();
        assert_eq!(ports, vec![7050, 7150, 7250]);
        assert!(topology.orderers.iter().all(|o| o.container_port == 7050));
        assert_eq!(topology.orderers[2].name, "orderer3.example.com");
    }

    #[test]
    fn test_storage_bindings_are_per_peer() {
        let mut spec = sample_spec();
        spec.peers_per_org = 2;
        spec.db.username = "admin".to_string();
        let topology = synthesize(&spec);

        let names: HashSet<&str> = topology.peers.iter().map(|p| p.db.name.as_str()).collect();
        assert_eq!(names.len(), topology.peers.len());
        assert_eq!(topology.peers[1].db.name, "peer2.db.org1.example.com");
        assert!(topology.peers.iter().all(|p| p.db.username == "admin"));
    }

    #[test]
    fn test_host_ports_are_pairwise_disjoint() {
        let mut spec = sample_spec();
        spec.orderer_type = OrdererKind::Kafka;
        spec.orderer_nodes = 5;
        spec.peer_orgs = 4;
        spec.peers_per_org = 5;
        assert!(spec.validate().is_ok());
        let topology = synthesize(&spec);

        let mut seen = HashSet::new();
        for family in topology.host_ports() {
            for port in family {
                assert!(seen.insert(port), "port {} assigned twice", port);
            }
        }
    }

    #[test]
    fn test_host_ports_disjoint_across_valid_specs() {
        let mut checked = 0;
        for (kind, orderer_nodes) in [
            (OrdererKind::Solo, 1),
            (OrdererKind::Kafka, 2),
            (OrdererKind::Kafka, 4),
        ] {
            for peer_orgs in 1..=4 {
                for peers_per_org in 1..=5 {
                    for host_port in [1024, 5984, 7000, 7300, 9000, 65000] {
                        let mut spec = sample_spec();
                        spec.orderer_type = kind;
                        spec.orderer_nodes = orderer_nodes;
                        spec.peer_orgs = peer_orgs;
                        spec.peers_per_org = peers_per_org;
                        spec.db.host_port = host_port;
                        if spec.validate().is_err() {
                            continue;
                        }

                        let mut seen = HashSet::new();
                        for family in synthesize(&spec).host_ports() {
                            for port in family {
                                assert!(
                                    seen.insert(port),
                                    "port {} assigned twice for {:?}",
                                    port,
                                    spec
                                );
                            }
                        }
                        checked += 1;
                    }
                }
            }
        }
        // 7300 overlaps the larger networks, every other host port is always valid
        assert!(checked >= 3 * 4 * 5 * 5);
    }

    #[test]
    fn test_peers_know_orderer_organization() {
        let topology = synthesize(&sample_spec());
        for peer in &topology.peers {
            assert_eq!(peer.orderer_organization, topology.orderer_organization);
        }
        let org2 = &topology.peer_organizations[1];
        let org2_peers: Vec<&str> = topology.peers_of(org2).map(|p| p.name.as_str()).collect();
        assert_eq!(org2_peers, vec!["peer1.org2.example.com"]);
    }
}
