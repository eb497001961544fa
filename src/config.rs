use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::topology::ports;

/// Ordering service implementation requested for the network
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub enum OrdererKind {
    /// Single orderer node, no external brokers
    Solo,
    /// Orderer cluster backed by a kafka/zookeeper ensemble
    Kafka,
}

impl OrdererKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrdererKind::Solo => "solo",
            OrdererKind::Kafka => "kafka",
        }
    }
}

impl TryFrom<String> for OrdererKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "solo" => Ok(OrdererKind::Solo),
            "kafka" => Ok(OrdererKind::Kafka),
            other => Err(format!("Unsupported orderer type {}", other)),
        }
    }
}

impl From<OrdererKind> for String {
    fn from(kind: OrdererKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Ledger state database backing each peer
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub enum StorageProvider {
    /// Embedded key-value store living inside the peer container
    EmbeddedKv,
    /// External document database running as a sidecar container
    DocumentDb,
}

impl StorageProvider {
    /// Name understood by the peer's ledger configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageProvider::EmbeddedKv => "goleveldb",
            StorageProvider::DocumentDb => "CouchDB",
        }
    }
}

impl TryFrom<String> for StorageProvider {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "goleveldb" => Ok(StorageProvider::EmbeddedKv),
            "CouchDB" => Ok(StorageProvider::DocumentDb),
            other => Err(format!("Unsupported db provider {}", other)),
        }
    }
}

impl From<StorageProvider> for String {
    fn from(provider: StorageProvider) -> Self {
        provider.as_str().to_string()
    }
}

/// Storage backend template, copied once per peer during synthesis
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageSpec {
    pub provider: StorageProvider,
    /// Port the backend listens on inside its container
    pub port: u16,
    /// First host port; peer `k` (global index) gets `host_port + k`
    pub host_port: u16,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub driver: String,
    #[serde(default)]
    pub db: String,
}

/// Declarative description of the network to generate.
///
/// Field names on the wire match the YAML keys operators already use, so the
/// same value doubles as the rendering context for templates that only need
/// the raw counts (crypto material, image pull script).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NetworkSpec {
    #[serde(rename = "DOCKER_NS")]
    pub docker_ns: String,
    #[serde(rename = "ARCH")]
    pub arch: String,
    #[serde(rename = "VERSION")]
    pub version: String,
    pub network: String,
    pub domain: String,
    #[serde(rename = "ordererType")]
    pub orderer_type: OrdererKind,
    pub db: StorageSpec,
    #[serde(rename = "ordererNodes")]
    pub orderer_nodes: u32,
    #[serde(rename = "peerOrganizations")]
    pub peer_orgs: u32,
    #[serde(rename = "peersPerOrganization")]
    pub peers_per_org: u32,
    #[serde(rename = "usersPerOrganization", default)]
    pub users_per_org: u32,
    #[serde(rename = "logLevel", default = "default_log_level")]
    pub log_level: String,
    #[serde(rename = "tlsEnabled", default)]
    pub tls_enabled: bool,
    #[serde(rename = "chaincodesPath", default, skip_serializing_if = "Option::is_none")]
    pub chaincodes_path: Option<PathBuf>,
}

fn default_log_level() -> String {
    "INFO".to_string()
}

impl NetworkSpec {
    /// Check every invariant, reporting the first one violated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty("DOCKER_NS", &self.docker_ns)?;
        require_non_empty("ARCH", &self.arch)?;
        require_non_empty("VERSION", &self.version)?;
        require_non_empty("network", &self.network)?;
        require_non_empty("domain", &self.domain)?;

        if self.network.contains(['/', '\\']) || self.network == "." || self.network == ".." {
            return Err(ConfigError::Invalid(format!(
                "network name '{}' must be a single directory name",
                self.network
            )));
        }

        if self.orderer_nodes == 0 {
            return Err(ConfigError::Invalid(
                "Number of orderer nodes must be greater than 0".to_string(),
            ));
        }

        if self.orderer_type == OrdererKind::Solo && self.orderer_nodes != 1 {
            return Err(ConfigError::Invalid(format!(
                "Only one orderer node must be specified if orderer type is {}",
                self.orderer_type.as_str()
            )));
        }

        if self.peer_orgs == 0 {
            return Err(ConfigError::Invalid(
                "Number of peer organizations must be greater than 0".to_string(),
            ));
        }

        if self.peers_per_org == 0 {
            return Err(ConfigError::Invalid(
                "Number of peers per organization must be greater than 0".to_string(),
            ));
        }

        self.validate_ports()
    }

    /// Total number of peers across all organizations
    pub fn total_peers(&self) -> u32 {
        self.peer_orgs * self.peers_per_org
    }

    fn validate_ports(&self) -> Result<(), ConfigError> {
        let peers = self.peer_orgs as u64 * self.peers_per_org as u64;
        let orderers = self.orderer_nodes as u64;

        if self.db.port == 0 || self.db.host_port == 0 {
            return Err(ConfigError::Invalid(
                "db port and hostPort must be greater than 0".to_string(),
            ));
        }

        // Highest port each family reaches, computed wide so oversized counts
        // are reported instead of wrapping.
        let last_orderer =
            ports::ORDERER_BASE_PORT as u64 + ports::ORDERER_STRIDE as u64 * (orderers - 1);
        let last_event = ports::EVENT_BASE_PORT as u64 + ports::PEER_STRIDE as u64 * (peers - 1);
        let last_storage = self.db.host_port as u64 + peers - 1;
        let network_span_end = last_orderer.max(last_event);

        if network_span_end > ports::MAX_PORT as u64 {
            return Err(ConfigError::Invalid(format!(
                "{} orderers and {} peers need ports up to {}, beyond {}",
                orderers,
                peers,
                network_span_end,
                ports::MAX_PORT
            )));
        }

        if last_storage > ports::MAX_PORT as u64 {
            return Err(ConfigError::Invalid(format!(
                "db hostPort {} with {} peers exceeds port {}",
                self.db.host_port,
                peers,
                ports::MAX_PORT
            )));
        }

        let first_storage = self.db.host_port as u64;
        let span_start = ports::ORDERER_BASE_PORT as u64;
        if first_storage <= network_span_end && last_storage >= span_start {
            return Err(ConfigError::Invalid(format!(
                "db host ports {}-{} overlap orderer/peer ports {}-{}",
                first_storage, last_storage, span_start, network_span_end
            )));
        }

        Ok(())
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{} must be specified", field)));
    }
    Ok(())
}

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Error reading config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Invalid network configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_spec() -> NetworkSpec {
        NetworkSpec {
            docker_ns: "hyperledger".to_string(),
            arch: "x86_64".to_string(),
            version: "1.0.0".to_string(),
            network: "samplenet".to_string(),
            domain: "example.com".to_string(),
            orderer_type: OrdererKind::Solo,
            db: StorageSpec {
                provider: StorageProvider::DocumentDb,
                port: 5984,
                host_port: 5984,
                namespace: "hyperledger".to_string(),
                image: "fabric-couchdb".to_string(),
                username: String::new(),
                password: String::new(),
                driver: String::new(),
                db: String::new(),
            },
            orderer_nodes: 1,
            peer_orgs: 2,
            peers_per_org: 1,
            users_per_org: 1,
            log_level: "DEBUG".to_string(),
            tls_enabled: false,
            chaincodes_path: None,
        }
    }

    #[test]
    fn test_parse_network_yaml() {
        let yaml = r#"
DOCKER_NS: hyperledger
ARCH: x86_64
VERSION: 1.0.0
network: samplenet
domain: example.com
ordererType: kafka
ordererNodes: 3
peerOrganizations: 2
peersPerOrganization: 2
usersPerOrganization: 0
tlsEnabled: true
chaincodesPath: ./chaincodes
db:
  provider: goleveldb
  port: 5984
  hostPort: 5984
"#;
        let spec: NetworkSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.orderer_type, OrdererKind::Kafka);
        assert_eq!(spec.db.provider, StorageProvider::EmbeddedKv);
        assert_eq!(spec.peers_per_org, 2);
        assert_eq!(spec.users_per_org, 0);
        assert_eq!(spec.log_level, "INFO");
        assert!(spec.tls_enabled);
        assert_eq!(spec.chaincodes_path, Some(PathBuf::from("./chaincodes")));
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_unsupported_orderer_type() {
        let yaml = r#"
DOCKER_NS: hyperledger
ARCH: x86_64
VERSION: 1.0.0
network: samplenet
domain: example.com
ordererType: raft
ordererNodes: 1
peerOrganizations: 1
peersPerOrganization: 1
db:
  provider: goleveldb
  port: 5984
  hostPort: 5984
"#;
        let err = serde_yaml::from_str::<NetworkSpec>(yaml).unwrap_err();
        assert!(err.to_string().contains("Unsupported orderer type raft"));
    }

    #[test]
    fn test_unsupported_db_provider() {
        let yaml = r#"
DOCKER_NS: hyperledger
ARCH: x86_64
VERSION: 1.0.0
network: samplenet
domain: example.com
ordererType: solo
ordererNodes: 1
peerOrganizations: 1
peersPerOrganization: 1
db:
  provider: rocksdb
  port: 5984
  hostPort: 5984
"#;
        let err = serde_yaml::from_str::<NetworkSpec>(yaml).unwrap_err();
        assert!(err.to_string().contains("Unsupported db provider rocksdb"));
    }

    #[test]
    fn test_solo_requires_single_orderer() {
        let mut spec = sample_spec();
        spec.orderer_nodes = 2;
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("Only one orderer node"));

        spec.orderer_type = OrdererKind::Kafka;
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_counts() {
        let mut spec = sample_spec();
        spec.peer_orgs = 0;
        assert!(spec.validate().is_err());

        let mut spec = sample_spec();
        spec.peers_per_org = 0;
        assert!(spec.validate().is_err());

        let mut spec = sample_spec();
        spec.orderer_nodes = 0;
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("greater than 0"));
    }

    #[test]
    fn test_zero_users_is_valid() {
        let mut spec = sample_spec();
        spec.users_per_org = 0;
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_required_strings() {
        let mut spec = sample_spec();
        spec.docker_ns = String::new();
        assert!(spec.validate().unwrap_err().to_string().contains("DOCKER_NS"));

        let mut spec = sample_spec();
        spec.version = "  ".to_string();
        assert!(spec.validate().unwrap_err().to_string().contains("VERSION"));

        let mut spec = sample_spec();
        spec.network = "../escape".to_string();
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_storage_ports_must_not_overlap_network_ports() {
        let mut spec = sample_spec();
        spec.db.host_port = 7060;
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("overlap"));

        // Just below the orderer base is fine for two peers
        spec.db.host_port = 7048;
        assert!(spec.validate().is_ok());

        // ...but a third peer would reach 7050
        spec.peer_orgs = 3;
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_port_space_exhaustion() {
        let mut spec = sample_spec();
        spec.peer_orgs = 1000;
        spec.peers_per_org = 10;
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("beyond"));
    }
}
