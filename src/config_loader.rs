use crate::config::{ConfigError, NetworkSpec};
use log::{info, warn};
use std::fs::File;
use std::path::Path;

/// Load, parse and validate a network description from a YAML file.
///
/// Validation runs eagerly: a spec that comes back from here satisfies every
/// invariant the topology synthesizer relies on.
pub fn load_config(config_path: &Path) -> Result<NetworkSpec, ConfigError> {
    info!("Loading network configuration from: {:?}", config_path);

    let file = File::open(config_path).map_err(|source| ConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;

    let spec: NetworkSpec = serde_yaml::from_reader(file).map_err(|source| ConfigError::Parse {
        path: config_path.to_path_buf(),
        source,
    })?;

    spec.validate()?;

    if spec.users_per_org == 0 {
        warn!("usersPerOrganization is 0: no end-user identities will be issued");
    }

    info!(
        "Network '{}' ({}): {} {} orderer(s), {} organization(s) x {} peer(s), db {}",
        spec.network,
        spec.domain,
        spec.orderer_nodes,
        spec.orderer_type.as_str(),
        spec.peer_orgs,
        spec.peers_per_org,
        spec.db.provider.as_str()
    );

    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID: &str = r#"
DOCKER_NS: hyperledger
ARCH: x86_64
VERSION: 1.0.0
network: samplenet
domain: example.com
ordererType: solo
ordererNodes: 1
peerOrganizations: 2
peersPerOrganization: 1
usersPerOrganization: 1
db:
  provider: CouchDB
  port: 5984
  hostPort: 5984
  image: fabric-couchdb
"#;

    #[test]
    fn test_load_valid_config() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", VALID).unwrap();

        let spec = load_config(temp_file.path()).unwrap();
        assert_eq!(spec.network, "samplenet");
        assert_eq!(spec.total_peers(), 2);
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/samplenet.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_malformed_yaml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "network: [unterminated").unwrap();

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_required_field() {
        let yaml = VALID.replace("peersPerOrganization: 1\n", "");
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("peersPerOrganization"));
    }

    #[test]
    fn test_invariant_violation_is_reported() {
        let yaml = VALID.replace("ordererNodes: 1", "ordererNodes: 2");
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
