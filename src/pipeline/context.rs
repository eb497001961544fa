use log::info;
use std::path::{Path, PathBuf};

use crate::config::NetworkSpec;
use crate::staging::{self, StagingError, StagingLayout};
use crate::topology::{synthesize, Topology};

/// File name of the optional topology dump
pub const TOPOLOGY_FILE: &str = "topology.json";

/// Everything derived from the loaded spec, built once and shared read-only
/// by every pipeline step.
#[derive(Debug, Clone)]
pub struct NetworkContext {
    spec: NetworkSpec,
    topology: Topology,
    layout: StagingLayout,
}

impl NetworkContext {
    /// Synthesize the topology for a validated spec and place its staging
    /// directory under `output_root`.
    pub fn new(spec: NetworkSpec, output_root: &Path) -> Result<Self, StagingError> {
        let layout = StagingLayout::new(output_root, &spec.network)?;
        let topology = synthesize(&spec);
        Ok(Self {
            spec,
            topology,
            layout,
        })
    }

    pub fn spec(&self) -> &NetworkSpec {
        &self.spec
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn layout(&self) -> &StagingLayout {
        &self.layout
    }

    /// Write the synthesized topology as JSON next to the other artifacts.
    pub fn write_topology(&self) -> Result<PathBuf, StagingError> {
        let path = self.layout.artifact(TOPOLOGY_FILE);
        let json = serde_json::to_string_pretty(&self.topology).map_err(|e| StagingError::Write {
            path: path.clone(),
            source: e.into(),
        })?;
        staging::write_file(&path, &json)?;
        info!("Wrote topology to {:?}", path);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::sample_spec;
    use tempfile::TempDir;

    #[test]
    fn test_context_synthesizes_once() {
        let temp = TempDir::new().unwrap();
        let context = NetworkContext::new(sample_spec(), temp.path()).unwrap();
        assert_eq!(context.topology().peers.len(), 2);
        assert!(context.layout().network_dir().ends_with("samplenet"));
    }

    #[test]
    fn test_write_topology() {
        let temp = TempDir::new().unwrap();
        let context = NetworkContext::new(sample_spec(), temp.path()).unwrap();
        let path = context.write_topology().unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["peers"][1]["name"], "peer1.org2.example.com");
        assert_eq!(json["orderers"][0]["port"], 7050);
        assert_eq!(json["db_provider"], "CouchDB");
    }
}
