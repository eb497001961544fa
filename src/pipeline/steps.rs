//! Pipeline steps and the artifacts that link them.
//!
//! Every step names the artifacts it needs on disk before it can start and
//! the ones it leaves behind. A plan is only accepted when each requirement
//! is produced by an earlier step.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use crate::staging::StagingLayout;

pub const CRYPTO_CONFIG_FILE: &str = "crypto-config.yaml";
pub const CONFIGTX_FILE: &str = "configtx.yaml";
pub const DOCKER_COMPOSE_FILE: &str = "docker-compose.yaml";
pub const PULL_IMAGES_SCRIPT: &str = "pull-docker-images.sh";
pub const GENESIS_BLOCK_FILE: &str = "genesis.block";
pub const CHANNEL_ID: &str = "bigchannel";

/// A file or directory written by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    CryptoConfigFile,
    CryptoMaterial,
    Chaincodes,
    ChannelConfigFile,
    ComposeFile,
    GenesisBlock,
    ChannelTransaction,
    PullImagesScript,
}

impl Artifact {
    pub fn path(&self, layout: &StagingLayout) -> PathBuf {
        match self {
            Artifact::CryptoConfigFile => layout.artifact(CRYPTO_CONFIG_FILE),
            Artifact::CryptoMaterial => layout.crypto_config_dir(),
            Artifact::Chaincodes => layout.chaincodes_dir(),
            Artifact::ChannelConfigFile => layout.artifact(CONFIGTX_FILE),
            Artifact::ComposeFile => layout.artifact(DOCKER_COMPOSE_FILE),
            Artifact::GenesisBlock => layout.genesis_dir().join(GENESIS_BLOCK_FILE),
            Artifact::ChannelTransaction => layout
                .channel_artifacts_dir()
                .join(format!("{}.tx", CHANNEL_ID)),
            Artifact::PullImagesScript => layout.artifact(PULL_IMAGES_SCRIPT),
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Artifact::CryptoConfigFile => CRYPTO_CONFIG_FILE,
            Artifact::CryptoMaterial => "crypto material",
            Artifact::Chaincodes => "chaincodes",
            Artifact::ChannelConfigFile => CONFIGTX_FILE,
            Artifact::ComposeFile => DOCKER_COMPOSE_FILE,
            Artifact::GenesisBlock => GENESIS_BLOCK_FILE,
            Artifact::ChannelTransaction => "channel transaction",
            Artifact::PullImagesScript => PULL_IMAGES_SCRIPT,
        };
        f.write_str(name)
    }
}

/// One unit of work in the artifact pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    PrepareStaging,
    RenderCryptoConfig,
    GenerateCryptoMaterial,
    CopyChaincodes,
    RenderChannelConfig,
    RenderComposeFile,
    GenerateGenesisBlock,
    GenerateChannelTransaction,
    RenderPullImagesScript,
}

impl Step {
    /// The fixed order a network is generated in
    pub const PLAN: [Step; 9] = [
        Step::PrepareStaging,
        Step::RenderCryptoConfig,
        Step::GenerateCryptoMaterial,
        Step::CopyChaincodes,
        Step::RenderChannelConfig,
        Step::RenderComposeFile,
        Step::GenerateGenesisBlock,
        Step::GenerateChannelTransaction,
        Step::RenderPullImagesScript,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Step::PrepareStaging => "prepare-staging",
            Step::RenderCryptoConfig => "render-crypto-config",
            Step::GenerateCryptoMaterial => "generate-crypto-material",
            Step::CopyChaincodes => "copy-chaincodes",
            Step::RenderChannelConfig => "render-channel-config",
            Step::RenderComposeFile => "render-compose-file",
            Step::GenerateGenesisBlock => "generate-genesis-block",
            Step::GenerateChannelTransaction => "generate-channel-transaction",
            Step::RenderPullImagesScript => "render-pull-images-script",
        }
    }

    /// Progress line shown before the step runs
    pub fn description(&self) -> &'static str {
        match self {
            Step::PrepareStaging => "Preparing staging directories",
            Step::RenderCryptoConfig => "Generating crypto-config.yaml",
            Step::GenerateCryptoMaterial => "Generating crypto material",
            Step::CopyChaincodes => "Copying chaincodes to volumes",
            Step::RenderChannelConfig => "Generating configtx.yaml",
            Step::RenderComposeFile => "Generating docker-compose.yaml",
            Step::GenerateGenesisBlock => "Generating genesis block",
            Step::GenerateChannelTransaction => "Generating global channel config",
            Step::RenderPullImagesScript => "Generating script to pull docker images",
        }
    }

    pub fn requires(&self) -> &'static [Artifact] {
        match self {
            Step::GenerateCryptoMaterial => &[Artifact::CryptoConfigFile],
            Step::GenerateGenesisBlock | Step::GenerateChannelTransaction => {
                &[Artifact::ChannelConfigFile]
            }
            _ => &[],
        }
    }

    pub fn produces(&self) -> &'static [Artifact] {
        match self {
            Step::PrepareStaging => &[],
            Step::RenderCryptoConfig => &[Artifact::CryptoConfigFile],
            Step::GenerateCryptoMaterial => &[Artifact::CryptoMaterial],
            Step::CopyChaincodes => &[Artifact::Chaincodes],
            Step::RenderChannelConfig => &[Artifact::ChannelConfigFile],
            Step::RenderComposeFile => &[Artifact::ComposeFile],
            Step::GenerateGenesisBlock => &[Artifact::GenesisBlock],
            Step::GenerateChannelTransaction => &[Artifact::ChannelTransaction],
            Step::RenderPullImagesScript => &[Artifact::PullImagesScript],
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// First requirement in `plan` that no earlier step produces.
pub fn unmet_requirement(plan: &[Step]) -> Option<(Step, Artifact)> {
    let mut produced = HashSet::new();
    for step in plan {
        if let Some(missing) = step.requires().iter().find(|a| !produced.contains(*a)) {
            return Some((*step, *missing));
        }
        produced.extend(step.produces().iter().copied());
    }
    None
}
