//! Artifact pipeline.
//!
//! Drives template rendering and the external tools, in dependency order, to
//! turn a [`NetworkContext`] into a ready-to-run network directory. The first
//! failing step aborts the run and nothing after it is attempted.

pub mod context;
pub mod steps;

pub use context::NetworkContext;
pub use steps::{Artifact, Step};

use log::info;
use std::path::{Path, PathBuf};

use crate::render::{
    RenderError, TemplateSet, CONFIGTX_TEMPLATE, CRYPTO_CONFIG_TEMPLATE, DOCKER_COMPOSE_TEMPLATE,
    PULL_IMAGES_TEMPLATE,
};
use crate::staging::{self, StagingError};
use crate::tools::{Tool, ToolError, ToolInvocation, ToolRunner, CONFIG_PATH_ENV};

/// Errors raised while running the pipeline
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Step {step} failed: {source}")]
    Staging {
        step: Step,
        #[source]
        source: StagingError,
    },

    #[error("Step {step} failed: {source}")]
    Render {
        step: Step,
        #[source]
        source: RenderError,
    },

    #[error("Step {step} failed: {source}")]
    Tool {
        step: Step,
        #[source]
        source: ToolError,
    },

    #[error("Step {step} cannot start: {artifact} is missing at {path:?}")]
    MissingPrerequisite {
        step: Step,
        artifact: Artifact,
        path: PathBuf,
    },

    #[error("Invalid plan: step {step} requires {artifact}, which no earlier step produces")]
    InvalidPlan { step: Step, artifact: Artifact },
}

impl PipelineError {
    /// The step that failed
    pub fn step(&self) -> Step {
        match self {
            PipelineError::Staging { step, .. }
            | PipelineError::Render { step, .. }
            | PipelineError::Tool { step, .. }
            | PipelineError::MissingPrerequisite { step, .. }
            | PipelineError::InvalidPlan { step, .. } => *step,
        }
    }
}

/// What a completed run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub executed: Vec<Step>,
    /// Whether a chaincode directory was copied into the volumes
    pub chaincodes_staged: bool,
    pub network_dir: PathBuf,
}

/// Runs a plan of steps against one network.
pub struct Pipeline<'a> {
    context: &'a NetworkContext,
    templates: &'a TemplateSet,
    tools: &'a dyn ToolRunner,
    plan: Vec<Step>,
}

impl<'a> Pipeline<'a> {
    /// Pipeline running the full generation plan
    pub fn new(
        context: &'a NetworkContext,
        templates: &'a TemplateSet,
        tools: &'a dyn ToolRunner,
    ) -> Self {
        Self {
            context,
            templates,
            tools,
            plan: Step::PLAN.to_vec(),
        }
    }

    /// Pipeline running a custom plan. The plan is rejected if a step needs an
    /// artifact that no earlier step produces.
    pub fn with_plan(
        context: &'a NetworkContext,
        templates: &'a TemplateSet,
        tools: &'a dyn ToolRunner,
        plan: Vec<Step>,
    ) -> Result<Self, PipelineError> {
        if let Some((step, artifact)) = steps::unmet_requirement(&plan) {
            return Err(PipelineError::InvalidPlan { step, artifact });
        }
        Ok(Self {
            context,
            templates,
            tools,
            plan,
        })
    }

    /// Execute every step in order, stopping at the first failure.
    pub fn run(&self) -> Result<PipelineReport, PipelineError> {
        let network_dir = self.context.layout().network_dir().to_path_buf();
        info!("Generating network {:?} in {:?}", self.context.spec().network, network_dir);

        let mut report = PipelineReport {
            network_dir,
            ..Default::default()
        };
        for step in &self.plan {
            self.run_step(*step, &mut report)?;
        }

        info!("Network {} generated", self.context.spec().network);
        Ok(report)
    }

    fn run_step(&self, step: Step, report: &mut PipelineReport) -> Result<(), PipelineError> {
        self.check_prerequisites(step)?;

        info!("> {}...", step.description());
        match step {
            Step::PrepareStaging => self.prepare_staging(step)?,
            Step::RenderCryptoConfig => self.render_to(
                step,
                CRYPTO_CONFIG_TEMPLATE,
                self.context.topology(),
                Artifact::CryptoConfigFile,
            )?,
            Step::GenerateCryptoMaterial => self.generate_crypto_material(step)?,
            Step::CopyChaincodes => report.chaincodes_staged = self.copy_chaincodes(step)?,
            Step::RenderChannelConfig => self.render_to(
                step,
                CONFIGTX_TEMPLATE,
                self.context.topology(),
                Artifact::ChannelConfigFile,
            )?,
            Step::RenderComposeFile => self.render_to(
                step,
                DOCKER_COMPOSE_TEMPLATE,
                self.context.topology(),
                Artifact::ComposeFile,
            )?,
            Step::GenerateGenesisBlock => self.generate_genesis_block(step)?,
            Step::GenerateChannelTransaction => self.generate_channel_transaction(step)?,
            Step::RenderPullImagesScript => {
                self.render_to(
                    step,
                    PULL_IMAGES_TEMPLATE,
                    self.context.spec(),
                    Artifact::PullImagesScript,
                )?;
                let script = Artifact::PullImagesScript.path(self.context.layout());
                staging::mark_executable(&script)
                    .map_err(|source| PipelineError::Staging { step, source })?;
            }
        }
        info!("> {}... Success!", step.description());

        report.executed.push(step);
        Ok(())
    }

    /// Clear material from earlier runs, including a topology dump that may
    /// describe a different network.
    fn prepare_staging(&self, step: Step) -> Result<(), PipelineError> {
        let layout = self.context.layout();
        layout
            .prepare()
            .and_then(|()| staging::remove_file(&layout.artifact(context::TOPOLOGY_FILE)))
            .map_err(|source| PipelineError::Staging { step, source })
    }

    fn check_prerequisites(&self, step: Step) -> Result<(), PipelineError> {
        for artifact in step.requires() {
            let path = artifact.path(self.context.layout());
            if !path.exists() {
                return Err(PipelineError::MissingPrerequisite {
                    step,
                    artifact: *artifact,
                    path,
                });
            }
        }
        Ok(())
    }

    fn render_to<T: serde::Serialize>(
        &self,
        step: Step,
        template: &str,
        data: &T,
        artifact: Artifact,
    ) -> Result<(), PipelineError> {
        let content = self
            .templates
            .render(template, data)
            .map_err(|source| PipelineError::Render { step, source })?;
        staging::write_file(&artifact.path(self.context.layout()), &content)
            .map_err(|source| PipelineError::Staging { step, source })
    }

    fn invoke(&self, step: Step, invocation: ToolInvocation) -> Result<(), PipelineError> {
        self.tools
            .invoke(&invocation)
            .map_err(|source| PipelineError::Tool { step, source })
    }

    fn generate_crypto_material(&self, step: Step) -> Result<(), PipelineError> {
        let layout = self.context.layout();
        let invocation = ToolInvocation::new(Tool::Cryptogen)
            .arg("generate")
            .flag("--config", path_arg(&Artifact::CryptoConfigFile.path(layout)))
            .flag("--output", path_arg(&layout.crypto_config_dir()))
            .work_dir(layout.network_dir());
        self.invoke(step, invocation)
    }

    /// Returns whether anything was copied.
    fn copy_chaincodes(&self, step: Step) -> Result<bool, PipelineError> {
        let Some(source) = &self.context.spec().chaincodes_path else {
            info!(
                "> Chaincodes path was not specified, \
                 no chaincode will be included into peer containers"
            );
            return Ok(false);
        };
        staging::copy_tree(source, &self.context.layout().chaincodes_dir())
            .map_err(|source| PipelineError::Staging { step, source })?;
        Ok(true)
    }

    fn configtxgen(&self, profile_suffix: &str) -> ToolInvocation {
        let network_dir = self.context.layout().network_dir();
        ToolInvocation::new(Tool::Configtxgen)
            .flag("-profile", format!("{}{}", self.context.topology().name, profile_suffix))
            .env(CONFIG_PATH_ENV, path_arg(network_dir))
            .work_dir(network_dir)
    }

    fn generate_genesis_block(&self, step: Step) -> Result<(), PipelineError> {
        let output = Artifact::GenesisBlock.path(self.context.layout());
        let invocation = self
            .configtxgen("Genesis")
            .flag("-outputBlock", path_arg(&output));
        self.invoke(step, invocation)
    }

    fn generate_channel_transaction(&self, step: Step) -> Result<(), PipelineError> {
        let output = Artifact::ChannelTransaction.path(self.context.layout());
        let invocation = self
            .configtxgen("Channel")
            .flag("-outputCreateChannelTx", path_arg(&output))
            .flag("-channelID", steps::CHANNEL_ID);
        self.invoke(step, invocation)
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
