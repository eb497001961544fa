//! External generation tools.
//!
//! Certificate material and channel artifacts come from two opaque binaries,
//! `cryptogen` and `configtxgen`. This module describes an invocation, finds
//! the binary for the host platform and runs it to completion. Success is
//! judged on the exit status alone.

pub mod process;
pub mod resolver;

pub use process::ProcessToolRunner;
pub use resolver::{EnvOverrideResolver, PlatformResolver, ToolResolver};

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Environment variable telling `configtxgen` where `configtx.yaml` lives
pub const CONFIG_PATH_ENV: &str = "FABRIC_CFG_PATH";

/// The generation tools the pipeline knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// Issues certificates for every organization, orderer and peer
    Cryptogen,
    /// Produces the genesis block and channel creation transaction
    Configtxgen,
}

impl Tool {
    /// Executable file name
    pub fn binary_name(&self) -> &'static str {
        match self {
            Tool::Cryptogen => "cryptogen",
            Tool::Configtxgen => "configtxgen",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary_name())
    }
}

/// One run of an external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub tool: Tool,
    pub args: Vec<String>,
    /// Working directory, inherited from this process when `None`
    pub work_dir: Option<PathBuf>,
    /// Variables added on top of this process' environment
    pub env: BTreeMap<String, String>,
}

impl ToolInvocation {
    pub fn new(tool: Tool) -> Self {
        Self {
            tool,
            args: Vec::new(),
            work_dir: None,
            env: BTreeMap::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a flag followed by its value
    pub fn flag(self, flag: &str, value: impl Into<String>) -> Self {
        self.arg(flag).arg(value)
    }

    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    pub fn env(mut self, key: &str, value: impl Into<String>) -> Self {
        self.env.insert(key.to_string(), value.into());
        self
    }
}

/// Errors raised while resolving or running a tool
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Cannot resolve {tool}: {reason}")]
    Unresolved { tool: Tool, reason: String },

    #[error("{tool} binary not found: {path:?}")]
    NotFound { tool: Tool, path: PathBuf },

    #[error("{tool} binary is not executable: {path:?}")]
    NotExecutable { tool: Tool, path: PathBuf },

    #[error("Failed to start {tool} {args:?}: {source}")]
    Spawn {
        tool: Tool,
        args: Vec<String>,
        source: std::io::Error,
    },

    #[error("{tool} {args:?} exited unsuccessfully: {status}")]
    Exit {
        tool: Tool,
        args: Vec<String>,
        status: String,
    },
}

/// Runs tool invocations. Blocks until the tool exits.
pub trait ToolRunner {
    fn invoke(&self, invocation: &ToolInvocation) -> Result<(), ToolError>;
}
