//! Tool path resolution.
//!
//! Binaries are laid out per platform under a tools directory, e.g.
//! `tools/linux-amd64/cryptogen`. The platform id is read from the host once
//! per resolver and reused for every lookup.

use log::debug;
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use super::{Tool, ToolError};

/// Architecture suffix of the published tool bundles
const PLATFORM_ARCH: &str = "amd64";

/// Maps a tool to the binary that should be executed for it.
pub trait ToolResolver {
    fn resolve_tool_path(&self, tool: Tool) -> Result<PathBuf, ToolError>;
}

/// Resolves `<tools_dir>/<platform>/<tool>`.
#[derive(Debug)]
pub struct PlatformResolver {
    tools_dir: PathBuf,
    platform: OnceLock<String>,
}

impl PlatformResolver {
    /// Resolver that probes the host OS on first use
    pub fn new(tools_dir: impl Into<PathBuf>) -> Self {
        Self {
            tools_dir: tools_dir.into(),
            platform: OnceLock::new(),
        }
    }

    /// Resolver pinned to a platform id such as `linux-amd64`
    pub fn with_platform(tools_dir: impl Into<PathBuf>, platform: impl Into<String>) -> Self {
        let resolver = Self::new(tools_dir);
        let _ = resolver.platform.set(platform.into());
        resolver
    }

    /// Platform id, probing the host the first time it is needed.
    pub fn platform(&self, tool: Tool) -> Result<&str, ToolError> {
        if let Some(platform) = self.platform.get() {
            return Ok(platform.as_str());
        }
        let probed =
            probe_host_platform().map_err(|reason| ToolError::Unresolved { tool, reason })?;
        debug!("Detected tool platform {}", probed);
        Ok(self.platform.get_or_init(|| probed).as_str())
    }
}

impl ToolResolver for PlatformResolver {
    fn resolve_tool_path(&self, tool: Tool) -> Result<PathBuf, ToolError> {
        let platform = self.platform(tool)?;
        Ok(self.tools_dir.join(platform).join(tool.binary_name()))
    }
}

/// Lowercased `uname -s` with the bundle architecture appended.
fn probe_host_platform() -> Result<String, String> {
    let output = Command::new("uname")
        .arg("-s")
        .output()
        .map_err(|e| format!("failed to run uname: {}", e))?;
    if !output.status.success() {
        return Err(format!("uname exited with {}", output.status));
    }
    let os = String::from_utf8_lossy(&output.stdout).trim().to_lowercase();
    if os.is_empty() {
        return Err("uname returned an empty OS name".to_string());
    }
    Ok(platform_id(&os))
}

fn platform_id(os: &str) -> String {
    format!("{}-{}", os, PLATFORM_ARCH)
}

/// Lets an environment variable point straight at a binary, falling back to
/// another resolver. Variables are `FABRIC_NETGEN_CRYPTOGEN` and
/// `FABRIC_NETGEN_CONFIGTXGEN`.
#[derive(Debug)]
pub struct EnvOverrideResolver<R> {
    inner: R,
}

impl<R: ToolResolver> EnvOverrideResolver<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn env_var(tool: Tool) -> String {
        format!("FABRIC_NETGEN_{}", tool.binary_name().to_uppercase())
    }
}

impl<R: ToolResolver> ToolResolver for EnvOverrideResolver<R> {
    fn resolve_tool_path(&self, tool: Tool) -> Result<PathBuf, ToolError> {
        match env::var(Self::env_var(tool)) {
            Ok(path) if !path.is_empty() => {
                debug!("Using {} from {}", tool, Self::env_var(tool));
                Ok(PathBuf::from(path))
            }
            _ => self.inner.resolve_tool_path(tool),
        }
    }
}

/// Check that `path` exists and has an execute bit set.
pub fn validate_binary(tool: Tool, path: &Path) -> Result<(), ToolError> {
    let metadata = path.metadata().map_err(|_| ToolError::NotFound {
        tool,
        path: path.to_path_buf(),
    })?;

    if !metadata.is_file() {
        return Err(ToolError::NotFound {
            tool,
            path: path.to_path_buf(),
        });
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(ToolError::NotExecutable {
                tool,
                path: path.to_path_buf(),
            });
        }
    }

    Ok(())
}
