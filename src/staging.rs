//! Filesystem staging.
//!
//! Directory layout of a generated network and the primitive file operations
//! the pipeline performs on it. Everything here assumes a single writer.

use log::debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const VOLUMES_DIR: &str = "volumes";
pub const CRYPTO_CONFIG_DIR: &str = "crypto-config";
pub const GENESIS_DIR: &str = "genesis";
pub const CHANNEL_ARTIFACTS_DIR: &str = "channel-artifacts";
pub const CHAINCODES_DIR: &str = "chaincodes";

/// Errors raised while writing the staging tree
#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("Failed to create directory {path:?}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Failed to write {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("Failed to copy {from:?} to {to:?}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("Failed to remove {path:?}: {source}")]
    Remove { path: PathBuf, source: io::Error },

    #[error("Failed to set permissions on {path:?}: {source}")]
    Permissions { path: PathBuf, source: io::Error },

    #[error("Cannot resolve {path:?} to an absolute path: {source}")]
    Resolve { path: PathBuf, source: io::Error },
}

/// Paths of everything the pipeline writes for one network.
///
/// ```text
/// <root>/<network>/
/// |-- crypto-config.yaml, configtx.yaml, docker-compose.yaml
/// |-- pull-docker-images.sh
/// \-- volumes/
///     |-- chaincodes/
///     \-- crypto-config/
///         |-- genesis/
///         \-- channel-artifacts/
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingLayout {
    network_dir: PathBuf,
}

impl StagingLayout {
    /// Layout rooted at `root/network`, made absolute against the current
    /// directory so tools can be launched from anywhere.
    pub fn new(root: &Path, network: &str) -> Result<Self, StagingError> {
        let root = std::path::absolute(root).map_err(|source| StagingError::Resolve {
            path: root.to_path_buf(),
            source,
        })?;
        Ok(Self {
            network_dir: root.join(network),
        })
    }

    pub fn network_dir(&self) -> &Path {
        &self.network_dir
    }

    pub fn volumes_dir(&self) -> PathBuf {
        self.network_dir.join(VOLUMES_DIR)
    }

    pub fn crypto_config_dir(&self) -> PathBuf {
        self.volumes_dir().join(CRYPTO_CONFIG_DIR)
    }

    pub fn genesis_dir(&self) -> PathBuf {
        self.crypto_config_dir().join(GENESIS_DIR)
    }

    pub fn channel_artifacts_dir(&self) -> PathBuf {
        self.crypto_config_dir().join(CHANNEL_ARTIFACTS_DIR)
    }

    pub fn chaincodes_dir(&self) -> PathBuf {
        self.volumes_dir().join(CHAINCODES_DIR)
    }

    /// Path of a generated file directly under the network directory
    pub fn artifact(&self, file_name: &str) -> PathBuf {
        self.network_dir.join(file_name)
    }

    /// Drop material from any previous run and recreate the empty tree.
    pub fn prepare(&self) -> Result<(), StagingError> {
        remove_tree(&self.volumes_dir())?;
        ensure_dir(&self.genesis_dir())?;
        ensure_dir(&self.channel_artifacts_dir())?;
        Ok(())
    }
}

/// Create `path` and any missing ancestors. Succeeds if it already exists.
pub fn ensure_dir(path: &Path) -> Result<(), StagingError> {
    fs::create_dir_all(path).map_err(|source| StagingError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `content` to `path`, replacing whatever was there.
pub fn write_file(path: &Path, content: &str) -> Result<(), StagingError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, content).map_err(|source| StagingError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Wrote {:?} ({} bytes)", path, content.len());
    Ok(())
}

/// Recursively copy the contents of `source` into `target`.
pub fn copy_tree(source: &Path, target: &Path) -> Result<(), StagingError> {
    let copy_err = |err: io::Error| StagingError::Copy {
        from: source.to_path_buf(),
        to: target.to_path_buf(),
        source: err,
    };

    ensure_dir(target)?;
    for entry in fs::read_dir(source).map_err(copy_err)? {
        let entry = entry.map_err(copy_err)?;
        let file_type = entry.file_type().map_err(copy_err)?;
        let dest = target.join(entry.file_name());
        if file_type.is_symlink() {
            copy_symlink(&entry.path(), &dest)?;
        } else if file_type.is_dir() {
            copy_tree(&entry.path(), &dest)?;
        } else {
            fs::copy(entry.path(), &dest).map_err(|err| StagingError::Copy {
                from: entry.path(),
                to: dest.clone(),
                source: err,
            })?;
        }
    }
    Ok(())
}

/// Recreate the link at `source` as `dest`, pointing at the same target.
/// Links are not followed, so relative targets stay relative to the copy.
#[cfg(unix)]
fn copy_symlink(source: &Path, dest: &Path) -> Result<(), StagingError> {
    let link_err = |err: io::Error| StagingError::Copy {
        from: source.to_path_buf(),
        to: dest.to_path_buf(),
        source: err,
    };
    let target = fs::read_link(source).map_err(link_err)?;
    remove_file(dest)?;
    std::os::unix::fs::symlink(&target, dest).map_err(link_err)
}

/// Without portable symlinks, copy whatever the link resolves to.
#[cfg(not(unix))]
fn copy_symlink(source: &Path, dest: &Path) -> Result<(), StagingError> {
    if source.is_dir() {
        return copy_tree(source, dest);
    }
    fs::copy(source, dest)
        .map(|_| ())
        .map_err(|err| StagingError::Copy {
            from: source.to_path_buf(),
            to: dest.to_path_buf(),
            source: err,
        })
}

/// Remove a single file or link if present.
pub fn remove_file(path: &Path) -> Result<(), StagingError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(StagingError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Remove a directory tree if present.
pub fn remove_tree(path: &Path) -> Result<(), StagingError> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(StagingError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Mark a generated script as executable (0755).
pub fn mark_executable(path: &Path) -> Result<(), StagingError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perm_err = |source| StagingError::Permissions {
            path: path.to_path_buf(),
            source,
        };
        let mut perms = fs::metadata(path).map_err(perm_err)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms).map_err(perm_err)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
