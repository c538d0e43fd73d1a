//! propinject 配置
//!
//! 支持 YAML 任务文件和环境变量

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{DirectiveSet, InjectError, MatchMode};

/// Environment variable the build system uses to publish the workspace root
pub const WORKSPACE_ENV: &str = "WORKSPACE";

/// The target is always joined under the workspace root; an absolute path
/// (or a Windows drive/root prefix) would replace the root entirely.
pub fn ensure_relative(path: &Path) -> Result<(), InjectError> {
    if path.is_absolute() || path.has_root() {
        return Err(InjectError::AbsoluteFilePath(path.to_path_buf()));
    }
    Ok(())
}

/// 注入任务配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InjectConfig {
    /// Workspace root. Falls back to `$WORKSPACE`, then `.`
    #[serde(default)]
    pub workspace: Option<PathBuf>,

    /// Target file, relative to the workspace root
    #[serde(default)]
    pub file_path: String,

    /// One `key=value` or `key:value` directive per line
    #[serde(default)]
    pub injected_properties: String,

    #[serde(default)]
    pub match_mode: MatchMode,

    /// Compute outcomes without writing the file back
    #[serde(default)]
    pub dry_run: bool,
}

impl InjectConfig {
    pub fn new(file_path: impl Into<String>, injected_properties: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            injected_properties: injected_properties.into(),
            ..Self::default()
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, InjectError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a YAML job file
    pub fn load(path: &Path) -> Result<Self, InjectError> {
        let content = std::fs::read_to_string(path).map_err(|source| InjectError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Check the required fields and parse the directive block up front, so a
    /// malformed line is reported before any file is read or written.
    pub fn validate(&self) -> Result<DirectiveSet, InjectError> {
        if self.file_path.trim().is_empty() {
            return Err(InjectError::EmptyFilePath);
        }
        ensure_relative(Path::new(&self.file_path))?;
        if self.injected_properties.is_empty() {
            return Err(InjectError::EmptyProperties);
        }
        DirectiveSet::parse(&self.injected_properties)
    }

    /// Explicit workspace, else the value of `$WORKSPACE` (passed in by the
    /// caller), else the current directory.
    pub fn resolve_workspace(&self, env_workspace: Option<&str>) -> PathBuf {
        self.workspace
            .clone()
            .or_else(|| {
                env_workspace
                    .filter(|w| !w.trim().is_empty())
                    .map(PathBuf::from)
            })
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
