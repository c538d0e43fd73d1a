//! File Patch Orchestrator
//!
//! Resolves `<workspace>/<relative path>`, reads the file, runs the
//! [`LineInjector`] over it and writes the result back. A missing target file
//! is reported and treated as success; a key that is not found is a warning.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use propinject_core::{
    DirectiveSet, InjectConfig, InjectError, InjectionReport, LineInjector, MatchMode, Outcome,
    ensure_relative,
};

use crate::build_log::BuildLog;
use crate::fs::atomic_write;

/// Patch errors
#[derive(Debug, Error)]
pub enum PatchError {
    #[error(transparent)]
    Invalid(#[from] InjectError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchStatus {
    /// Directives were applied and the file was written back
    Patched,
    /// Directives were applied but nothing was written (dry run)
    DryRun,
    /// Target does not exist; nothing was done
    FileMissing,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatchSummary {
    pub path: PathBuf,
    pub status: PatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<InjectionReport>,
}

impl PatchSummary {
    pub fn replaced_count(&self) -> usize {
        self.report.as_ref().map_or(0, |r| r.replaced_count())
    }

    pub fn not_found_count(&self) -> usize {
        self.report.as_ref().map_or(0, |r| r.not_found_count())
    }
}

/// 文件补丁执行器
pub struct FilePatcher {
    injector: LineInjector,
    dry_run: bool,
    log: Arc<dyn BuildLog>,
}

impl std::fmt::Debug for FilePatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilePatcher")
            .field("injector", &self.injector)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl FilePatcher {
    pub fn new(log: Arc<dyn BuildLog>) -> Self {
        Self {
            injector: LineInjector::default(),
            dry_run: false,
            log,
        }
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.injector = LineInjector::new(mode);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Parse `directives_block` and apply it to `<workspace_root>/<relative_path>`.
    pub fn apply_to_file(
        &self,
        workspace_root: &Path,
        relative_path: &Path,
        directives_block: &str,
    ) -> Result<PatchSummary, PatchError> {
        let directives = DirectiveSet::parse(directives_block)?;
        self.apply_directives(workspace_root, relative_path, &directives)
    }

    pub fn apply_directives(
        &self,
        workspace_root: &Path,
        relative_path: &Path,
        directives: &DirectiveSet,
    ) -> Result<PatchSummary, PatchError> {
        ensure_relative(relative_path)?;
        let path = workspace_root.join(relative_path);
        self.log.info(&format!("reading file: {}", path.display()));

        // only NotFound counts as missing; other stat errors are I/O failures
        let exists = path.try_exists().map_err(|source| PatchError::Read {
            path: path.clone(),
            source,
        })?;
        if !exists {
            self.log
                .warn(&format!("the file does not exist: {}", path.display()));
            return Ok(PatchSummary {
                path,
                status: PatchStatus::FileMissing,
                report: None,
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|source| PatchError::Read {
            path: path.clone(),
            source,
        })?;

        let report = self.injector.inject(&content, directives.as_slice())?;

        for entry in &report.outcomes {
            match entry.outcome {
                Outcome::Replaced => self
                    .log
                    .info(&format!("-- replacing the property: {}", entry.directive)),
                Outcome::NotFound => self
                    .log
                    .warn(&format!("-! not found property: {}", entry.directive)),
            }
        }

        let status = if self.dry_run {
            debug!("dry run, leaving {} untouched", path.display());
            PatchStatus::DryRun
        } else {
            atomic_write(&path, &report.content).map_err(|source| PatchError::Write {
                path: path.clone(),
                source,
            })?;
            PatchStatus::Patched
        };

        Ok(PatchSummary {
            path,
            status,
            report: Some(report),
        })
    }
}

/// Validate `config` and run it. `env_workspace` is the value of `$WORKSPACE`
/// as seen by the caller.
pub fn apply_config(
    config: &InjectConfig,
    env_workspace: Option<&str>,
    log: Arc<dyn BuildLog>,
) -> Result<PatchSummary, PatchError> {
    let directives = config.validate()?;
    let workspace = config.resolve_workspace(env_workspace);

    FilePatcher::new(log)
        .with_mode(config.match_mode)
        .with_dry_run(config.dry_run)
        .apply_directives(&workspace, Path::new(&config.file_path), &directives)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_log::{LogLevel, MemoryLog};
    use tempfile::TempDir;

    fn setup(content: &str) -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let conf_dir = temp_dir.path().join("conf");
        std::fs::create_dir_all(&conf_dir).unwrap();
        let file_path = conf_dir.join("app.properties");
        std::fs::write(&file_path, content).unwrap();
        (temp_dir, file_path)
    }

    #[test]
    fn test_patch_file() {
        let (temp_dir, file_path) = setup("host=localhost\nport=8080\n");
        let log = Arc::new(MemoryLog::new());

        let summary = FilePatcher::new(log.clone())
            .apply_to_file(
                temp_dir.path(),
                Path::new("conf/app.properties"),
                "host=prod.example.com\nretries=3\n",
            )
            .unwrap();

        assert_eq!(summary.status, PatchStatus::Patched);
        assert_eq!(summary.replaced_count(), 1);
        assert_eq!(summary.not_found_count(), 1);
        assert_eq!(
            std::fs::read_to_string(&file_path).unwrap(),
            "host=prod.example.com\nport=8080\n"
        );

        let lines = log.lines();
        assert_eq!(
            lines[0].message,
            format!("reading file: {}", file_path.display())
        );
        assert_eq!(lines[1].message, "-- replacing the property: host=prod.example.com");
        assert_eq!(lines[1].level, LogLevel::Info);
        assert_eq!(lines[2].message, "-! not found property: retries=3");
        assert_eq!(lines[2].level, LogLevel::Warn);
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let log = Arc::new(MemoryLog::new());

        let summary = FilePatcher::new(log.clone())
            .apply_to_file(temp_dir.path(), Path::new("missing.properties"), "a=1")
            .unwrap();

        assert_eq!(summary.status, PatchStatus::FileMissing);
        assert!(summary.report.is_none());
        assert_eq!(summary.replaced_count(), 0);

        let expected = temp_dir.path().join("missing.properties");
        assert_eq!(
            log.messages(),
            vec![
                format!("reading file: {}", expected.display()),
                format!("the file does not exist: {}", expected.display()),
            ]
        );
        assert!(!expected.exists());
    }

    #[test]
    fn test_blank_block_leaves_file() {
        let (temp_dir, file_path) = setup("a=1\n");
        let log = Arc::new(MemoryLog::new());

        let summary = FilePatcher::new(log.clone())
            .apply_to_file(temp_dir.path(), Path::new("conf/app.properties"), "\n  \n")
            .unwrap();

        let report = summary.report.unwrap();
        assert!(report.outcomes.is_empty());
        assert_eq!(std::fs::read_to_string(&file_path).unwrap(), "a=1\n");
        assert_eq!(log.lines().len(), 1);
    }

    #[test]
    fn test_invalid_directive_writes_nothing() {
        let (temp_dir, file_path) = setup("a=1\n");
        let log = Arc::new(MemoryLog::new());

        let err = FilePatcher::new(log.clone())
            .apply_to_file(temp_dir.path(), Path::new("conf/app.properties"), "a=2\nbroken")
            .unwrap_err();

        assert!(matches!(
            err,
            PatchError::Invalid(InjectError::InvalidDirectiveLine { line: 2, .. })
        ));
        assert_eq!(std::fs::read_to_string(&file_path).unwrap(), "a=1\n");
        assert!(log.lines().is_empty());
    }

    #[test]
    fn test_dry_run() {
        let (temp_dir, file_path) = setup("a=1\n");
        let log = Arc::new(MemoryLog::new());

        let summary = FilePatcher::new(log)
            .with_dry_run(true)
            .apply_to_file(temp_dir.path(), Path::new("conf/app.properties"), "a=2")
            .unwrap();

        assert_eq!(summary.status, PatchStatus::DryRun);
        assert_eq!(summary.report.unwrap().content, "a=2\n");
        assert_eq!(std::fs::read_to_string(&file_path).unwrap(), "a=1\n");
    }

    #[test]
    fn test_anchored_mode() {
        let (temp_dir, file_path) = setup("dbhost=x\nhost=y\n");
        let log = Arc::new(MemoryLog::new());

        FilePatcher::new(log)
            .with_mode(MatchMode::Anchored)
            .apply_to_file(temp_dir.path(), Path::new("conf/app.properties"), "host=z")
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(&file_path).unwrap(),
            "dbhost=x\nhost=z\n"
        );
    }

    #[test]
    fn test_read_error_on_directory() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("conf")).unwrap();
        let log = Arc::new(MemoryLog::new());

        let err = FilePatcher::new(log)
            .apply_to_file(temp_dir.path(), Path::new("conf"), "a=1")
            .unwrap_err();
        assert!(matches!(err, PatchError::Read { .. }));
    }

    #[test]
    fn test_absolute_path_rejected() {
        let (_outside, file_path) = setup("a=1\n");
        let workspace = TempDir::new().unwrap();
        let log = Arc::new(MemoryLog::new());

        let err = FilePatcher::new(log.clone())
            .apply_to_file(workspace.path(), &file_path, "a=2")
            .unwrap_err();

        assert!(matches!(
            err,
            PatchError::Invalid(InjectError::AbsoluteFilePath(_))
        ));
        assert_eq!(std::fs::read_to_string(&file_path).unwrap(), "a=1\n");
        assert!(log.lines().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_target_patched_through_link() {
        let (temp_dir, real) = setup("a=1\n");
        let link = temp_dir.path().join("link.properties");
        std::os::unix::fs::symlink(&real, &link).unwrap();
        let log = Arc::new(MemoryLog::new());

        let summary = FilePatcher::new(log)
            .apply_to_file(temp_dir.path(), Path::new("link.properties"), "a=2")
            .unwrap();

        assert_eq!(summary.status, PatchStatus::Patched);
        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read_to_string(&real).unwrap(), "a=2\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_stat_failure_is_not_missing_file() {
        // a regular file used as a directory fails with ENOTDIR, not NotFound
        let (temp_dir, _) = setup("a=1\n");
        let log = Arc::new(MemoryLog::new());

        let err = FilePatcher::new(log.clone())
            .apply_to_file(
                temp_dir.path(),
                Path::new("conf/app.properties/nested.properties"),
                "a=2",
            )
            .unwrap_err();

        assert!(matches!(err, PatchError::Read { .. }));
        assert!(
            !log.messages()
                .iter()
                .any(|m| m.starts_with("the file does not exist"))
        );
    }

    #[test]
    fn test_apply_config_uses_env_workspace() {
        let (temp_dir, file_path) = setup("mode=dev\n");
        let log = Arc::new(MemoryLog::new());
        let config = InjectConfig::new("conf/app.properties", "mode=prod");

        let workspace = temp_dir.path().to_string_lossy().to_string();
        let summary = apply_config(&config, Some(&workspace), log).unwrap();

        assert_eq!(summary.status, PatchStatus::Patched);
        assert_eq!(std::fs::read_to_string(&file_path).unwrap(), "mode=prod\n");
    }

    #[test]
    fn test_apply_config_rejects_empty_path() {
        let log = Arc::new(MemoryLog::new());
        let config = InjectConfig::new("", "a=1");

        let err = apply_config(&config, None, log.clone()).unwrap_err();
        assert_eq!(err.to_string(), "Please set a valid path");
        assert!(log.lines().is_empty());
    }

    #[test]
    fn test_summary_serializes() {
        let (temp_dir, _) = setup("a=1\n");
        let log = Arc::new(MemoryLog::new());

        let summary = FilePatcher::new(log)
            .apply_to_file(temp_dir.path(), Path::new("conf/app.properties"), "a=2\nb=3")
            .unwrap();

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["status"], "patched");
        assert_eq!(json["report"]["outcomes"][0]["outcome"], "replaced");
        assert_eq!(json["report"]["outcomes"][1]["outcome"], "not_found");
        assert_eq!(json["report"]["outcomes"][1]["directive"]["raw_line"], "b=3");
    }
}
