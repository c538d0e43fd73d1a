//! Core error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while parsing directives or loading job configuration.
///
/// These are configuration-level errors: they are always detected before
/// the target file is touched.
#[derive(Debug, Error)]
pub enum InjectError {
    #[error("invalid directive on line {line}: '{content}' ({reason})")]
    InvalidDirectiveLine {
        line: usize,
        content: String,
        reason: &'static str,
    },

    #[error("cannot build pattern for key '{key}': {source}")]
    Pattern {
        key: String,
        #[source]
        source: regex::Error,
    },

    #[error("Please set a valid path")]
    EmptyFilePath,

    #[error("Please set expression")]
    EmptyProperties,

    #[error("file path must be relative to the workspace: {0}")]
    AbsoluteFilePath(PathBuf),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
}
