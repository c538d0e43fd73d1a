//! Line Injector - 行匹配与替换
//!
//! Applies an ordered list of directives to a block of text. Every directive
//! scans the content produced by the directives before it, so a later
//! directive for the same key overrides an earlier one.
//!
//! Matching modes:
//! - Legacy: the literal key followed by an optional `:` / `=` and the rest of
//!   the physical line, anywhere in the content. A key that is a substring of
//!   another key, or that appears inside a value, also matches.
//! - Anchored: the key must start a line (leading blanks allowed) and be
//!   followed by `:` or `=`.
//!
//! In both modes every match is replaced by the directive's raw line.

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Directive, InjectError};

/// 匹配策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    Legacy,
    Anchored,
}

/// Per-directive result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Replaced,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectiveOutcome {
    pub directive: Directive,
    pub outcome: Outcome,
}

/// Patched content plus one outcome per input directive, in input order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InjectionReport {
    #[serde(skip)]
    pub content: String,
    pub outcomes: Vec<DirectiveOutcome>,
    pub changed: bool,
}

impl InjectionReport {
    pub fn replaced_count(&self) -> usize {
        self.count(Outcome::Replaced)
    }

    pub fn not_found_count(&self) -> usize {
        self.count(Outcome::NotFound)
    }

    fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.iter().filter(|o| o.outcome == outcome).count()
    }
}

/// 行注入器
#[derive(Debug, Clone, Copy, Default)]
pub struct LineInjector {
    mode: MatchMode,
}

impl LineInjector {
    pub fn new(mode: MatchMode) -> Self {
        Self { mode }
    }

    /// Build the search pattern for one directive.
    ///
    /// `[^\r\n]*` stops before a CR so CRLF files keep their line endings.
    fn pattern(&self, directive: &Directive) -> Result<Regex, InjectError> {
        let source = match self.mode {
            MatchMode::Legacy => format!("{}:?=?[^\r\n]*", regex::escape(directive.key())),
            MatchMode::Anchored => format!(
                "(?m)^[ \t]*{}[ \t]*[:=][^\r\n]*",
                regex::escape(directive.key().trim())
            ),
        };

        Regex::new(&source).map_err(|source| InjectError::Pattern {
            key: directive.key().to_string(),
            source,
        })
    }

    /// Apply `directives` to `content` in order.
    ///
    /// Returns an error only if a key cannot be compiled into a pattern
    /// (regex size limits on pathological keys). A key that is not present
    /// is reported as [`Outcome::NotFound`] and never aborts the run.
    pub fn inject(
        &self,
        content: &str,
        directives: &[Directive],
    ) -> Result<InjectionReport, InjectError> {
        let mut current = content.to_string();
        let mut outcomes = Vec::with_capacity(directives.len());

        for directive in directives {
            let pattern = self.pattern(directive)?;

            let outcome = if pattern.is_match(&current) {
                debug!(
                    key = directive.key(),
                    matches = pattern.find_iter(&current).count(),
                    "replacing property"
                );
                current = pattern
                    .replace_all(&current, NoExpand(directive.raw_line()))
                    .into_owned();
                Outcome::Replaced
            } else {
                debug!(key = directive.key(), "property not found");
                Outcome::NotFound
            };

            outcomes.push(DirectiveOutcome {
                directive: directive.clone(),
                outcome,
            });
        }

        let changed = current != content;
        Ok(InjectionReport {
            content: current,
            outcomes,
            changed,
        })
    }
}
