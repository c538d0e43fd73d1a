//! Directive - 注入指令
//!
//! A directive is one literal `key=value` or `key:value` line supplied by the
//! caller. The whole line is what ends up in the patched file; the key is only
//! used to locate the line being replaced.

use serde::Serialize;

use crate::InjectError;

/// Separator between key and value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Delimiter {
    #[serde(rename = "=")]
    Equals,
    #[serde(rename = ":")]
    Colon,
}

impl Delimiter {
    pub fn as_char(self) -> char {
        match self {
            Delimiter::Equals => '=',
            Delimiter::Colon => ':',
        }
    }

    /// `=` wins whenever the line contains one, otherwise `:`.
    pub fn detect(line: &str) -> Self {
        if line.contains('=') {
            Delimiter::Equals
        } else {
            Delimiter::Colon
        }
    }
}

/// 单条注入指令
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directive {
    key: String,
    raw_line: String,
    delimiter: Delimiter,
}

impl Directive {
    /// Parse a single trimmed line. `line_no` is only used for error reporting.
    pub fn parse_line(line: &str, line_no: usize) -> Result<Self, InjectError> {
        let raw_line = line.trim();
        let delimiter = Delimiter::detect(raw_line);

        let Some((key, _value)) = raw_line.split_once(delimiter.as_char()) else {
            return Err(InjectError::InvalidDirectiveLine {
                line: line_no,
                content: raw_line.to_string(),
                reason: "missing ':' or '=' delimiter",
            });
        };

        if key.trim().is_empty() {
            return Err(InjectError::InvalidDirectiveLine {
                line: line_no,
                content: raw_line.to_string(),
                reason: "empty key",
            });
        }

        Ok(Self {
            key: key.to_string(),
            raw_line: raw_line.to_string(),
            delimiter,
        })
    }

    /// Key text exactly as written before the delimiter.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn raw_line(&self) -> &str {
        &self.raw_line
    }

    pub fn delimiter(&self) -> Delimiter {
        self.delimiter
    }
}

impl std::str::FromStr for Directive {
    type Err = InjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_line(s, 1)
    }
}

impl std::fmt::Display for Directive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw_line)
    }
}

/// Ordered directive list parsed from a multi-line block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveSet {
    directives: Vec<Directive>,
}

impl DirectiveSet {
    /// Parse a block of text: one directive per non-blank line.
    ///
    /// Blank lines are skipped silently. The first malformed line aborts the
    /// parse so that nothing is applied from a half-valid block.
    pub fn parse(block: &str) -> Result<Self, InjectError> {
        let mut directives = Vec::new();

        // str::lines handles both \n and \r\n
        for (idx, line) in block.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            directives.push(Directive::parse_line(line, idx + 1)?);
        }

        Ok(Self { directives })
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Directive> {
        self.directives.iter()
    }

    pub fn as_slice(&self) -> &[Directive] {
        &self.directives
    }
}
