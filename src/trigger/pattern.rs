// src/trigger/pattern.rs

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use globset::{Glob, GlobMatcher};
use regex::Regex;

use crate::errors::PatternError;

/// The four supported ways of matching a file name against a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// Byte-for-byte equality with the pattern.
    Exact,
    /// Equality after lower-casing both sides.
    CaseInsensitive,
    /// Shell-style wildcards: `*` matches any run, `?` a single character.
    Glob,
    /// Regular expression, tested from the start of the name.
    Regex,
}

impl FromStr for PatternKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(PatternKind::Exact),
            "case_insensitive" => Ok(PatternKind::CaseInsensitive),
            "glob" => Ok(PatternKind::Glob),
            "regex" => Ok(PatternKind::Regex),
            other => Err(format!(
                "invalid pattern kind: {other} (expected \"exact\", \"case_insensitive\", \"glob\" or \"regex\")"
            )),
        }
    }
}

/// A validated, compiled file name pattern.
///
/// Construction performs all validation; a built matcher cannot fail at
/// match time. Patterns apply to basenames only; the watched directory is
/// flat as far as matching is concerned.
pub struct PatternMatcher {
    raw: String,
    compiled: Compiled,
}

enum Compiled {
    Exact,
    /// The pattern, lower-cased once at construction.
    CaseInsensitive(String),
    Glob(GlobMatcher),
    Regex(Regex),
}

impl fmt::Debug for PatternMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternMatcher")
            .field("kind", &self.kind())
            .field("pattern", &self.raw)
            .finish_non_exhaustive()
    }
}

impl PatternMatcher {
    /// Validate and compile a pattern.
    ///
    /// Every kind rejects empty, all-dots, and slash-containing patterns.
    /// Globs must additionally contain at least one `*` or `?`; a glob
    /// without wildcards is almost certainly a misconfigured exact match.
    ///
    /// Regex patterns are compiled wrapped as `\A(?:...)` so that `matches`
    /// tests "matches from position 0", not "matches anywhere": `^a` and a
    /// bare `a` both test a prefix, and callers anchor the end with `$`
    /// themselves.
    pub fn new(kind: PatternKind, pattern: &str) -> Result<Self, PatternError> {
        validate_pattern(pattern)?;

        let compiled = match kind {
            PatternKind::Exact => Compiled::Exact,
            PatternKind::CaseInsensitive => Compiled::CaseInsensitive(pattern.to_lowercase()),
            PatternKind::Glob => {
                if !pattern.contains(['*', '?']) {
                    return Err(PatternError::MissingWildcard(pattern.to_string()));
                }
                Compiled::Glob(Glob::new(pattern)?.compile_matcher())
            }
            PatternKind::Regex => Compiled::Regex(Regex::new(&format!(r"\A(?:{pattern})"))?),
        };

        Ok(Self {
            raw: pattern.to_string(),
            compiled,
        })
    }

    pub fn kind(&self) -> PatternKind {
        match self.compiled {
            Compiled::Exact => PatternKind::Exact,
            Compiled::CaseInsensitive(_) => PatternKind::CaseInsensitive,
            Compiled::Glob(_) => PatternKind::Glob,
            Compiled::Regex(_) => PatternKind::Regex,
        }
    }

    /// The original pattern string, as given at construction time.
    pub fn pattern_label(&self) -> &str {
        &self.raw
    }

    /// Test a single candidate name.
    pub fn matches(&self, candidate: &str) -> bool {
        match &self.compiled {
            Compiled::Exact => candidate == self.raw,
            Compiled::CaseInsensitive(lowered) => candidate.to_lowercase() == *lowered,
            Compiled::Glob(glob) => glob.is_match(candidate),
            Compiled::Regex(re) => re.is_match(candidate),
        }
    }

    /// All members of `candidates` that match, in no particular order.
    pub fn find_matches(&self, candidates: &HashSet<String>) -> HashSet<String> {
        match &self.compiled {
            // An exact pattern can only ever match its own name.
            Compiled::Exact => {
                if candidates.contains(&self.raw) {
                    HashSet::from([self.raw.clone()])
                } else {
                    HashSet::new()
                }
            }
            // At most one name in a single directory listing compares equal
            // here, so stop at the first.
            Compiled::CaseInsensitive(lowered) => candidates
                .iter()
                .find(|name| name.to_lowercase() == *lowered)
                .map(|name| HashSet::from([name.clone()]))
                .unwrap_or_default(),
            _ => candidates
                .iter()
                .filter(|name| self.matches(name))
                .cloned()
                .collect(),
        }
    }
}

/// Validation shared by every pattern kind.
fn validate_pattern(pattern: &str) -> Result<(), PatternError> {
    if pattern.is_empty() {
        return Err(PatternError::Empty);
    }
    if pattern.chars().all(|c| c == '.') {
        return Err(PatternError::AllDots(pattern.to_string()));
    }
    if pattern.contains('/') {
        return Err(PatternError::ContainsSlash(pattern.to_string()));
    }
    Ok(())
}
