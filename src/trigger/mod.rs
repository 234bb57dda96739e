// src/trigger/mod.rs

//! Triggers: a file name pattern paired with the action to run on matches.
//!
//! A trigger does not own any policy. Which candidate set it is offered,
//! what happens when its action fails, and when the matched file is deleted
//! are all decided by the dispatcher. A trigger only matches names and
//! forwards dispatches to its action.

pub mod pattern;

pub use pattern::{PatternKind, PatternMatcher};

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use anyhow::Result;

use crate::action::Action;

/// A (pattern, action) pair. The trigger list order is significant: the
/// dispatcher evaluates triggers in declaration order every cycle.
pub struct Trigger {
    matcher: PatternMatcher,
    action: Arc<dyn Action>,
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trigger")
            .field("kind", &self.matcher.kind())
            .field("pattern", &self.matcher.pattern_label())
            .finish_non_exhaustive()
    }
}

impl Trigger {
    pub fn new(matcher: PatternMatcher, action: Arc<dyn Action>) -> Self {
        Self { matcher, action }
    }

    /// All names in `candidates` that this trigger's pattern matches.
    pub fn find_matches(&self, candidates: &HashSet<String>) -> HashSet<String> {
        self.matcher.find_matches(candidates)
    }

    /// Run the action for one matched file.
    ///
    /// No retry here: failure handling (and the decision to delete the file
    /// anyway) belongs to the dispatcher.
    pub async fn dispatch(&self, name: &str, lines: &[String]) -> Result<()> {
        self.action.invoke(name, lines).await
    }

    /// Human-readable form of the original pattern, for diagnostics.
    pub fn pattern_label(&self) -> &str {
        self.matcher.pattern_label()
    }

    pub fn kind(&self) -> PatternKind {
        self.matcher.kind()
    }
}
