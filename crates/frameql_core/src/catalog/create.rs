//! Create messages and outcomes.
use std::fmt;

use super::entry::Producer;
use crate::backend::Backend;

/// Behavior on create conflict.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OnConflict {
    /// Ignore and return ok.
    ///
    /// CREATE IF NOT EXISTS
    Ignore,

    /// Replace the original entry.
    ///
    /// CREATE OR REPLACE
    Replace,

    /// Error on conflict.
    #[default]
    Error,
}

impl OnConflict {
    /// Get the conflict behavior from the `OR REPLACE` and `IF NOT EXISTS`
    /// modifiers.
    pub const fn from_modifiers(or_replace: bool, if_not_exists: bool) -> Self {
        match (or_replace, if_not_exists) {
            (true, _) => OnConflict::Replace,
            (false, true) => OnConflict::Ignore,
            (false, false) => OnConflict::Error,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateRelationInfo {
    pub name: String,
    pub producer: Producer,
    pub backend: Backend,
    pub on_conflict: OnConflict,
}

impl CreateRelationInfo {
    pub fn new(name: impl Into<String>, producer: Producer) -> Self {
        CreateRelationInfo {
            name: name.into(),
            producer,
            backend: Backend::Cpu,
            on_conflict: OnConflict::Error,
        }
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_on_conflict(mut self, on_conflict: OnConflict) -> Self {
        self.on_conflict = on_conflict;
        self
    }
}

/// What a successful create did to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// Name was unbound and is now bound.
    Created,
    /// Name was bound and has been rebound to the new relation.
    Replaced,
    /// Name was bound and left untouched.
    Skipped,
}

impl fmt::Display for CreateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Replaced => write!(f, "replaced"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}
