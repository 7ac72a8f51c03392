use std::fmt;

use super::entry::RelationKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropObject {
    /// Drop whatever is bound to the name. Used for DROP TABLE.
    Any,
    /// Only drop views.
    View,
}

impl DropObject {
    pub fn matches(&self, kind: RelationKind) -> bool {
        match self {
            Self::Any => true,
            Self::View => kind == RelationKind::View,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropInfo {
    pub name: String,
    pub object: DropObject,
    pub if_exists: bool,
}

impl DropInfo {
    pub fn table(name: impl Into<String>, if_exists: bool) -> Self {
        DropInfo {
            name: name.into(),
            object: DropObject::Any,
            if_exists,
        }
    }

    pub fn view(name: impl Into<String>, if_exists: bool) -> Self {
        DropInfo {
            name: name.into(),
            object: DropObject::View,
            if_exists,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Dropped,
    /// Nothing was bound and IF EXISTS was given.
    Missing,
}

impl fmt::Display for DropOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dropped => write!(f, "dropped"),
            Self::Missing => write!(f, "missing"),
        }
    }
}
