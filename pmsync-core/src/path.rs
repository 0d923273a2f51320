//! Collection addressing: `<owner>/<calendar>`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PmSyncError, PmSyncResult};

/// A validated collection path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CollectionPath {
    owner: String,
    name: String,
}

impl CollectionPath {
    pub fn new(owner: &str, name: &str) -> PmSyncResult<Self> {
        let path = CollectionPath {
            owner: owner.to_string(),
            name: name.to_string(),
        };
        if !is_valid_segment(owner) || !is_valid_segment(name) {
            return Err(PmSyncError::PathInvalid(path.to_string()));
        }
        Ok(path)
    }

    pub fn parse(path: &str) -> PmSyncResult<Self> {
        match path.split_once('/') {
            Some((owner, name)) if !name.contains('/') => Self::new(owner, name),
            _ => Err(PmSyncError::PathInvalid(path.to_string())),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A segment is non-empty, slash-free, and not a relative directory name.
fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && !segment.contains('/')
        && !segment.contains('\\')
        && !segment.contains('\0')
        && segment != "."
        && segment != ".."
}

/// Event uids double as file names, so they follow the segment rules too.
pub fn validate_uid(uid: &str) -> PmSyncResult<()> {
    if is_valid_segment(uid) && !uid.starts_with('.') {
        Ok(())
    } else {
        Err(PmSyncError::Validation(format!("invalid event uid '{uid}'")))
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for CollectionPath {
    type Err = PmSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CollectionPath {
    type Error = PmSyncError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<CollectionPath> for String {
    fn from(path: CollectionPath) -> Self {
        path.to_string()
    }
}
