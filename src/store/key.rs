//! Store key addressing.
//!
//! `uid:<string>` addresses the scoring space, `i:<integer>` the interests
//! space. Any other key is rejected.

use std::fmt;

use crate::store::StoreError;

const SCORING_PREFIX: &str = "uid:";
const INTERESTS_PREFIX: &str = "i:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Space {
    Scoring,
    Interests,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordId {
    Text(String),
    Int(i64),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Text(s) => f.write_str(s),
            RecordId::Int(i) => write!(f, "{}", i),
        }
    }
}

/// A parsed key: which space, which record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey {
    pub space: Space,
    pub id: RecordId,
}

impl StoreKey {
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        if let Some(id) = raw.strip_prefix(SCORING_PREFIX) {
            return Ok(Self {
                space: Space::Scoring,
                id: RecordId::Text(id.to_string()),
            });
        }
        if let Some(id) = raw.strip_prefix(INTERESTS_PREFIX) {
            let id = id
                .parse()
                .map_err(|_| StoreError::InvalidKey(raw.to_string()))?;
            return Ok(Self {
                space: Space::Interests,
                id: RecordId::Int(id),
            });
        }
        Err(StoreError::InvalidKey(raw.to_string()))
    }

    pub fn scoring(uid: impl Into<String>) -> Self {
        Self {
            space: Space::Scoring,
            id: RecordId::Text(uid.into()),
        }
    }

    pub fn interests(client_id: i64) -> Self {
        Self {
            space: Space::Interests,
            id: RecordId::Int(client_id),
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.space {
            Space::Scoring => write!(f, "{}{}", SCORING_PREFIX, self.id),
            Space::Interests => write!(f, "{}{}", INTERESTS_PREFIX, self.id),
        }
    }
}
