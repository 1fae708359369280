use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ElectionError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
}

impl Organization {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub organization_id: String,
    pub name: String,
}

impl Member {
    pub fn new(organization_id: String, name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            organization_id,
            name,
        }
    }

    pub fn as_nominee(&self) -> NomineeRef {
        NomineeRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Election {
    pub id: String,
    pub organization_id: String,
    pub title: String,
    pub description: String,
    /// Ordered; a position's index in this list is the key nominations and
    /// ballots refer to it by.
    pub positions: Vec<Position>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: ElectionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionStatus {
    Scheduled,
    Active,
    Completed,
}

impl ElectionStatus {
    /// The status an election with the given voting window should have at `now`.
    pub fn for_window(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now >= ends_at {
            ElectionStatus::Completed
        } else if now >= starts_at {
            ElectionStatus::Active
        } else {
            ElectionStatus::Scheduled
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ElectionStatus::Scheduled => "scheduled",
            ElectionStatus::Active => "active",
            ElectionStatus::Completed => "completed",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            ElectionStatus::Scheduled => 0,
            ElectionStatus::Active => 1,
            ElectionStatus::Completed => 2,
        }
    }
}

impl fmt::Display for ElectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElectionStatus {
    type Err = ElectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(ElectionStatus::Scheduled),
            "active" => Ok(ElectionStatus::Active),
            "completed" => Ok(ElectionStatus::Completed),
            other => Err(ElectionError::UnknownStatus(other.to_string())),
        }
    }
}

impl Election {
    pub fn new(
        organization_id: String,
        title: String,
        description: String,
        position_titles: Vec<String>,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();

        let positions = position_titles
            .into_iter()
            .map(|title| Position { title })
            .collect();

        Self {
            id: Uuid::new_v4().to_string(),
            organization_id,
            title,
            description,
            positions,
            starts_at,
            ends_at,
            status: ElectionStatus::for_window(starts_at, ends_at, now),
            created_at: now,
        }
    }

    pub fn position(&self, index: usize) -> Option<&Position> {
        self.positions.get(index)
    }

    /// The status this election should move to at `now`, if any. Status
    /// only ever moves forward.
    pub fn next_status(&self, now: DateTime<Utc>) -> Option<ElectionStatus> {
        let due = ElectionStatus::for_window(self.starts_at, self.ends_at, now);
        (due.rank() > self.status.rank()).then_some(due)
    }
}

/// A member as referenced from nominations and ballots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NomineeRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nomination {
    pub id: String,
    pub election_id: String,
    pub position_index: usize,
    pub nominee: NomineeRef,
    pub nominator_id: String,
    pub created_at: DateTime<Utc>,
}

impl Nomination {
    pub fn new(election_id: String, position_index: usize, nominee: NomineeRef, nominator_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            election_id,
            position_index,
            nominee,
            nominator_id,
            created_at: Utc::now(),
        }
    }
}

/// One voter's selections for an election. A `None` selection means the
/// voter skipped that position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ballot {
    pub election_id: String,
    pub voter_id: String,
    pub votes: BTreeMap<usize, Option<NomineeRef>>,
    pub cast_at: DateTime<Utc>,
}

impl Ballot {
    pub fn new(election_id: String, voter_id: String, votes: BTreeMap<usize, Option<NomineeRef>>) -> Self {
        Self {
            election_id,
            voter_id,
            votes,
            cast_at: Utc::now(),
        }
    }
}
