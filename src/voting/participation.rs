use crate::models::Ballot;
use crate::voting::percentage;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParticipationStats {
    pub total_eligible: u32,
    pub total_voted: u32,
    pub participation_percentage: f64,
}

impl ParticipationStats {
    pub fn calculate(total_eligible: u32, total_voted: u32) -> Self {
        Self {
            total_eligible,
            total_voted,
            participation_percentage: percentage(total_voted, total_eligible),
        }
    }

    /// Counts each voter in `election_id` once no matter how many ballots
    /// carry their id. Ballots for other elections are ignored.
    pub fn from_ballots(total_eligible: u32, election_id: &str, ballots: &[Ballot]) -> Self {
        let unique_voters: HashSet<&str> = ballots
            .iter()
            .filter(|ballot| ballot.election_id == election_id)
            .map(|ballot| ballot.voter_id.as_str())
            .collect();
        Self::calculate(total_eligible, unique_voters.len() as u32)
    }
}
