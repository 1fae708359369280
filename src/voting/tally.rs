use crate::models::{Ballot, Election, Nomination, NomineeRef};
use crate::voting::percentage;
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

/// Vote count and share for one nominee in one position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TallyResult {
    pub position_index: usize,
    pub position_title: String,
    pub nominee_id: String,
    pub nominee_name: String,
    pub vote_count: u32,
    pub percentage: f64,
}

/// A ballot selection naming someone who is not nominated for that position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingVote {
    pub voter_id: String,
    pub position_index: usize,
    pub nominee_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct Tally {
    pub results: Vec<TallyResult>,
    /// Selections that were left out of every count.
    pub dangling: Vec<DanglingVote>,
}

impl Tally {
    pub fn for_position(&self, position_index: usize) -> Vec<TallyResult> {
        self.results
            .iter()
            .filter(|result| result.position_index == position_index)
            .cloned()
            .collect()
    }

    pub fn total_votes(&self, position_index: usize) -> u32 {
        self.results
            .iter()
            .filter(|result| result.position_index == position_index)
            .map(|result| result.vote_count)
            .sum()
    }
}

struct NomineeCount<'a> {
    nominee: &'a NomineeRef,
    votes: u32,
}

pub fn tally_votes(election: &Election, nominations: &[Nomination], ballots: &[Ballot]) -> Tally {
    // Every nominee starts at zero so unvoted nominees still show up.
    // Repeat nominations of the same member collapse into one counter.
    let mut counters: BTreeMap<usize, Vec<NomineeCount>> = BTreeMap::new();
    for nomination in nominations {
        let nominees = counters.entry(nomination.position_index).or_default();
        if !nominees.iter().any(|count| count.nominee.id == nomination.nominee.id) {
            nominees.push(NomineeCount {
                nominee: &nomination.nominee,
                votes: 0,
            });
        }
    }

    let mut dangling = Vec::new();

    for ballot in ballots {
        if ballot.election_id != election.id {
            debug!(
                "Skipping ballot from {} for election {} while tallying {}",
                ballot.voter_id, ballot.election_id, election.id
            );
            continue;
        }

        for (position_index, selection) in &ballot.votes {
            let Some(nominee) = selection else {
                continue;
            };

            let counter = counters
                .get_mut(position_index)
                .and_then(|nominees| nominees.iter_mut().find(|count| count.nominee.id == nominee.id));

            match counter {
                Some(count) => count.votes += 1,
                None => dangling.push(DanglingVote {
                    voter_id: ballot.voter_id.clone(),
                    position_index: *position_index,
                    nominee_id: nominee.id.clone(),
                }),
            }
        }
    }

    let mut results = Vec::new();
    for (position_index, nominees) in &counters {
        let total_votes: u32 = nominees.iter().map(|count| count.votes).sum();
        let position_title = get_position_title(election, *position_index);

        for count in nominees {
            results.push(TallyResult {
                position_index: *position_index,
                position_title: position_title.clone(),
                nominee_id: count.nominee.id.clone(),
                nominee_name: count.nominee.name.clone(),
                vote_count: count.votes,
                percentage: percentage(count.votes, total_votes),
            });
        }
    }

    Tally { results, dangling }
}

fn get_position_title(election: &Election, position_index: usize) -> String {
    election
        .position(position_index)
        .map(|position| position.title.clone())
        .unwrap_or_else(|| "Unknown Position".to_string())
}
