use crate::models::{Ballot, Election, Nomination};
use crate::voting::{resolve_position, tally_votes, DanglingVote, ParticipationStats, PositionOutcome, TallyResult};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PositionResults {
    pub position_index: usize,
    pub title: String,
    /// Highest count first.
    pub results: Vec<TallyResult>,
    pub total_votes: u32,
    pub outcome: PositionOutcome,
}

// Results for a whole election, recomputed on every request
#[derive(Debug, Clone, Serialize)]
pub struct ElectionResults {
    pub election_id: String,
    pub title: String,
    pub positions: Vec<PositionResults>,
    pub participation: ParticipationStats,
    pub dangling: Vec<DanglingVote>,
    pub summary: String,
}

pub fn calculate_results(
    election: &Election,
    nominations: &[Nomination],
    ballots: &[Ballot],
    total_eligible: u32,
) -> ElectionResults {
    let tally = tally_votes(election, nominations, ballots);
    let participation = ParticipationStats::from_ballots(total_eligible, &election.id, ballots);

    let positions: Vec<PositionResults> = election
        .positions
        .iter()
        .enumerate()
        .map(|(position_index, position)| {
            let mut results = tally.for_position(position_index);
            results.sort_by(|a, b| b.vote_count.cmp(&a.vote_count).then_with(|| a.nominee_name.cmp(&b.nominee_name)));

            PositionResults {
                position_index,
                title: position.title.clone(),
                total_votes: tally.total_votes(position_index),
                outcome: resolve_position(&results),
                results,
            }
        })
        .collect();

    let summary = build_summary(election, &positions, &participation);

    ElectionResults {
        election_id: election.id.clone(),
        title: election.title.clone(),
        positions,
        participation,
        dangling: tally.dangling,
        summary,
    }
}

fn build_summary(election: &Election, positions: &[PositionResults], participation: &ParticipationStats) -> String {
    let mut summary = String::new();

    summary.push_str(&format!("**{}** ({})\n\n", election.title, election.status));

    for position in positions {
        summary.push_str(&format!("**{}**\n", position.title));

        if position.results.is_empty() {
            summary.push_str("No nominees.\n\n");
            continue;
        }

        let winner_id = match &position.outcome {
            PositionOutcome::Winner { winner } => Some(winner.nominee_id.as_str()),
            _ => None,
        };

        for result in &position.results {
            // Format the line differently for the winner
            let line = if winner_id == Some(result.nominee_id.as_str()) {
                format!("**{}**: {} ({}%)", result.nominee_name, votes(result.vote_count), result.percentage)
            } else {
                format!("{}: {} ({}%)", result.nominee_name, votes(result.vote_count), result.percentage)
            };
            summary.push_str(&line);
            summary.push('\n');
        }

        match &position.outcome {
            PositionOutcome::Winner { winner } => {
                summary.push_str(&format!("Winner: {}\n", winner.nominee_name));
            }
            PositionOutcome::Tie { nominees } => {
                let names: Vec<&str> = nominees.iter().map(|n| n.nominee_name.as_str()).collect();
                summary.push_str(&format!("Tie between {}\n", names.join(", ")));
            }
            PositionOutcome::NoVotes => summary.push_str("No votes cast.\n"),
        }
        summary.push('\n');
    }

    summary.push_str(&format!(
        "{} of {} members voted ({}%).",
        participation.total_voted, participation.total_eligible, participation.participation_percentage
    ));

    summary
}

fn votes(count: u32) -> String {
    if count == 1 {
        "1 vote".to_string()
    } else {
        format!("{count} votes")
    }
}
