use crate::voting::TallyResult;
use serde::Serialize;

/// How a single position was decided.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PositionOutcome {
    Winner { winner: TallyResult },
    Tie { nominees: Vec<TallyResult> },
    NoVotes,
}

/// Classify one position from its tally rows. Pure; call it again whenever
/// the ballots may have changed.
pub fn resolve_position(results: &[TallyResult]) -> PositionOutcome {
    let max_votes = results.iter().map(|result| result.vote_count).max().unwrap_or(0);
    if max_votes == 0 {
        return PositionOutcome::NoVotes;
    }

    let mut leaders: Vec<TallyResult> = results
        .iter()
        .filter(|result| result.vote_count == max_votes)
        .cloned()
        .collect();

    if leaders.len() == 1 {
        PositionOutcome::Winner {
            winner: leaders.remove(0),
        }
    } else {
        PositionOutcome::Tie { nominees: leaders }
    }
}
