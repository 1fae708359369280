mod nomination;
mod vote;

pub use nomination::{nominate, remove_nomination};
pub use vote::cast_ballot;

use crate::db::Database;
use crate::error::ElectionError;
use crate::models::{Election, ElectionStatus, Member};
use crate::voting::{calculate_results, ElectionResults};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};

/// Load everything an election's results depend on and compute them fresh.
pub async fn load_results(
    database: &Database,
    election_id: &str,
    strict_integrity: bool,
) -> Result<ElectionResults, ElectionError> {
    let election = database.get_election(election_id).await?;
    let nominations = database.get_nominations(election_id).await?;
    let ballots = database.get_ballots(election_id).await?;
    let total_eligible = database.count_members(&election.organization_id).await?;

    debug!(
        "Tallying election {}: {} nomination(s), {} ballot(s), {} eligible",
        election_id,
        nominations.len(),
        ballots.len(),
        total_eligible
    );

    let results = calculate_results(&election, &nominations, &ballots, total_eligible);

    for dangling in &results.dangling {
        warn!(
            "Election {}: vote from {} for {} at position {} names no nominee and was not counted",
            election_id, dangling.voter_id, dangling.nominee_id, dangling.position_index
        );
    }

    if strict_integrity && !results.dangling.is_empty() {
        return Err(ElectionError::DanglingVotes {
            election_id: election_id.to_string(),
            count: results.dangling.len(),
        });
    }

    Ok(results)
}

/// Move every election whose voting window has opened or closed to its new
/// status. Returns the elections that changed, with their new status applied.
pub async fn advance_election_statuses(
    database: &Database,
    now: DateTime<Utc>,
) -> Result<Vec<Election>, ElectionError> {
    let mut changed = Vec::new();

    for mut election in database.get_open_elections().await? {
        let Some(next) = election.next_status(now) else {
            continue;
        };

        database.update_election_status(&election.id, next).await?;
        info!("Election {} ({}) is now {}", election.id, election.title, next);

        election.status = next;
        changed.push(election);
    }

    Ok(changed)
}

fn require_status(election: &Election, allowed: &[ElectionStatus], expected: &'static str) -> Result<(), ElectionError> {
    if allowed.contains(&election.status) {
        Ok(())
    } else {
        Err(ElectionError::WrongStatus {
            election_id: election.id.clone(),
            status: election.status,
            expected,
        })
    }
}

fn require_position(election: &Election, position_index: usize) -> Result<(), ElectionError> {
    if election.position(position_index).is_some() {
        Ok(())
    } else {
        Err(ElectionError::UnknownPosition {
            election_id: election.id.clone(),
            position_index,
        })
    }
}

async fn require_member(database: &Database, election: &Election, member_id: &str) -> Result<Member, ElectionError> {
    let member = database.get_member(member_id).await?;
    if member.organization_id != election.organization_id {
        return Err(ElectionError::NotAMember {
            member_id: member.id,
            organization_id: election.organization_id.clone(),
        });
    }
    Ok(member)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::{memory_db, seeded};
    use crate::models::{Ballot, Nomination};
    use crate::voting::PositionOutcome;
    use chrono::Duration;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn results_reflect_stored_ballots() {
        let db = memory_db().await;
        let (election, members) = seeded(&db, &["Alice", "Bob", "Carol", "Dave"]).await;
        let (alice, bob) = (&members[0], &members[1]);

        nominate(&db, &election.id, 0, &alice.id, &bob.id).await.unwrap();
        nominate(&db, &election.id, 0, &bob.id, &alice.id).await.unwrap();

        for voter in &members[..3] {
            let mut selections = BTreeMap::new();
            selections.insert(0, Some(alice.id.clone()));
            cast_ballot(&db, &election.id, &voter.id, selections).await.unwrap();
        }

        let results = load_results(&db, &election.id, true).await.unwrap();

        assert_eq!(results.participation.total_eligible, 4);
        assert_eq!(results.participation.total_voted, 3);
        assert_eq!(results.participation.participation_percentage, 75.0);
        match &results.positions[0].outcome {
            PositionOutcome::Winner { winner } => assert_eq!(winner.nominee_name, "Alice"),
            other => panic!("expected Alice to win, got {other:?}"),
        }
        assert_eq!(results.positions[1].outcome, PositionOutcome::NoVotes);
    }

    #[tokio::test]
    async fn strict_mode_refuses_dangling_votes() {
        let db = memory_db().await;
        let (election, members) = seeded(&db, &["Alice", "Bob"]).await;

        let nomination = Nomination::new(election.id.clone(), 0, members[0].as_nominee(), members[1].id.clone());
        db.add_nomination(&nomination).await.unwrap();

        // Written directly so it skips the nominee check cast_ballot does.
        let mut votes = BTreeMap::new();
        votes.insert(0, Some(members[1].as_nominee()));
        db.save_ballot(&Ballot::new(election.id.clone(), members[0].id.clone(), votes))
            .await
            .unwrap();

        let lenient = load_results(&db, &election.id, false).await.unwrap();
        assert_eq!(lenient.dangling.len(), 1);
        assert_eq!(lenient.positions[0].total_votes, 0);

        let err = load_results(&db, &election.id, true).await.unwrap_err();
        assert!(matches!(err, ElectionError::DanglingVotes { count: 1, .. }));
    }

    #[tokio::test]
    async fn statuses_advance_with_the_clock() {
        let db = memory_db().await;
        let (election, _) = seeded(&db, &[]).await;

        let unchanged = advance_election_statuses(&db, Utc::now()).await.unwrap();
        assert!(unchanged.is_empty());

        let changed = advance_election_statuses(&db, Utc::now() + Duration::hours(2)).await.unwrap();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].status, ElectionStatus::Completed);
        assert_eq!(db.get_election(&election.id).await.unwrap().status, ElectionStatus::Completed);
    }
}
