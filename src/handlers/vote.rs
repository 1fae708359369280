use crate::db::Database;
use crate::error::ElectionError;
use crate::handlers::{require_member, require_position, require_status};
use crate::models::{Ballot, ElectionStatus, NomineeRef};
use log::info;
use std::collections::BTreeMap;

/// Record a voter's ballot. `selections` maps position index to the chosen
/// nominee's member id, or `None` to skip; positions left out are skipped.
pub async fn cast_ballot(
    database: &Database,
    election_id: &str,
    voter_id: &str,
    selections: BTreeMap<usize, Option<String>>,
) -> Result<Ballot, ElectionError> {
    let election = database.get_election(election_id).await?;
    require_status(&election, &[ElectionStatus::Active], "active")?;
    require_member(database, &election, voter_id).await?;

    if database.has_voted(election_id, voter_id).await? {
        return Err(ElectionError::AlreadyVoted {
            election_id: election_id.to_string(),
            voter_id: voter_id.to_string(),
        });
    }

    let nominations = database.get_nominations(election_id).await?;

    let mut votes: BTreeMap<usize, Option<NomineeRef>> =
        (0..election.positions.len()).map(|index| (index, None)).collect();

    for (position_index, selection) in selections {
        require_position(&election, position_index)?;

        let Some(nominee_id) = selection else {
            continue;
        };

        let nominee = nominations
            .iter()
            .find(|nomination| nomination.position_index == position_index && nomination.nominee.id == nominee_id)
            .map(|nomination| nomination.nominee.clone())
            .ok_or(ElectionError::NotNominated {
                nominee_id,
                position_index,
            })?;

        votes.insert(position_index, Some(nominee));
    }

    let ballot = Ballot::new(election_id.to_string(), voter_id.to_string(), votes);
    database.save_ballot(&ballot).await?;
    info!("Member {} voted in election {}", voter_id, election_id);

    Ok(ballot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::{memory_db, seeded};
    use crate::handlers::nominate;

    fn pick(position_index: usize, nominee_id: &str) -> BTreeMap<usize, Option<String>> {
        let mut selections = BTreeMap::new();
        selections.insert(position_index, Some(nominee_id.to_string()));
        selections
    }

    #[tokio::test]
    async fn unselected_positions_are_stored_as_skipped() {
        let db = memory_db().await;
        let (election, members) = seeded(&db, &["Alice", "Bob"]).await;
        nominate(&db, &election.id, 0, &members[0].id, &members[1].id).await.unwrap();

        let ballot = cast_ballot(&db, &election.id, &members[1].id, pick(0, &members[0].id)).await.unwrap();

        assert_eq!(ballot.votes.len(), 2);
        assert_eq!(ballot.votes[&0].as_ref().map(|n| n.name.as_str()), Some("Alice"));
        assert_eq!(ballot.votes[&1], None);
    }

    #[tokio::test]
    async fn rejects_votes_for_members_not_nominated() {
        let db = memory_db().await;
        let (election, members) = seeded(&db, &["Alice", "Bob"]).await;
        nominate(&db, &election.id, 1, &members[0].id, &members[1].id).await.unwrap();

        // Alice runs for Treasurer only.
        let err = cast_ballot(&db, &election.id, &members[1].id, pick(0, &members[0].id))
            .await
            .unwrap_err();
        assert!(matches!(err, ElectionError::NotNominated { position_index: 0, .. }));
        assert!(!db.has_voted(&election.id, &members[1].id).await.unwrap());
    }

    #[tokio::test]
    async fn rejects_positions_outside_the_election() {
        let db = memory_db().await;
        let (election, members) = seeded(&db, &["Alice"]).await;

        let mut selections = BTreeMap::new();
        selections.insert(5, None);
        let err = cast_ballot(&db, &election.id, &members[0].id, selections).await.unwrap_err();
        assert!(matches!(err, ElectionError::UnknownPosition { position_index: 5, .. }));
    }

    #[tokio::test]
    async fn rejects_second_ballot() {
        let db = memory_db().await;
        let (election, members) = seeded(&db, &["Alice"]).await;

        cast_ballot(&db, &election.id, &members[0].id, BTreeMap::new()).await.unwrap();
        let err = cast_ballot(&db, &election.id, &members[0].id, BTreeMap::new()).await.unwrap_err();
        assert!(matches!(err, ElectionError::AlreadyVoted { .. }));
    }

    #[tokio::test]
    async fn rejects_voters_from_other_organizations() {
        let db = memory_db().await;
        let (election, _) = seeded(&db, &["Alice"]).await;
        let (_, outsiders) = seeded(&db, &["Mallory"]).await;

        let err = cast_ballot(&db, &election.id, &outsiders[0].id, BTreeMap::new()).await.unwrap_err();
        assert!(matches!(err, ElectionError::NotAMember { .. }));
    }

    #[tokio::test]
    async fn rejects_ballots_once_closed() {
        let db = memory_db().await;
        let (election, members) = seeded(&db, &["Alice"]).await;
        db.update_election_status(&election.id, ElectionStatus::Completed).await.unwrap();

        let err = cast_ballot(&db, &election.id, &members[0].id, BTreeMap::new()).await.unwrap_err();
        assert!(matches!(err, ElectionError::WrongStatus { status: ElectionStatus::Completed, .. }));
    }
}
