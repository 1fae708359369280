use crate::db::Database;
use crate::error::ElectionError;
use crate::handlers::{require_member, require_position, require_status};
use crate::models::{ElectionStatus, Nomination};
use log::info;

pub async fn nominate(
    database: &Database,
    election_id: &str,
    position_index: usize,
    nominee_id: &str,
    nominator_id: &str,
) -> Result<Nomination, ElectionError> {
    let election = database.get_election(election_id).await?;
    require_status(
        &election,
        &[ElectionStatus::Scheduled, ElectionStatus::Active],
        "scheduled or active",
    )?;
    require_position(&election, position_index)?;

    let nominee = require_member(database, &election, nominee_id).await?;
    require_member(database, &election, nominator_id).await?;

    let nomination = Nomination::new(
        election_id.to_string(),
        position_index,
        nominee.as_nominee(),
        nominator_id.to_string(),
    );
    database.add_nomination(&nomination).await?;

    info!(
        "{} nominated for position {} in election {} by {}",
        nominee.name, position_index, election_id, nominator_id
    );

    Ok(nomination)
}

/// Withdraw a nomination. Nominations of a completed election are frozen.
pub async fn remove_nomination(database: &Database, nomination_id: &str) -> Result<(), ElectionError> {
    let nomination = database.get_nomination(nomination_id).await?;
    let election = database.get_election(&nomination.election_id).await?;
    require_status(
        &election,
        &[ElectionStatus::Scheduled, ElectionStatus::Active],
        "scheduled or active",
    )?;

    database.remove_nomination(nomination_id).await?;
    info!("Removed nomination {}", nomination_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::{memory_db, seeded};
    use crate::handlers::{cast_ballot, load_results};
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn same_nominee_may_be_nominated_twice() {
        let db = memory_db().await;
        let (election, members) = seeded(&db, &["Alice", "Bob", "Carol"]).await;

        nominate(&db, &election.id, 0, &members[0].id, &members[1].id).await.unwrap();
        nominate(&db, &election.id, 0, &members[0].id, &members[2].id).await.unwrap();

        assert_eq!(db.get_nominations(&election.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn rejects_unknown_position() {
        let db = memory_db().await;
        let (election, members) = seeded(&db, &["Alice"]).await;

        let err = nominate(&db, &election.id, 2, &members[0].id, &members[0].id).await.unwrap_err();
        assert!(matches!(err, ElectionError::UnknownPosition { position_index: 2, .. }));
    }

    #[tokio::test]
    async fn rejects_nominees_outside_the_organization() {
        let db = memory_db().await;
        let (election, members) = seeded(&db, &["Alice"]).await;
        let (_, outsiders) = seeded(&db, &["Mallory"]).await;

        let err = nominate(&db, &election.id, 0, &outsiders[0].id, &members[0].id).await.unwrap_err();
        assert!(matches!(err, ElectionError::NotAMember { .. }));
    }

    #[tokio::test]
    async fn completed_elections_take_no_nominations() {
        let db = memory_db().await;
        let (election, members) = seeded(&db, &["Alice"]).await;
        db.update_election_status(&election.id, ElectionStatus::Completed).await.unwrap();

        let err = nominate(&db, &election.id, 0, &members[0].id, &members[0].id).await.unwrap_err();
        assert!(matches!(err, ElectionError::WrongStatus { .. }));
    }

    #[tokio::test]
    async fn removing_a_nomination() {
        let db = memory_db().await;
        let (election, members) = seeded(&db, &["Alice"]).await;
        let nomination = nominate(&db, &election.id, 1, &members[0].id, &members[0].id).await.unwrap();

        remove_nomination(&db, &nomination.id).await.unwrap();
        assert!(db.get_nominations(&election.id).await.unwrap().is_empty());
        assert!(matches!(
            remove_nomination(&db, &nomination.id).await,
            Err(ElectionError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn completed_elections_keep_their_nominations() {
        let db = memory_db().await;
        let (election, members) = seeded(&db, &["Alice", "Bob"]).await;
        let nomination = nominate(&db, &election.id, 0, &members[0].id, &members[1].id).await.unwrap();

        let mut selections = BTreeMap::new();
        selections.insert(0, Some(members[0].id.clone()));
        cast_ballot(&db, &election.id, &members[1].id, selections).await.unwrap();
        db.update_election_status(&election.id, ElectionStatus::Completed).await.unwrap();

        let err = remove_nomination(&db, &nomination.id).await.unwrap_err();
        assert!(matches!(err, ElectionError::WrongStatus { status: ElectionStatus::Completed, .. }));

        let results = load_results(&db, &election.id, true).await.unwrap();
        assert_eq!(results.positions[0].total_votes, 1);
        assert!(results.dangling.is_empty());
    }
}
