use chrono::{DateTime, Utc};
use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::config::Config;
use crate::error::ElectionError;
use crate::models::{Ballot, Election, ElectionStatus, Member, Nomination, NomineeRef, Organization, Position};

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(config: &Config) -> Result<Self, ElectionError> {
        Self::connect(&config.database_url, config.max_connections).await
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, ElectionError> {
        // Create the database file if it doesn't exist
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Self::init_schema(&pool).await?;
        info!("Connected to database at {}", database_url);

        Ok(Self { pool })
    }

    async fn init_schema(pool: &SqlitePool) -> Result<(), ElectionError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS organizations (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS members (
                id TEXT PRIMARY KEY,
                organization_id TEXT NOT NULL,
                name TEXT NOT NULL,
                FOREIGN KEY (organization_id) REFERENCES organizations(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS elections (
                id TEXT PRIMARY KEY,
                organization_id TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                positions TEXT NOT NULL,
                starts_at TEXT NOT NULL,
                ends_at TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (organization_id) REFERENCES organizations(id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS election_nominations (
                id TEXT PRIMARY KEY,
                election_id TEXT NOT NULL,
                position_index INTEGER NOT NULL,
                nominee_id TEXT NOT NULL,
                nominator_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (election_id) REFERENCES elections(id) ON DELETE CASCADE,
                FOREIGN KEY (nominee_id) REFERENCES members(id),
                FOREIGN KEY (nominator_id) REFERENCES members(id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS election_votes (
                election_id TEXT NOT NULL,
                voter_id TEXT NOT NULL,
                votes TEXT NOT NULL,
                cast_at TEXT NOT NULL,
                PRIMARY KEY (election_id, voter_id),
                FOREIGN KEY (election_id) REFERENCES elections(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn create_organization(&self, organization: &Organization) -> Result<(), ElectionError> {
        sqlx::query("INSERT INTO organizations (id, name) VALUES (?, ?)")
            .bind(&organization.id)
            .bind(&organization.name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn add_member(&self, member: &Member) -> Result<(), ElectionError> {
        sqlx::query("INSERT INTO members (id, organization_id, name) VALUES (?, ?, ?)")
            .bind(&member.id)
            .bind(&member.organization_id)
            .bind(&member.name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_member(&self, member_id: &str) -> Result<Member, ElectionError> {
        let row = sqlx::query("SELECT id, organization_id, name FROM members WHERE id = ?")
            .bind(member_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ElectionError::not_found("Member", member_id))?;

        Ok(Member {
            id: row.try_get("id")?,
            organization_id: row.try_get("organization_id")?,
            name: row.try_get("name")?,
        })
    }

    // Roster size used as the participation denominator
    pub async fn count_members(&self, organization_id: &str) -> Result<u32, ElectionError> {
        let count: i64 = sqlx::query("SELECT COUNT(*) AS count FROM members WHERE organization_id = ?")
            .bind(organization_id)
            .fetch_one(&self.pool)
            .await?
            .try_get("count")?;
        Ok(count as u32)
    }

    pub async fn create_election(&self, election: &Election) -> Result<(), ElectionError> {
        sqlx::query(
            r#"
            INSERT INTO elections (id, organization_id, title, description, positions, starts_at, ends_at, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&election.id)
        .bind(&election.organization_id)
        .bind(&election.title)
        .bind(&election.description)
        .bind(serde_json::to_string(&election.positions)?)
        .bind(election.starts_at.to_rfc3339())
        .bind(election.ends_at.to_rfc3339())
        .bind(election.status.as_str())
        .bind(election.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_election(&self, election_id: &str) -> Result<Election, ElectionError> {
        let row = sqlx::query(
            r#"
            SELECT id, organization_id, title, description, positions, starts_at, ends_at, status, created_at
            FROM elections
            WHERE id = ?
            "#,
        )
        .bind(election_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ElectionError::not_found("Election", election_id))?;

        election_from_row(&row)
    }

    // Elections that may still need a status change
    pub async fn get_open_elections(&self) -> Result<Vec<Election>, ElectionError> {
        sqlx::query(
            r#"
            SELECT id, organization_id, title, description, positions, starts_at, ends_at, status, created_at
            FROM elections
            WHERE status != 'completed'
            ORDER BY starts_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(election_from_row)
        .collect()
    }

    pub async fn update_election_status(&self, election_id: &str, status: ElectionStatus) -> Result<(), ElectionError> {
        let updated = sqlx::query("UPDATE elections SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(election_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(ElectionError::not_found("Election", election_id));
        }
        Ok(())
    }

    pub async fn add_nomination(&self, nomination: &Nomination) -> Result<(), ElectionError> {
        sqlx::query(
            r#"
            INSERT INTO election_nominations (id, election_id, position_index, nominee_id, nominator_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&nomination.id)
        .bind(&nomination.election_id)
        .bind(nomination.position_index as i64)
        .bind(&nomination.nominee.id)
        .bind(&nomination.nominator_id)
        .bind(nomination.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn remove_nomination(&self, nomination_id: &str) -> Result<(), ElectionError> {
        let removed = sqlx::query("DELETE FROM election_nominations WHERE id = ?")
            .bind(nomination_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if removed == 0 {
            return Err(ElectionError::not_found("Nomination", nomination_id));
        }
        Ok(())
    }

    pub async fn get_nomination(&self, nomination_id: &str) -> Result<Nomination, ElectionError> {
        let row = sqlx::query(
            r#"
            SELECT n.id, n.election_id, n.position_index, n.nominee_id, m.name AS nominee_name,
                   n.nominator_id, n.created_at
            FROM election_nominations n
            JOIN members m ON m.id = n.nominee_id
            WHERE n.id = ?
            "#,
        )
        .bind(nomination_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ElectionError::not_found("Nomination", nomination_id))?;

        nomination_from_row(&row)
    }

    pub async fn get_nominations(&self, election_id: &str) -> Result<Vec<Nomination>, ElectionError> {
        sqlx::query(
            r#"
            SELECT n.id, n.election_id, n.position_index, n.nominee_id, m.name AS nominee_name,
                   n.nominator_id, n.created_at
            FROM election_nominations n
            JOIN members m ON m.id = n.nominee_id
            WHERE n.election_id = ?
            ORDER BY n.position_index, n.created_at
            "#,
        )
        .bind(election_id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(nomination_from_row)
        .collect()
    }

    pub async fn has_voted(&self, election_id: &str, voter_id: &str) -> Result<bool, ElectionError> {
        Ok(sqlx::query("SELECT 1 FROM election_votes WHERE election_id = ? AND voter_id = ?")
            .bind(election_id)
            .bind(voter_id)
            .fetch_optional(&self.pool)
            .await?
            .is_some())
    }

    // One ballot per voter; a second one is rejected rather than replacing the first
    pub async fn save_ballot(&self, ballot: &Ballot) -> Result<(), ElectionError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO election_votes (election_id, voter_id, votes, cast_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(election_id, voter_id) DO NOTHING
            "#,
        )
        .bind(&ballot.election_id)
        .bind(&ballot.voter_id)
        .bind(serde_json::to_string(&ballot.votes)?)
        .bind(ballot.cast_at.to_rfc3339())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if inserted == 0 {
            return Err(ElectionError::AlreadyVoted {
                election_id: ballot.election_id.clone(),
                voter_id: ballot.voter_id.clone(),
            });
        }
        Ok(())
    }

    pub async fn get_ballots(&self, election_id: &str) -> Result<Vec<Ballot>, ElectionError> {
        sqlx::query(
            r#"
            SELECT election_id, voter_id, votes, cast_at
            FROM election_votes
            WHERE election_id = ?
            ORDER BY cast_at
            "#,
        )
        .bind(election_id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| -> Result<Ballot, ElectionError> {
            let votes: BTreeMap<usize, Option<NomineeRef>> =
                serde_json::from_str(&row.try_get::<String, _>("votes")?)?;
            Ok(Ballot {
                election_id: row.try_get("election_id")?,
                voter_id: row.try_get("voter_id")?,
                votes,
                cast_at: parse_timestamp(&row.try_get::<String, _>("cast_at")?, "cast_at")?,
            })
        })
        .collect()
    }
}

fn nomination_from_row(row: &SqliteRow) -> Result<Nomination, ElectionError> {
    Ok(Nomination {
        id: row.try_get("id")?,
        election_id: row.try_get("election_id")?,
        position_index: row.try_get::<i64, _>("position_index")? as usize,
        nominee: NomineeRef {
            id: row.try_get("nominee_id")?,
            name: row.try_get("nominee_name")?,
        },
        nominator_id: row.try_get("nominator_id")?,
        created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?, "created_at")?,
    })
}

fn election_from_row(row: &SqliteRow) -> Result<Election, ElectionError> {
    let positions: Vec<Position> = serde_json::from_str(&row.try_get::<String, _>("positions")?)?;

    Ok(Election {
        id: row.try_get("id")?,
        organization_id: row.try_get("organization_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        positions,
        starts_at: parse_timestamp(&row.try_get::<String, _>("starts_at")?, "starts_at")?,
        ends_at: parse_timestamp(&row.try_get::<String, _>("ends_at")?, "ends_at")?,
        status: row.try_get::<String, _>("status")?.parse()?,
        created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?, "created_at")?,
    })
}

fn parse_timestamp(value: &str, field: &'static str) -> Result<DateTime<Utc>, ElectionError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| ElectionError::Timestamp { field, source })
}
