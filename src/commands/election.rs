use crate::db::Database;
use crate::error::ElectionError;
use crate::handlers;
use crate::models::{Election, Member, Organization};
use chrono::{DateTime, Utc};
use log::info;
use std::collections::BTreeMap;

pub async fn create_org(database: &Database, name: String) -> Result<(), ElectionError> {
    let organization = Organization::new(name);
    database.create_organization(&organization).await?;
    info!("Created organization {} ({})", organization.name, organization.id);
    println!("{}", organization.id);
    Ok(())
}

pub async fn add_member(database: &Database, organization_id: String, name: String) -> Result<(), ElectionError> {
    let member = Member::new(organization_id, name);
    database.add_member(&member).await?;
    info!("Added {} to organization {}", member.name, member.organization_id);
    println!("{}", member.id);
    Ok(())
}

pub async fn create_election(
    database: &Database,
    organization_id: String,
    title: String,
    description: String,
    positions: Vec<String>,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
) -> Result<(), ElectionError> {
    if ends_at <= starts_at {
        return Err(ElectionError::InvalidWindow {
            starts_at: starts_at.to_rfc3339(),
            ends_at: ends_at.to_rfc3339(),
        });
    }

    let election = Election::new(organization_id, title, description, positions, starts_at, ends_at);
    database.create_election(&election).await?;
    info!(
        "Created election {} with {} position(s), status {}",
        election.id,
        election.positions.len(),
        election.status
    );
    println!("{}", election.id);
    Ok(())
}

pub async fn nominate(
    database: &Database,
    election_id: &str,
    position_index: usize,
    nominee_id: &str,
    nominator_id: &str,
) -> Result<(), ElectionError> {
    let nomination = handlers::nominate(database, election_id, position_index, nominee_id, nominator_id).await?;
    println!("{}", nomination.id);
    Ok(())
}

pub async fn unnominate(database: &Database, nomination_id: &str) -> Result<(), ElectionError> {
    handlers::remove_nomination(database, nomination_id).await
}

pub async fn vote(
    database: &Database,
    election_id: &str,
    voter_id: &str,
    selections: Vec<(usize, Option<String>)>,
) -> Result<(), ElectionError> {
    let selections: BTreeMap<usize, Option<String>> = selections.into_iter().collect();
    handlers::cast_ballot(database, election_id, voter_id, selections).await?;
    println!("Ballot recorded.");
    Ok(())
}

pub async fn results(database: &Database, election_id: &str, json: bool, strict_integrity: bool) -> Result<(), ElectionError> {
    let results = handlers::load_results(database, election_id, strict_integrity).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        println!("{}", results.summary);
    }
    Ok(())
}
