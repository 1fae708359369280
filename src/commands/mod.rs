mod election;

use crate::config::Config;
use crate::db::Database;
use crate::error::ElectionError;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "greekone-elections", about = "Chapter elections: nominations, ballots and results")]
pub struct Opts {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Register a chapter.
    CreateOrg {
        name: String,
    },
    /// Add a member to a chapter roster.
    AddMember {
        organization_id: String,
        name: String,
    },
    /// Schedule an election.
    CreateElection {
        organization_id: String,
        title: String,
        /// Position title; repeat in ballot order.
        #[arg(long = "position", required = true)]
        positions: Vec<String>,
        #[arg(long, default_value = "")]
        description: String,
        /// RFC 3339 timestamp voting opens at.
        #[arg(long)]
        starts_at: DateTime<Utc>,
        /// RFC 3339 timestamp voting closes at.
        #[arg(long)]
        ends_at: DateTime<Utc>,
    },
    /// Nominate a member for a position.
    Nominate {
        election_id: String,
        position: usize,
        nominee_id: String,
        nominator_id: String,
    },
    /// Withdraw a nomination.
    Unnominate {
        nomination_id: String,
    },
    /// Cast a ballot.
    Vote {
        election_id: String,
        voter_id: String,
        /// `<position>=<nominee id>`, or `<position>=` to skip; repeatable.
        #[arg(long = "select", value_parser = parse_selection)]
        selections: Vec<(usize, Option<String>)>,
    },
    /// Compute and print the current results.
    Results {
        election_id: String,
        /// Print JSON instead of the text summary.
        #[arg(long)]
        json: bool,
    },
    /// Keep election status in step with the clock.
    Watch,
}

pub async fn run(command: Command, database: Arc<Database>, config: &Config) -> Result<(), ElectionError> {
    match command {
        Command::CreateOrg { name } => election::create_org(&database, name).await,
        Command::AddMember { organization_id, name } => election::add_member(&database, organization_id, name).await,
        Command::CreateElection {
            organization_id,
            title,
            positions,
            description,
            starts_at,
            ends_at,
        } => {
            election::create_election(&database, organization_id, title, description, positions, starts_at, ends_at)
                .await
        }
        Command::Nominate {
            election_id,
            position,
            nominee_id,
            nominator_id,
        } => election::nominate(&database, &election_id, position, &nominee_id, &nominator_id).await,
        Command::Unnominate { nomination_id } => election::unnominate(&database, &nomination_id).await,
        Command::Vote {
            election_id,
            voter_id,
            selections,
        } => election::vote(&database, &election_id, &voter_id, selections).await,
        Command::Results { election_id, json } => {
            election::results(&database, &election_id, json, config.strict_tally_integrity).await
        }
        Command::Watch => {
            crate::tasks::status_updater::check_election_status_task(database, config.clone()).await;
            Ok(())
        }
    }
}

fn parse_selection(raw: &str) -> Result<(usize, Option<String>), String> {
    let (position, nominee) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected <position>=<nominee id>, got {raw:?}"))?;

    let position = position
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid position {position:?}: {e}"))?;

    let nominee = nominee.trim();
    Ok((position, (!nominee.is_empty()).then(|| nominee.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_selections() {
        assert_eq!(parse_selection("0=abc").unwrap(), (0, Some("abc".to_string())));
        assert_eq!(parse_selection("2=").unwrap(), (2, None));
        assert!(parse_selection("president=abc").is_err());
        assert!(parse_selection("abc").is_err());
    }

    #[test]
    fn parses_vote_command() {
        let opts = Opts::try_parse_from([
            "greekone-elections",
            "vote",
            "e1",
            "m1",
            "--select",
            "0=m2",
            "--select",
            "1=",
        ])
        .unwrap();

        match opts.command {
            Command::Vote { selections, .. } => {
                assert_eq!(selections, vec![(0, Some("m2".to_string())), (1, None)]);
            }
            _ => panic!("expected vote command"),
        }
    }

    #[test]
    fn parses_election_window() {
        let opts = Opts::try_parse_from([
            "greekone-elections",
            "create-election",
            "org",
            "Spring Elections",
            "--position",
            "President",
            "--position",
            "Treasurer",
            "--starts-at",
            "2026-03-01T18:00:00Z",
            "--ends-at",
            "2026-03-02T18:00:00Z",
        ])
        .unwrap();

        match opts.command {
            Command::CreateElection { positions, starts_at, .. } => {
                assert_eq!(positions, vec!["President", "Treasurer"]);
                assert_eq!(starts_at.to_rfc3339(), "2026-03-01T18:00:00+00:00");
            }
            _ => panic!("expected create-election command"),
        }
    }
}
