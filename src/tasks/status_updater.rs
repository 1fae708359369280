use crate::config::Config;
use crate::db::Database;
use crate::error::ElectionError;
use crate::handlers::{advance_election_statuses, load_results};
use crate::models::ElectionStatus;
use chrono::{DateTime, Utc};
use log::{error, info};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::time::interval;

pub async fn check_election_status_task(database: Arc<Database>, config: Config) {
    info!(
        "Starting background task to update election status every {}s...",
        config.status_check_interval_seconds
    );
    let mut interval = interval(StdDuration::from_secs(config.status_check_interval_seconds));

    loop {
        interval.tick().await;

        if let Err(e) = run_status_check(&database, Utc::now(), config.strict_tally_integrity).await {
            error!("Failed to update election status: {}", e);
        }
    }
}

/// One pass of the status task. Logs final results for every election that
/// closed during this pass and returns how many elections changed status.
pub async fn run_status_check(
    database: &Database,
    now: DateTime<Utc>,
    strict_integrity: bool,
) -> Result<usize, ElectionError> {
    let changed = advance_election_statuses(database, now).await?;

    for election in changed.iter().filter(|e| e.status == ElectionStatus::Completed) {
        match load_results(database, &election.id, strict_integrity).await {
            Ok(results) => info!("Final results for election {}:\n{}", election.id, results.summary),
            Err(e) => error!("Could not compute final results for election {}: {}", election.id, e),
        }
    }

    Ok(changed.len())
}
