use std::time::Duration;

use time::OffsetDateTime;
use tokio::time::interval;
use tracing::{error, info};

use crate::state::AppState;

const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub sessions: usize,
    pub tokens: u64,
}

/// Drops expired sessions and account tokens.
pub async fn sweep_expired(state: &AppState, now: OffsetDateTime) -> SweepReport {
    let sessions = state.sessions.purge_expired(now);
    let tokens = match state.tokens.delete_expired(now).await {
        Ok(count) => count,
        Err(e) => {
            error!(error = %e, "worker: failed to delete expired tokens");
            0
        }
    };
    SweepReport { sessions, tokens }
}

pub async fn start_background_workers(state: AppState) {
    tokio::spawn(async move {
        let mut ticker = interval(SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let report = sweep_expired(&state, OffsetDateTime::now_utc()).await;
            if report != SweepReport::default() {
                info!(
                    sessions = report.sessions,
                    tokens = report.tokens,
                    "worker: purged expired entries"
                );
            }
        }
    });
}
