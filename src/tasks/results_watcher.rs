use crate::anchor::Explorer;
use crate::results::PollResults;
use crate::source::{PollSource, load_results};
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

/// Recomputes a poll's results every `period` and logs the standings.
///
/// Each tick reads the current votes again; store errors are logged and the
/// loop keeps going. Runs until `max_ticks` ticks have completed, or forever
/// when it is `None`.
pub async fn watch_results(
    source: Arc<dyn PollSource>,
    poll_id: String,
    explorer: Explorer,
    period: Duration,
    max_ticks: Option<u64>,
) -> Option<PollResults> {
    info!("Watching results for poll {} every {:?}", poll_id, period);
    let mut interval = interval(period);
    let mut ticks = 0;
    let mut last = None;

    loop {
        interval.tick().await;

        match load_results(source.as_ref(), &poll_id, &explorer).await {
            Ok(results) => {
                log_standings(&results);
                last = Some(results);
            }
            Err(e) => {
                error!("Failed to recompute results for poll {}: {}", poll_id, e);
            }
        }

        ticks += 1;
        if max_ticks.is_some_and(|max| ticks >= max) {
            return last;
        }
    }
}

fn log_standings(results: &PollResults) {
    let leader = results
        .results
        .first()
        .map(|r| format!("{} ({:.1})", r.team_name, r.result.total_score))
        .unwrap_or_else(|| "no teams".to_string());

    info!(
        "Poll {}: {} ballots, leader {}",
        results.poll_id, results.total_votes, leader
    );
    if results.winners.len() > 1 {
        info!("Poll {}: {} teams tied at the top", results.poll_id, results.winners.len());
    }
    if !results.quorum.quorum_met {
        warn!(
            "Poll {}: quorum not met (voters {}, judges {})",
            results.poll_id, results.quorum.actual_voters, results.quorum.actual_judges
        );
    }
}
