use crate::anchor::Explorer;
use crate::db::Database;
use crate::error::FairError;
use crate::models::{PollConfig, Team, Vote};
use crate::results::PollResults;
use async_trait::async_trait;

/// Anything that can hand over a poll's inputs: the live store or an export file.
#[async_trait]
pub trait PollSource: Send + Sync {
    async fn poll_config(&self, poll_id: &str) -> Result<PollConfig, FairError>;
    async fn poll_teams(&self, poll_id: &str) -> Result<Vec<Team>, FairError>;
    async fn poll_votes(&self, poll_id: &str) -> Result<Vec<Vote>, FairError>;
}

#[async_trait]
impl PollSource for Database {
    async fn poll_config(&self, poll_id: &str) -> Result<PollConfig, FairError> {
        self.get_poll_config(poll_id).await
    }

    async fn poll_teams(&self, poll_id: &str) -> Result<Vec<Team>, FairError> {
        self.get_poll_teams(poll_id).await
    }

    async fn poll_votes(&self, poll_id: &str) -> Result<Vec<Vote>, FairError> {
        self.get_poll_votes(poll_id).await
    }
}

/// Reads fresh inputs and recomputes. Nothing is cached between calls.
pub async fn load_results(
    source: &dyn PollSource,
    poll_id: &str,
    explorer: &Explorer,
) -> Result<PollResults, FairError> {
    let config = source.poll_config(poll_id).await?;
    let teams = source.poll_teams(poll_id).await?;
    let votes = source.poll_votes(poll_id).await?;

    Ok(PollResults::build(poll_id, &config, &teams, &votes, explorer))
}
