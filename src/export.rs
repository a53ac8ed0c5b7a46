//! Self-contained JSON snapshot of a poll, for recomputing results offline.

use crate::anchor::Explorer;
use crate::db::Database;
use crate::error::FairError;
use crate::models::{PollConfig, Team, Vote};
use crate::results::PollResults;
use crate::source::PollSource;
use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollExport {
    pub poll_id: String,
    pub config: PollConfig,
    pub teams: Vec<Team>,
    pub votes: Vec<Vote>,
}

impl PollExport {
    pub async fn from_db(db: &Database, poll_id: &str) -> Result<Self, FairError> {
        Ok(Self {
            poll_id: poll_id.to_string(),
            config: db.get_poll_config(poll_id).await?,
            teams: db.get_poll_teams(poll_id).await?,
            votes: db.get_poll_votes(poll_id).await?,
        })
    }

    pub fn read_from(path: &Path) -> Result<Self, FairError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), FairError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!(
            "Exported poll {} ({} teams, {} votes) to {}",
            self.poll_id,
            self.teams.len(),
            self.votes.len(),
            path.display()
        );
        Ok(())
    }

    /// Recomputes the outcome from the snapshot alone.
    pub fn verify(&self, explorer: &Explorer) -> PollResults {
        PollResults::build(&self.poll_id, &self.config, &self.teams, &self.votes, explorer)
    }

    /// Loads the snapshot into a store: poll, then teams, then ballots.
    pub async fn import_into(&self, db: &Database) -> Result<(), FairError> {
        db.create_poll(&self.poll_id, &self.config).await?;
        for team in &self.teams {
            db.add_team(&self.poll_id, team).await?;
        }
        for vote in &self.votes {
            db.save_vote(vote).await?;
        }
        info!(
            "Imported poll {} with {} teams and {} votes",
            self.poll_id,
            self.teams.len(),
            self.votes.len()
        );
        Ok(())
    }

    fn check_poll(&self, poll_id: &str) -> Result<(), FairError> {
        if poll_id != self.poll_id {
            return Err(FairError::PollNotFound(poll_id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PollSource for PollExport {
    async fn poll_config(&self, poll_id: &str) -> Result<PollConfig, FairError> {
        self.check_poll(poll_id)?;
        Ok(self.config.clone())
    }

    async fn poll_teams(&self, poll_id: &str) -> Result<Vec<Team>, FairError> {
        self.check_poll(poll_id)?;
        Ok(self.teams.clone())
    }

    async fn poll_votes(&self, poll_id: &str) -> Result<Vec<Vote>, FairError> {
        self.check_poll(poll_id)?;
        Ok(self.votes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{VoteType, VotingMode};
    use crate::source::load_results;
    use uuid::Uuid;

    fn sample() -> PollExport {
        let mut config = PollConfig::new(VotingMode::Multiple);
        config.judge_weight = 2.0;
        PollExport {
            poll_id: "demo".to_string(),
            config,
            teams: vec![Team::new("t1", "Alpha"), Team::new("t2", "Bravo")],
            votes: vec![
                Vote::multiple("demo", VoteType::Voter, &["t1", "t2"]).with_voter_token("a"),
                Vote::multiple("demo", VoteType::Judge, &["t2"]).with_judge_email("j@x.org"),
            ],
        }
    }

    #[test]
    fn file_round_trip_keeps_results() {
        let export = sample();
        let path = std::env::temp_dir().join(format!("fair-export-{}.json", Uuid::new_v4()));
        export.write_to(&path).unwrap();
        let loaded = PollExport::read_from(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, export);
        let explorer = Explorer::default();
        assert_eq!(
            loaded.verify(&explorer).team_results(),
            export.verify(&explorer).team_results()
        );
    }

    #[test]
    fn verify_recomputes_from_snapshot() {
        let results = sample().verify(&Explorer::default());
        assert_eq!(results.winners, vec!["t2".to_string()]);
        assert_eq!(results.results[0].result.total_score, 3.0);
        assert_eq!(results.results[1].result.total_score, 1.0);
    }

    #[test]
    fn reads_snapshot_with_null_rank_points() {
        let raw = serde_json::json!({
            "pollId": "demo",
            "config": {"votingMode": "single", "rankPointsConfig": null},
            "teams": [{"teamId": "t1", "name": "Alpha"}],
            "votes": [],
        });
        let export: PollExport = serde_json::from_value(raw).unwrap();
        assert!(export.config.rank_points_config.is_empty());
        assert!(export.verify(&Explorer::default()).winners.is_empty());
    }

    #[tokio::test]
    async fn import_then_export_reproduces_results() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let original = sample();
        original.import_into(&db).await.unwrap();

        let exported = PollExport::from_db(&db, "demo").await.unwrap();
        let explorer = Explorer::default();
        let live = load_results(&db, "demo", &explorer).await.unwrap();

        assert_eq!(exported.votes.len(), 2);
        assert_eq!(live.team_results(), original.verify(&explorer).team_results());
        assert_eq!(exported.verify(&explorer).team_results(), live.team_results());
    }

    #[tokio::test]
    async fn export_source_rejects_other_polls() {
        let export = sample();
        let err = load_results(&export, "other", &Explorer::default()).await;
        assert!(matches!(err, Err(FairError::PollNotFound(_))));
    }
}
