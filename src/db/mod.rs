use crate::error::FairError;
use crate::models::{PollConfig, Ranking, Team, Vote, VoteType, VotingMode};
use chrono::{DateTime, Utc};
use log::{debug, info};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, migrate::MigrateDatabase};
use std::collections::BTreeMap;

/// Summary row for `list_polls`.
#[derive(Debug, Clone, PartialEq)]
pub struct PollSummary {
    pub id: String,
    pub voting_mode: VotingMode,
    pub team_count: i64,
    pub vote_count: i64,
}

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(db_url: &str) -> Result<Self, FairError> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            info!("Creating database at {}", db_url);
            Sqlite::create_database(db_url).await?;
        }

        // Every connection to an in-memory database is a separate database
        let max_connections = if db_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(db_url)
            .await?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    async fn init_schema(pool: &SqlitePool) -> Result<(), FairError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS polls (
                id TEXT PRIMARY KEY,
                voting_mode TEXT NOT NULL,
                voter_weight REAL NOT NULL DEFAULT 1.0,
                judge_weight REAL NOT NULL DEFAULT 1.0,
                rank_points_config TEXT NOT NULL DEFAULT '{}',
                max_ranked_positions INTEGER,
                min_voter_participation INTEGER,
                min_judge_participation INTEGER,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS teams (
                id TEXT NOT NULL,
                poll_id TEXT NOT NULL,
                name TEXT NOT NULL,
                position INTEGER NOT NULL,
                PRIMARY KEY (poll_id, id),
                FOREIGN KEY (poll_id) REFERENCES polls(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS votes (
                id TEXT PRIMARY KEY,
                poll_id TEXT NOT NULL,
                vote_type TEXT NOT NULL,
                voter_token TEXT,
                judge_email TEXT,
                team_id_target TEXT,
                teams TEXT NOT NULL DEFAULT '[]',
                rankings TEXT NOT NULL DEFAULT '[]',
                tx_hash TEXT,
                created_at TEXT NOT NULL,
                UNIQUE (poll_id, voter_token),
                UNIQUE (poll_id, judge_email),
                FOREIGN KEY (poll_id) REFERENCES polls(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Stores a poll. Ranked polls without a points table get the default one.
    pub async fn create_poll(&self, poll_id: &str, config: &PollConfig) -> Result<(), FairError> {
        config.validate()?;
        // The points table is fixed at creation
        let config = match config.voting_mode {
            VotingMode::Ranked => config.clone().with_default_rank_points(),
            _ => config.clone(),
        };

        sqlx::query(
            r#"
            INSERT INTO polls (id, voting_mode, voter_weight, judge_weight, rank_points_config,
                               max_ranked_positions, min_voter_participation, min_judge_participation, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(poll_id)
        .bind(config.voting_mode.to_string())
        .bind(config.voter_weight)
        .bind(config.judge_weight)
        .bind(serde_json::to_string(&config.rank_points_config)?)
        .bind(config.max_ranked_positions.map(i64::from))
        .bind(config.min_voter_participation.map(i64::from))
        .bind(config.min_judge_participation.map(i64::from))
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        info!("Created {} poll {}", config.voting_mode, poll_id);
        Ok(())
    }

    /// Adds a team to a poll. Teams keep the order they were added in.
    pub async fn add_team(&self, poll_id: &str, team: &Team) -> Result<(), FairError> {
        self.ensure_poll(poll_id).await?;

        sqlx::query(
            r#"
            -- position is the insertion index within the poll
            INSERT INTO teams (id, poll_id, name, position)
            VALUES (?, ?, ?, (SELECT COUNT(*) FROM teams WHERE poll_id = ?))
            "#,
        )
        .bind(&team.team_id)
        .bind(poll_id)
        .bind(&team.name)
        .bind(poll_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_poll_config(&self, poll_id: &str) -> Result<PollConfig, FairError> {
        let row = sqlx::query(
            r#"
            SELECT voting_mode, voter_weight, judge_weight, rank_points_config,
                   max_ranked_positions, min_voter_participation, min_judge_participation
            FROM polls
            WHERE id = ?
            "#,
        )
        .bind(poll_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| FairError::PollNotFound(poll_id.to_string()))?;

        let voting_mode: VotingMode = row.try_get::<String, _>("voting_mode")?.parse()?;
        // Stored as a JSON object keyed by rank
        let rank_points_config: BTreeMap<u32, u32> =
            serde_json::from_str(&row.try_get::<String, _>("rank_points_config")?)?;

        Ok(PollConfig {
            voting_mode,
            voter_weight: row.try_get("voter_weight")?,
            judge_weight: row.try_get("judge_weight")?,
            rank_points_config,
            max_ranked_positions: optional_u32(&row, "max_ranked_positions")?,
            min_voter_participation: optional_u32(&row, "min_voter_participation")?,
            min_judge_participation: optional_u32(&row, "min_judge_participation")?,
        })
    }

    pub async fn get_poll_teams(&self, poll_id: &str) -> Result<Vec<Team>, FairError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name
            FROM teams
            WHERE poll_id = ?
            ORDER BY position
            "#,
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<Team, FairError> {
                Ok(Team {
                    team_id: row.try_get("id")?,
                    name: row.try_get("name")?,
                })
            })
            .collect()
    }

    /// All ballots for a poll, in the order they were cast.
    pub async fn get_poll_votes(&self, poll_id: &str) -> Result<Vec<Vote>, FairError> {
        let rows = sqlx::query(
            r#"
            SELECT id, poll_id, vote_type, voter_token, judge_email, team_id_target,
                   teams, rankings, tx_hash, created_at
            FROM votes
            WHERE poll_id = ?
            ORDER BY rowid
            "#,
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await?;

        // rowid follows insertion, which is cast order
        rows.iter().map(vote_from_row).collect()
    }

    /// Records a ballot, enforcing one ballot per voter token and per judge email.
    pub async fn save_vote(&self, vote: &Vote) -> Result<(), FairError> {
        let config = self.get_poll_config(&vote.poll_id).await?;
        check_ballot(&config, vote)?;

        // Judge emails are compared case-insensitively, however the vote was built
        let judge_email = vote.judge_email.as_deref().map(normalize_email);

        // Reject a second ballot from the same token or judge
        let duplicate = match vote.vote_type {
            VoteType::Voter => {
                sqlx::query("SELECT 1 FROM votes WHERE poll_id = ? AND voter_token = ?")
                    .bind(&vote.poll_id)
                    .bind(&vote.voter_token)
                    .fetch_optional(&self.pool)
                    .await?
            }
            VoteType::Judge => {
                sqlx::query("SELECT 1 FROM votes WHERE poll_id = ? AND judge_email = ?")
                    .bind(&vote.poll_id)
                    .bind(&judge_email)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };
        if duplicate.is_some() {
            let who = match vote.vote_type {
                VoteType::Voter => "this voter token".to_string(),
                VoteType::Judge => judge_email.clone().unwrap_or_default(),
            };
            return Err(FairError::DuplicateBallot(who));
        }

        sqlx::query(
            r#"
            INSERT INTO votes (id, poll_id, vote_type, voter_token, judge_email, team_id_target,
                               teams, rankings, tx_hash, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&vote.id)
        .bind(&vote.poll_id)
        .bind(vote.vote_type.to_string())
        .bind(&vote.voter_token)
        .bind(&judge_email)
        .bind(&vote.team_id_target)
        .bind(serde_json::to_string(&vote.teams)?)
        .bind(serde_json::to_string(&vote.rankings)?)
        .bind(&vote.tx_hash)
        .bind(vote.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!("Saved {} vote {} for poll {}", vote.vote_type, vote.id, vote.poll_id);
        Ok(())
    }

    /// Attaches an anchoring reference. Returns false if the vote is unknown
    /// or already carries one; references are never overwritten.
    pub async fn attach_tx_hash(&self, vote_id: &str, tx_hash: &str) -> Result<bool, FairError> {
        let result = sqlx::query(
            r#"
            UPDATE votes
            SET tx_hash = ?
            WHERE id = ? AND tx_hash IS NULL
            "#,
        )
        .bind(tx_hash)
        .bind(vote_id)
        .execute(&self.pool)
        .await?;

        // Zero rows means the vote is missing or already anchored
        Ok(result.rows_affected() == 1)
    }

    pub async fn list_polls(&self) -> Result<Vec<PollSummary>, FairError> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.voting_mode,
                   (SELECT COUNT(*) FROM teams t WHERE t.poll_id = p.id) AS team_count,
                   (SELECT COUNT(*) FROM votes v WHERE v.poll_id = p.id) AS vote_count
            FROM polls p
            ORDER BY p.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<PollSummary, FairError> {
                Ok(PollSummary {
                    id: row.try_get("id")?,
                    voting_mode: row.try_get::<String, _>("voting_mode")?.parse()?,
                    team_count: row.try_get("team_count")?,
                    vote_count: row.try_get("vote_count")?,
                })
            })
            .collect()
    }

    async fn ensure_poll(&self, poll_id: &str) -> Result<(), FairError> {
        let exists = sqlx::query("SELECT 1 FROM polls WHERE id = ?")
            .bind(poll_id)
            .fetch_optional(&self.pool)
            .await?
            .is_some();

        if !exists {
            return Err(FairError::PollNotFound(poll_id.to_string()));
        }
        Ok(())
    }
}

/// Ballot checks done at write time, before anything reaches the tally.
fn check_ballot(config: &PollConfig, vote: &Vote) -> Result<(), FairError> {
    match vote.vote_type {
        VoteType::Voter if vote.voter_token.is_none() => {
            return Err(FairError::InvalidVote("voter ballot without a voter token".to_string()));
        }
        VoteType::Judge if vote.judge_email.is_none() => {
            return Err(FairError::InvalidVote("judge ballot without a judge email".to_string()));
        }
        _ => {}
    }

    // Each mode needs its own ballot field filled in
    match config.voting_mode {
        VotingMode::Single if vote.team_id_target.is_none() => {
            Err(FairError::InvalidVote("single-choice ballot without a team".to_string()))
        }
        VotingMode::Multiple if vote.teams.is_empty() => {
            Err(FairError::InvalidVote("multiple-choice ballot without teams".to_string()))
        }
        VotingMode::Ranked => {
            if vote.rankings.is_empty() {
                return Err(FairError::InvalidVote("ranked ballot without rankings".to_string()));
            }
            if let Some(max) = config.max_ranked_positions {
                if vote.rankings.len() > max as usize {
                    return Err(FairError::InvalidVote(format!(
                        "ranked ballot lists {} teams, at most {} allowed",
                        vote.rankings.len(),
                        max
                    )));
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn optional_u32(row: &SqliteRow, column: &str) -> Result<Option<u32>, FairError> {
    let value: Option<i64> = row.try_get(column)?;
    Ok(value.map(|v| v.clamp(0, u32::MAX as i64) as u32))
}

fn vote_from_row(row: &SqliteRow) -> Result<Vote, FairError> {
    let created_at: String = row.try_get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| FairError::InvalidVote(format!("bad created_at {}: {}", created_at, e)))?
        .with_timezone(&Utc);
    let rankings: Vec<Ranking> = serde_json::from_str(&row.try_get::<String, _>("rankings")?)?;

    Ok(Vote {
        id: row.try_get("id")?,
        poll_id: row.try_get("poll_id")?,
        vote_type: row.try_get::<String, _>("vote_type")?.parse()?,
        voter_token: row.try_get("voter_token")?,
        judge_email: row.try_get("judge_email")?,
        team_id_target: row.try_get("team_id_target")?,
        teams: serde_json::from_str(&row.try_get::<String, _>("teams")?)?,
        rankings,
        tx_hash: row.try_get("tx_hash")?,
        created_at,
    })
}
