use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::FairError;

/// Points table used for ranked polls created without an explicit one.
pub const DEFAULT_RANK_POINTS: [(u32, u32); 5] = [(1, 10), (2, 7), (3, 5), (4, 3), (5, 1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VotingMode {
    Single,
    Multiple,
    Ranked,
}

impl fmt::Display for VotingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VotingMode::Single => "single",
            VotingMode::Multiple => "multiple",
            VotingMode::Ranked => "ranked",
        };
        f.write_str(s)
    }
}

impl FromStr for VotingMode {
    type Err = FairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(VotingMode::Single),
            "multiple" => Ok(VotingMode::Multiple),
            "ranked" => Ok(VotingMode::Ranked),
            other => Err(FairError::UnknownVotingMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Voter,
    Judge,
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteType::Voter => f.write_str("voter"),
            VoteType::Judge => f.write_str("judge"),
        }
    }
}

impl FromStr for VoteType {
    type Err = FairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "voter" => Ok(VoteType::Voter),
            "judge" => Ok(VoteType::Judge),
            other => Err(FairError::InvalidVote(format!("unknown vote type: {}", other))),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollConfig {
    pub voting_mode: VotingMode,
    #[serde(default = "default_weight")]
    pub voter_weight: f64,
    #[serde(default = "default_weight")]
    pub judge_weight: f64,
    // JSON keys arrive as "1", "2", ... and are parsed into integers.
    // Non-ranked polls may carry an explicit null here.
    #[serde(default, deserialize_with = "null_as_default")]
    pub rank_points_config: BTreeMap<u32, u32>,
    #[serde(default)]
    pub max_ranked_positions: Option<u32>,
    #[serde(default)]
    pub min_voter_participation: Option<u32>,
    #[serde(default)]
    pub min_judge_participation: Option<u32>,
}

impl PollConfig {
    pub fn new(voting_mode: VotingMode) -> Self {
        Self {
            voting_mode,
            voter_weight: 1.0,
            judge_weight: 1.0,
            rank_points_config: BTreeMap::new(),
            max_ranked_positions: None,
            min_voter_participation: None,
            min_judge_participation: None,
        }
    }

    /// Fills in the product default points table when none is configured.
    pub fn with_default_rank_points(mut self) -> Self {
        if self.rank_points_config.is_empty() {
            self.rank_points_config = DEFAULT_RANK_POINTS.into_iter().collect();
        }
        self
    }

    pub fn weight_for(&self, vote_type: VoteType) -> f64 {
        match vote_type {
            VoteType::Voter => self.voter_weight,
            VoteType::Judge => self.judge_weight,
        }
    }

    /// Input validation for the calling layer. The tally itself never calls this.
    pub fn validate(&self) -> Result<(), FairError> {
        for (name, weight) in [("voterWeight", self.voter_weight), ("judgeWeight", self.judge_weight)] {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(FairError::InvalidConfig(format!(
                    "{} must be a positive number, got {}",
                    name, weight
                )));
            }
        }
        if self.max_ranked_positions == Some(0) {
            return Err(FairError::InvalidConfig(
                "maxRankedPositions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub team_id: String,
    pub name: String,
}

impl Team {
    pub fn new(team_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            team_id: team_id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ranking {
    pub team_id: String,
    pub rank: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: String,
    pub poll_id: String,
    pub vote_type: VoteType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voter_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judge_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id_target: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub teams: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rankings: Vec<Ranking>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    fn blank(poll_id: &str, vote_type: VoteType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            poll_id: poll_id.to_string(),
            vote_type,
            voter_token: None,
            judge_email: None,
            team_id_target: None,
            teams: Vec::new(),
            rankings: Vec::new(),
            tx_hash: None,
            created_at: Utc::now(),
        }
    }

    pub fn single(poll_id: &str, vote_type: VoteType, team_id: &str) -> Self {
        Self {
            team_id_target: Some(team_id.to_string()),
            ..Self::blank(poll_id, vote_type)
        }
    }

    pub fn multiple(poll_id: &str, vote_type: VoteType, team_ids: &[&str]) -> Self {
        Self {
            teams: team_ids.iter().map(|t| t.to_string()).collect(),
            ..Self::blank(poll_id, vote_type)
        }
    }

    /// Builds a ranked ballot from team ids in preference order (first = rank 1).
    pub fn ranked(poll_id: &str, vote_type: VoteType, ordered_team_ids: &[&str]) -> Self {
        let rankings = ordered_team_ids
            .iter()
            .enumerate()
            .map(|(i, team_id)| Ranking {
                team_id: team_id.to_string(),
                rank: i as u32 + 1,
                reason: None,
            })
            .collect();
        Self {
            rankings,
            ..Self::blank(poll_id, vote_type)
        }
    }

    pub fn with_voter_token(mut self, token: &str) -> Self {
        self.voter_token = Some(token.to_string());
        self
    }

    pub fn with_judge_email(mut self, email: &str) -> Self {
        self.judge_email = Some(email.to_lowercase());
        self
    }

    pub fn with_tx_hash(mut self, tx_hash: &str) -> Self {
        self.tx_hash = Some(tx_hash.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamResult {
    pub team_id: String,
    pub voter_points: f64,
    pub judge_points: f64,
    pub total_score: f64,
    pub voter_votes: u32,
    pub judge_votes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_counts: Option<BTreeMap<u32, u32>>,
}

impl TeamResult {
    pub fn zeroed(team_id: &str, voting_mode: VotingMode) -> Self {
        Self {
            team_id: team_id.to_string(),
            voter_points: 0.0,
            judge_points: 0.0,
            total_score: 0.0,
            voter_votes: 0,
            judge_votes: 0,
            position_counts: match voting_mode {
                VotingMode::Ranked => Some(BTreeMap::new()),
                _ => None,
            },
        }
    }

    /// Credits `points` to this team for one ballot of the given class.
    pub fn credit(&mut self, vote_type: VoteType, points: f64) {
        match vote_type {
            VoteType::Voter => {
                self.voter_points += points;
                self.voter_votes += 1;
            }
            VoteType::Judge => {
                self.judge_points += points;
                self.judge_votes += 1;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuorumStatus {
    pub voter_quorum_met: bool,
    pub judge_quorum_met: bool,
    pub quorum_met: bool,
    pub required_voters: Option<u32>,
    pub required_judges: Option<u32>,
    pub actual_voters: u32,
    pub actual_judges: u32,
}
