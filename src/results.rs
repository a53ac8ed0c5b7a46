use crate::anchor::Explorer;
use crate::models::{PollConfig, QuorumStatus, Team, TeamResult, Vote, VoteType, VotingMode};
use crate::tally::{compute_quorum, compute_results};
use serde::Serialize;
use std::collections::HashMap;

/// One row of the leaderboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedTeam {
    /// Competition ranking: tied teams share a position ("1, 1, 3").
    pub position: usize,
    pub team_name: String,
    #[serde(flatten)]
    pub result: TeamResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteAnchor {
    pub vote_id: String,
    pub tx_hash: String,
    pub explorer_url: Option<String>,
}

/// Tally output decorated for display: names, counts, winners, chain links.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResults {
    pub poll_id: String,
    pub voting_mode: VotingMode,
    pub results: Vec<RankedTeam>,
    pub quorum: QuorumStatus,
    pub total_votes: usize,
    pub voter_ballots: usize,
    pub judge_ballots: usize,
    /// Team ids sharing the top score. Empty when nobody scored.
    pub winners: Vec<String>,
    pub anchors: Vec<VoteAnchor>,
}

impl PollResults {
    pub fn build(
        poll_id: &str,
        config: &PollConfig,
        teams: &[Team],
        votes: &[Vote],
        explorer: &Explorer,
    ) -> Self {
        // First occurrence of a team id names it, same as the tally
        let mut names: HashMap<&str, &str> = HashMap::with_capacity(teams.len());
        for team in teams {
            names.entry(team.team_id.as_str()).or_insert(team.name.as_str());
        }

        let scored = compute_results(config, teams, votes);
        let mut results = Vec::with_capacity(scored.len());
        let mut position = 0;
        let mut previous: Option<f64> = None;
        for (i, result) in scored.into_iter().enumerate() {
            if previous != Some(result.total_score) {
                position = i + 1;
                previous = Some(result.total_score);
            }
            let team_name = names
                .get(result.team_id.as_str())
                .map(|n| n.to_string())
                .unwrap_or_else(|| "Unknown Team".to_string());
            results.push(RankedTeam {
                position,
                team_name,
                result,
            });
        }

        let winners = match results.first() {
            Some(top) if top.result.total_score > 0.0 => results
                .iter()
                .take_while(|r| r.result.total_score == top.result.total_score)
                .map(|r| r.result.team_id.clone())
                .collect(),
            _ => Vec::new(),
        };

        let anchors = votes
            .iter()
            .filter_map(|vote| {
                let tx_hash = vote.tx_hash.as_ref()?;
                Some(VoteAnchor {
                    vote_id: vote.id.clone(),
                    tx_hash: tx_hash.clone(),
                    explorer_url: explorer.tx_url(tx_hash),
                })
            })
            .collect();

        let voter_ballots = votes.iter().filter(|v| v.vote_type == VoteType::Voter).count();

        Self {
            poll_id: poll_id.to_string(),
            voting_mode: config.voting_mode,
            results,
            quorum: compute_quorum(config, votes),
            total_votes: votes.len(),
            voter_ballots,
            judge_ballots: votes.len() - voter_ballots,
            winners,
            anchors,
        }
    }

    /// Just the tally rows, in ranked order.
    pub fn team_results(&self) -> Vec<TeamResult> {
        self.results.iter().map(|r| r.result.clone()).collect()
    }

    /// Plain-text leaderboard. Winners are bolded.
    pub fn summary(&self) -> String {
        if self.total_votes == 0 {
            return "No votes were cast in this poll.".to_string();
        }

        let mut summary = format!("**Results ({} voting)**\n\n", self.voting_mode);

        for row in &self.results {
            let r = &row.result;
            let is_winner = self.winners.contains(&r.team_id);
            let name = if is_winner {
                format!("**{}**", row.team_name)
            } else {
                row.team_name.clone()
            };
            summary.push_str(&format!(
                "{}. {}: {:.1} points ({:.1} voter + {:.1} judge; {}, {})\n",
                row.position,
                name,
                r.total_score,
                r.voter_points,
                r.judge_points,
                plural(r.voter_votes as usize, "voter vote"),
                plural(r.judge_votes as usize, "judge vote"),
            ));
        }

        if self.winners.len() > 1 {
            summary.push_str(&format!(
                "\nTie at the top between {} teams.\n",
                self.winners.len()
            ));
        }

        let q = &self.quorum;
        summary.push_str(&format!(
            "\nQuorum {}: voters {}/{}, judges {}/{}\n",
            if q.quorum_met { "met" } else { "NOT met" },
            q.actual_voters,
            threshold_label(q.required_voters),
            q.actual_judges,
            threshold_label(q.required_judges),
        ));
        summary.push_str(&format!(
            "{} cast ({}, {}).",
            plural(self.total_votes, "ballot"),
            plural(self.voter_ballots, "voter"),
            plural(self.judge_ballots, "judge"),
        ));

        summary
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

fn threshold_label(required: Option<u32>) -> String {
    required.map_or_else(|| "-".to_string(), |n| n.to_string())
}
