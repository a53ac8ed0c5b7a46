//! Poll tally engine.
//!
//! Turns a poll configuration, the teams eligible for the poll and the
//! ballots cast into per-team scores and a quorum verdict. Everything here is
//! a pure fold over its inputs: no I/O, no shared state, no caching, so the
//! same inputs always give the same output and anyone holding an export of
//! the votes can recompute the outcome.

pub mod multiple;
pub mod quorum;
pub mod ranked;
pub mod single;

use crate::models::{PollConfig, Team, TeamResult, Vote, VotingMode};
use std::collections::HashMap;

pub use quorum::compute_quorum;
pub use ranked::rank_points;

/// Per-team accumulators in team enumeration order.
pub struct Accumulator<'a> {
    index: HashMap<&'a str, usize>,
    results: Vec<TeamResult>,
}

impl<'a> Accumulator<'a> {
    pub fn new(teams: &'a [Team], voting_mode: VotingMode) -> Self {
        let mut index = HashMap::with_capacity(teams.len());
        let mut results = Vec::with_capacity(teams.len());

        for team in teams {
            // First occurrence of a team id wins
            if index.contains_key(team.team_id.as_str()) {
                continue;
            }
            index.insert(team.team_id.as_str(), results.len());
            results.push(TeamResult::zeroed(&team.team_id, voting_mode));
        }

        Self { index, results }
    }

    /// Number of distinct teams known to the poll.
    pub fn team_count(&self) -> usize {
        self.results.len()
    }

    pub fn team_mut(&mut self, team_id: &str) -> Option<&mut TeamResult> {
        let i = *self.index.get(team_id)?;
        self.results.get_mut(i)
    }

    fn finish(mut self) -> Vec<TeamResult> {
        // Weights are already applied, so the total is a plain sum
        for result in &mut self.results {
            result.total_score = result.voter_points + result.judge_points;
        }
        // sort_by is stable, so equal scores keep enumeration order
        self.results
            .sort_by(|a, b| b.total_score.total_cmp(&a.total_score));
        self.results
    }
}

/// Computes every team's result for a poll, highest score first.
///
/// Teams with no votes are still present with a zero score. Ballots that
/// reference teams outside `teams` are skipped, never an error.
pub fn compute_results(config: &PollConfig, teams: &[Team], votes: &[Vote]) -> Vec<TeamResult> {
    // Every team starts at zero, voted for or not
    let mut acc = Accumulator::new(teams, config.voting_mode);

    // The poll's mode decides how each ballot is read
    for vote in votes {
        match config.voting_mode {
            VotingMode::Single => single::fold(&mut acc, config, vote),
            VotingMode::Multiple => multiple::fold(&mut acc, config, vote),
            VotingMode::Ranked => ranked::fold(&mut acc, config, vote),
        }
    }

    acc.finish()
}
