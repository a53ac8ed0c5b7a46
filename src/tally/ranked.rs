use crate::models::{PollConfig, Vote};
use crate::tally::Accumulator;
use log::debug;

/// Points for a rank position.
///
/// An explicit `rank_points_config` entry always wins; otherwise the default
/// descending scale `max(n - rank + 1, 0)` for `n` teams applies.
pub fn rank_points(config: &PollConfig, rank: u32, team_count: usize) -> u32 {
    if let Some(points) = config.rank_points_config.get(&rank) {
        return *points;
    }
    // Ranks past the team count score nothing
    let fallback = team_count as i64 - rank as i64 + 1;
    fallback.max(0) as u32
}

pub fn fold(acc: &mut Accumulator<'_>, config: &PollConfig, vote: &Vote) {
    let weight = config.weight_for(vote.vote_type);
    // Distinct teams, not ballot length
    let team_count = acc.team_count();

    for ranking in &vote.rankings {
        let points = rank_points(config, ranking.rank, team_count);
        let Some(team) = acc.team_mut(&ranking.team_id) else {
            debug!("Vote {} ranks unknown team {}, skipping", vote.id, ranking.team_id);
            continue;
        };

        team.credit(vote.vote_type, points as f64 * weight);
        // Histogram of positions received
        if let Some(counts) = team.position_counts.as_mut() {
            *counts.entry(ranking.rank).or_insert(0) += 1;
        }
    }
}
