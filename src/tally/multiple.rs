use crate::models::{PollConfig, Vote};
use crate::tally::Accumulator;
use log::debug;
use std::collections::HashSet;

/// Approval-style ballot: every listed team gets the full weight, no splitting.
pub fn fold(acc: &mut Accumulator<'_>, config: &PollConfig, vote: &Vote) {
    let weight = config.weight_for(vote.vote_type);
    let mut seen: HashSet<&str> = HashSet::with_capacity(vote.teams.len());

    for team_id in &vote.teams {
        // A team listed twice on one ballot is credited once
        if !seen.insert(team_id.as_str()) {
            continue;
        }
        match acc.team_mut(team_id) {
            Some(team) => team.credit(vote.vote_type, weight),
            None => debug!("Vote {} lists unknown team {}, skipping", vote.id, team_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{PollConfig, Team, Vote, VoteType, VotingMode};
    use crate::tally::compute_results;

    fn teams() -> Vec<Team> {
        vec![Team::new("a", "A"), Team::new("b", "B"), Team::new("c", "C")]
    }

    #[test]
    fn each_listed_team_gets_full_weight() {
        let mut config = PollConfig::new(VotingMode::Multiple);
        config.judge_weight = 3.0;
        let votes = vec![Vote::multiple("p", VoteType::Judge, &["a", "b"])];

        let results = compute_results(&config, &teams(), &votes);
        let score = |id: &str| results.iter().find(|r| r.team_id == id).unwrap().clone();
        assert_eq!(score("a").judge_points, 3.0);
        assert_eq!(score("b").judge_points, 3.0);
        assert_eq!(score("a").judge_votes, 1);
        assert_eq!(score("c").total_score, 0.0);
    }

    #[test]
    fn repeated_team_in_one_ballot_counts_once() {
        let config = PollConfig::new(VotingMode::Multiple);
        let votes = vec![Vote::multiple("p", VoteType::Voter, &["c", "c", "a"])];

        let results = compute_results(&config, &teams(), &votes);
        let c = results.iter().find(|r| r.team_id == "c").unwrap();
        assert_eq!(c.voter_points, 1.0);
        assert_eq!(c.voter_votes, 1);
    }

    #[test]
    fn unknown_teams_are_skipped_but_known_ones_count() {
        let config = PollConfig::new(VotingMode::Multiple);
        let votes = vec![Vote::multiple("p", VoteType::Voter, &["zzz", "b"])];

        let results = compute_results(&config, &teams(), &votes);
        assert_eq!(results[0].team_id, "b");
        assert_eq!(results[0].total_score, 1.0);
        assert_eq!(results.iter().map(|r| r.voter_votes).sum::<u32>(), 1);
    }
}
