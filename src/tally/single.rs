use crate::models::{PollConfig, Vote};
use crate::tally::Accumulator;
use log::debug;

/// One ballot, one team: the target gets the ballot's weight.
pub fn fold(acc: &mut Accumulator<'_>, config: &PollConfig, vote: &Vote) {
    let Some(team_id) = vote.team_id_target.as_deref() else {
        debug!("Vote {} has no target team, skipping", vote.id);
        return;
    };

    // Unknown targets drop the ballot's points, not the tally
    match acc.team_mut(team_id) {
        Some(team) => team.credit(vote.vote_type, config.weight_for(vote.vote_type)),
        None => debug!("Vote {} targets unknown team {}, skipping", vote.id, team_id),
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{PollConfig, Team, Vote, VoteType, VotingMode};
    use crate::tally::compute_results;

    #[test]
    fn n_ballots_for_one_team_add_up() {
        let teams = vec![Team::new("a", "A"), Team::new("b", "B")];
        let mut config = PollConfig::new(VotingMode::Single);
        config.voter_weight = 1.5;
        let votes: Vec<Vote> = (0..4).map(|_| Vote::single("p", VoteType::Voter, "b")).collect();

        let results = compute_results(&config, &teams, &votes);
        let b = results.iter().find(|r| r.team_id == "b").unwrap();
        assert_eq!(b.voter_points, 6.0);
        assert_eq!(b.voter_votes, 4);
        assert_eq!(b.judge_votes, 0);
    }

    #[test]
    fn unknown_or_missing_target_changes_nothing() {
        let teams = vec![Team::new("a", "A")];
        let config = PollConfig::new(VotingMode::Single);
        let mut untargeted = Vote::single("p", VoteType::Voter, "a");
        untargeted.team_id_target = None;
        let votes = vec![Vote::single("p", VoteType::Judge, "ghost"), untargeted];

        let results = compute_results(&config, &teams, &votes);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].total_score, 0.0);
        assert_eq!(results[0].voter_votes + results[0].judge_votes, 0);
    }

    #[test]
    fn other_mode_fields_are_ignored() {
        let teams = vec![Team::new("a", "A"), Team::new("b", "B")];
        let config = PollConfig::new(VotingMode::Single);
        let mut vote = Vote::single("p", VoteType::Voter, "a");
        vote.teams = vec!["b".to_string()];

        let results = compute_results(&config, &teams, &[vote]);
        assert_eq!(results[0].team_id, "a");
        assert_eq!(results[1].total_score, 0.0);
    }
}
