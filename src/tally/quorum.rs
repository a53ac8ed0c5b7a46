use crate::models::{PollConfig, QuorumStatus, Vote, VoteType};

/// Evaluates participation thresholds.
///
/// Counts ballots, not team mentions. A threshold that is not configured is
/// always met.
pub fn compute_quorum(config: &PollConfig, votes: &[Vote]) -> QuorumStatus {
    // One ballot is one participant, whatever it names
    let actual_voters = votes.iter().filter(|v| v.vote_type == VoteType::Voter).count() as u32;
    let actual_judges = votes.iter().filter(|v| v.vote_type == VoteType::Judge).count() as u32;

    // No threshold configured means no requirement
    let voter_quorum_met = config
        .min_voter_participation
        .is_none_or(|min| actual_voters >= min);
    let judge_quorum_met = config
        .min_judge_participation
        .is_none_or(|min| actual_judges >= min);

    QuorumStatus {
        voter_quorum_met,
        judge_quorum_met,
        quorum_met: voter_quorum_met && judge_quorum_met,
        required_voters: config.min_voter_participation,
        required_judges: config.min_judge_participation,
        actual_voters,
        actual_judges,
    }
}
