use fair_tally::anchor::Explorer;
use fair_tally::export::PollExport;
use fair_tally::models::{PollConfig, Team, Vote, VoteType, VotingMode};
use fair_tally::tiebreak::tied_at_cutoff;
use fair_tally::{compute_quorum, compute_results};

fn hackathon_teams(n: usize) -> Vec<Team> {
    (1..=n)
        .map(|i| Team::new(format!("team-{}", i), format!("Team {}", i)))
        .collect()
}

#[test]
fn single_mode_event_end_to_end() {
    let teams = hackathon_teams(4);
    let mut config = PollConfig::new(VotingMode::Single);
    config.judge_weight = 2.0;
    config.min_voter_participation = Some(3);
    config.min_judge_participation = Some(1);

    let votes = vec![
        Vote::single("p", VoteType::Voter, "team-2"),
        Vote::single("p", VoteType::Voter, "team-2"),
        Vote::single("p", VoteType::Voter, "team-3"),
        Vote::single("p", VoteType::Judge, "team-3"),
        Vote::single("p", VoteType::Voter, "team-99"),
    ];

    let results = compute_results(&config, &teams, &votes);
    let order: Vec<(&str, f64)> = results
        .iter()
        .map(|r| (r.team_id.as_str(), r.total_score))
        .collect();
    assert_eq!(
        order,
        vec![("team-3", 3.0), ("team-2", 2.0), ("team-1", 0.0), ("team-4", 0.0)]
    );

    // the dangling ballot still counts as a cast ballot
    let quorum = compute_quorum(&config, &votes);
    assert_eq!(quorum.actual_voters, 4);
    assert!(quorum.quorum_met);
}

#[test]
fn ranked_default_scale_and_override() {
    let teams = hackathon_teams(5);
    let mut config = PollConfig::new(VotingMode::Ranked);
    let ballot = vec![Vote::ranked(
        "p",
        VoteType::Voter,
        &["team-5", "team-4", "team-3"],
    )];

    let score_of = |config: &PollConfig, id: &str| {
        compute_results(config, &teams, &ballot)
            .into_iter()
            .find(|r| r.team_id == id)
            .map(|r| r.total_score)
            .unwrap()
    };

    assert_eq!(score_of(&config, "team-3"), 3.0);
    config.rank_points_config.insert(3, 7);
    assert_eq!(score_of(&config, "team-3"), 7.0);
    assert_eq!(score_of(&config, "team-5"), 5.0);
}

#[test]
fn quorum_defaults_to_met_without_thresholds() {
    let config = PollConfig::new(VotingMode::Multiple);
    let status = compute_quorum(&config, &[]);
    assert!(status.quorum_met);

    let mut strict = PollConfig::new(VotingMode::Multiple);
    strict.min_voter_participation = Some(3);
    let votes = vec![
        Vote::multiple("p", VoteType::Voter, &["team-1"]),
        Vote::multiple("p", VoteType::Voter, &["team-1", "team-2"]),
    ];
    let status = compute_quorum(&strict, &votes);
    assert!(!status.voter_quorum_met);
    assert!(!status.quorum_met);
}

#[test]
fn exported_json_recomputes_identically() {
    let json = r#"{
        "pollId": "finals",
        "config": {
            "votingMode": "ranked",
            "voterWeight": 1,
            "judgeWeight": 3,
            "rankPointsConfig": {"1": 10, "2": 7, "3": 5, "4": 3, "5": 1},
            "minJudgeParticipation": 2
        },
        "teams": [
            {"teamId": "a", "name": "Aurora"},
            {"teamId": "b", "name": "Borealis"},
            {"teamId": "c", "name": "Cirrus"}
        ],
        "votes": [
            {"id": "v1", "pollId": "finals", "voteType": "voter", "voterToken": "t1",
             "rankings": [{"teamId": "b", "rank": 1}, {"teamId": "a", "rank": 2}],
             "createdAt": "2026-03-01T10:00:00Z"},
            {"id": "v2", "pollId": "finals", "voteType": "judge", "judgeEmail": "j1@fair.dev",
             "rankings": [{"teamId": "a", "rank": 1, "reason": "best demo"}, {"teamId": "c", "rank": 2}],
             "txHash": "0x8f2a0c6d5e4b3a29181716151413121110090807060504030201000f0e0d0c0b",
             "createdAt": "2026-03-01T10:05:00Z"}
        ]
    }"#;

    let export: PollExport = serde_json::from_str(json).unwrap();
    let explorer = Explorer::default();
    let first = serde_json::to_string(&export.verify(&explorer)).unwrap();
    let second = serde_json::to_string(&export.verify(&explorer)).unwrap();
    assert_eq!(first, second);

    let results = export.verify(&explorer);
    let rows: Vec<(&str, f64)> = results
        .results
        .iter()
        .map(|r| (r.team_name.as_str(), r.result.total_score))
        .collect();
    assert_eq!(rows, vec![("Aurora", 37.0), ("Cirrus", 21.0), ("Borealis", 10.0)]);
    assert!(!results.quorum.quorum_met);
    assert_eq!(results.anchors.len(), 1);
    assert!(results.anchors[0].explorer_url.is_some());
}

#[test]
fn tie_detection_reads_sorted_results() {
    let teams = hackathon_teams(3);
    let config = PollConfig::new(VotingMode::Multiple);
    let votes = vec![
        Vote::multiple("p", VoteType::Voter, &["team-1", "team-2", "team-3"]),
        Vote::multiple("p", VoteType::Voter, &["team-2", "team-3"]),
    ];

    let results = compute_results(&config, &teams, &votes);
    let report = tied_at_cutoff(&results, 1);
    assert_eq!(report.tied_team_ids, vec!["team-2".to_string(), "team-3".to_string()]);
    assert!(report.needs_tie_breaker());
}
