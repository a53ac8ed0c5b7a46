//! Finds teams tied at a prize cutoff so an admin can set up a tie-breaker poll.
//!
//! Reads sorted tally output only; deciding the tie is never done here.

use crate::models::TeamResult;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TieReport {
    pub cutoff: usize,
    /// Score of the team in the last awarded place.
    pub cutoff_score: Option<f64>,
    /// Every team sharing the cutoff score, in result order.
    pub tied_team_ids: Vec<String>,
    /// True when the tied group spans the cutoff (some inside, some outside).
    pub straddles_cutoff: bool,
}

impl TieReport {
    fn empty(cutoff: usize) -> Self {
        Self {
            cutoff,
            cutoff_score: None,
            tied_team_ids: Vec::new(),
            straddles_cutoff: false,
        }
    }

    /// A tie-breaker poll is only needed when the tie crosses the cutoff.
    pub fn needs_tie_breaker(&self) -> bool {
        self.straddles_cutoff
    }
}

/// `results` must be ordered highest score first, as returned by the tally.
pub fn tied_at_cutoff(results: &[TeamResult], cutoff: usize) -> TieReport {
    if cutoff == 0 || results.is_empty() {
        return TieReport::empty(cutoff);
    }

    let last_place = cutoff.min(results.len()) - 1;
    let score = results[last_place].total_score;

    let tied: Vec<(usize, &TeamResult)> = results
        .iter()
        .enumerate()
        .filter(|(_, r)| r.total_score == score)
        .collect();

    let straddles_cutoff = tied.iter().any(|(i, _)| *i >= cutoff) && tied.len() > 1;

    TieReport {
        cutoff,
        cutoff_score: Some(score),
        tied_team_ids: tied.into_iter().map(|(_, r)| r.team_id.clone()).collect(),
        straddles_cutoff,
    }
}
