use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use log::debug;

use super::round::score_round;
use super::types::{Points, ScoreEntry};
use crate::config::settings::ScoringSettings;
use crate::domain::models::{Quiz, RoundNumber, Submission, TeamName};

/// Which rounds a leaderboard covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scope {
    #[default]
    All,
    Round(RoundNumber),
}

impl FromStr for Scope {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("all") {
            return Ok(Scope::All);
        }
        value
            .parse::<RoundNumber>()
            .map(Scope::Round)
            .map_err(|_| anyhow!("Invalid scope '{}': expected 'all' or a round number", value))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::All => write!(f, "all"),
            Scope::Round(number) => write!(f, "{}", number),
        }
    }
}

impl Scope {
    fn includes(&self, round_number: RoundNumber) -> bool {
        match self {
            Scope::All => true,
            Scope::Round(number) => *number == round_number,
        }
    }
}

/// Ranked leaderboard for `scope`: roster teams and every submitting team,
/// highest points first, ties by team name.
pub fn score_quiz(
    quiz: &Quiz,
    scope: Scope,
    submissions: &[Submission],
    settings: &ScoringSettings,
) -> Vec<ScoreEntry> {
    let mut totals: BTreeMap<TeamName, Points> = quiz
        .teams
        .iter()
        .chain(submissions.iter().map(|s| &s.team_name))
        .map(|team| (team.clone(), 0.0))
        .collect();

    for round in quiz.rounds.iter().filter(|r| scope.includes(r.round_number)) {
        let round_submissions: Vec<Submission> = submissions
            .iter()
            .filter(|s| s.round_number == round.round_number)
            .cloned()
            .collect();

        for (team, points) in score_round(round, &round_submissions, settings) {
            *totals.entry(team).or_insert(0.0) += points;
        }
    }

    debug!("Scored quiz {} (scope {}) for {} teams", quiz.id, scope, totals.len());
    rank(totals)
}

fn rank(totals: BTreeMap<TeamName, Points>) -> Vec<ScoreEntry> {
    let mut entries: Vec<ScoreEntry> = totals
        .into_iter()
        .map(|(team_name, points)| ScoreEntry { team_name, points })
        .collect();

    entries.sort_by(compare_entries);
    entries
}

fn compare_entries(a: &ScoreEntry, b: &ScoreEntry) -> Ordering {
    b.points
        .total_cmp(&a.points)
        .then_with(|| a.team_name.cmp(&b.team_name))
}
