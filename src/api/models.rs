use serde::{Deserialize, Serialize};

use crate::domain::answer_sheet::ParsedAnswer;
use crate::domain::models::{RoundNumber, RulesetKind};
use crate::scoring::{Points, ScoreEntry};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub rank: usize,
    pub team_name: String,
    pub points: Points,
}

impl LeaderboardRow {
    /// Numbers entries 1..n in their ranked order.
    pub fn from_ranked(entries: Vec<ScoreEntry>) -> Vec<Self> {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| LeaderboardRow {
                rank: i + 1,
                team_name: entry.team_name,
                points: entry.points,
            })
            .collect()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    pub quiz_id: String,
    pub scope: String,
    pub entries: Vec<LeaderboardRow>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSheetResponse {
    pub file_name: String,
    pub answers: Vec<ParsedAnswer>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeam {
    pub team_name: String,
}

#[derive(Deserialize)]
pub struct RulesetChange {
    pub ruleset: RulesetKind,
}

#[derive(Deserialize)]
pub struct RoundOrder {
    pub order: Vec<RoundNumber>,
}

#[derive(Deserialize)]
pub struct LeaderboardParams {
    pub scope: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionParams {
    pub round_number: Option<RoundNumber>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSheetParams {
    pub file_name: String,
    #[serde(default)]
    pub last_modified: i64,
}
