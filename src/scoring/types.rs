use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::models::TeamName;

pub type Points = f64;
pub type TeamPoints = HashMap<TeamName, Points>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub team_name: TeamName,
    pub points: Points,
}

impl ScoreEntry {
    pub fn new(team_name: impl Into<TeamName>, points: Points) -> Self {
        Self {
            team_name: team_name.into(),
            points,
        }
    }
}
