use std::borrow::Cow;

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::scoring::text::normalize;

pub type TeamName = String;
pub type RoundNumber = i64;
pub type QuestionNumber = i64;

/// Most options a multiple-choice question can carry (labels A to D).
pub const MAX_OPTIONS: usize = 4;

const DEFAULT_POINTS_PER_CORRECT_ANSWER: f64 = 1.0;
const DEFAULT_POINTS_EXACT_MATCH: f64 = 3.0;
const DEFAULT_POINTS_CLOSEST: f64 = 1.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RulesetKind {
    #[default]
    MultipleChoice,
    Number,
    FreeText,
}

impl RulesetKind {
    pub fn as_str(&self) -> &str {
        match self {
            RulesetKind::MultipleChoice => "multiple-choice",
            RulesetKind::Number => "number",
            RulesetKind::FreeText => "free-text",
        }
    }
}

/// Answer-evaluation mode of a round together with the parameters that only
/// make sense for that mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "ruleset", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Ruleset {
    MultipleChoice {
        points_per_correct_answer: f64,
    },
    Number {
        points_exact_match: f64,
        points_closest_without_exact_match: f64,
    },
    FreeText {
        points_per_correct_answer: f64,
    },
}

impl Ruleset {
    pub fn defaults(kind: RulesetKind) -> Self {
        match kind {
            RulesetKind::MultipleChoice => Ruleset::MultipleChoice {
                points_per_correct_answer: DEFAULT_POINTS_PER_CORRECT_ANSWER,
            },
            RulesetKind::Number => Ruleset::Number {
                points_exact_match: DEFAULT_POINTS_EXACT_MATCH,
                points_closest_without_exact_match: DEFAULT_POINTS_CLOSEST,
            },
            RulesetKind::FreeText => Ruleset::FreeText {
                points_per_correct_answer: DEFAULT_POINTS_PER_CORRECT_ANSWER,
            },
        }
    }

    pub fn kind(&self) -> RulesetKind {
        match self {
            Ruleset::MultipleChoice { .. } => RulesetKind::MultipleChoice,
            Ruleset::Number { .. } => RulesetKind::Number,
            Ruleset::FreeText { .. } => RulesetKind::FreeText,
        }
    }

    /// Picks the parameters belonging to `kind` out of a stored round;
    /// anything else in the document is dropped.
    fn from_document(doc: &RoundDocument) -> Self {
        let points = |value: Option<f64>, default: f64| value.filter(|p| p.is_finite()).unwrap_or(default);

        match doc.ruleset {
            RulesetKind::MultipleChoice => Ruleset::MultipleChoice {
                points_per_correct_answer: points(doc.points_per_correct_answer, DEFAULT_POINTS_PER_CORRECT_ANSWER),
            },
            RulesetKind::Number => Ruleset::Number {
                points_exact_match: points(doc.points_exact_match, DEFAULT_POINTS_EXACT_MATCH),
                points_closest_without_exact_match: points(
                    doc.points_closest_without_exact_match,
                    DEFAULT_POINTS_CLOSEST,
                ),
            },
            RulesetKind::FreeText => Ruleset::FreeText {
                points_per_correct_answer: points(doc.points_per_correct_answer, DEFAULT_POINTS_PER_CORRECT_ANSWER),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChoiceLabel {
    A,
    B,
    C,
    D,
}

impl ChoiceLabel {
    pub fn as_str(&self) -> &str {
        match self {
            ChoiceLabel::A => "A",
            ChoiceLabel::B => "B",
            ChoiceLabel::C => "C",
            ChoiceLabel::D => "D",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "A" => Some(ChoiceLabel::A),
            "B" => Some(ChoiceLabel::B),
            "C" => Some(ChoiceLabel::C),
            "D" => Some(ChoiceLabel::D),
            _ => None,
        }
    }
}

/// Accepted spellings of a free-text answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilingualText {
    #[serde(default, deserialize_with = "lenient_text")]
    pub bg: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub en: String,
}

/// Null and non-string values read as "".
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => text,
        _ => String::new(),
    })
}

impl BilingualText {
    pub fn same(text: &str) -> Self {
        Self {
            bg: text.to_string(),
            en: text.to_string(),
        }
    }

    /// Normalized, non-empty, distinct spellings.
    pub fn candidates(&self) -> Vec<String> {
        let mut candidates: Vec<String> = Vec::with_capacity(2);
        for text in [&self.bg, &self.en] {
            let normalized = normalize(text);
            if !normalized.is_empty() && !candidates.contains(&normalized) {
                candidates.push(normalized);
            }
        }
        candidates
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CorrectAnswer {
    Choice(ChoiceLabel),
    Number(f64),
    Text(BilingualText),
}

impl CorrectAnswer {
    /// Reads a stored correct-answer value in the context of its round's
    /// ruleset. Values that do not fit yield `None`.
    pub fn from_value(kind: RulesetKind, value: &Value) -> Option<Self> {
        match (kind, value) {
            (_, Value::Null) => None,
            (RulesetKind::MultipleChoice, Value::String(label)) => {
                ChoiceLabel::parse(label.trim()).map(CorrectAnswer::Choice)
            }
            (RulesetKind::Number, Value::Number(number)) => {
                number.as_f64().filter(|n| n.is_finite()).map(CorrectAnswer::Number)
            }
            (RulesetKind::Number, Value::String(text)) => parse_finite(text).map(CorrectAnswer::Number),
            (RulesetKind::FreeText, Value::String(text)) => Some(CorrectAnswer::Text(BilingualText::same(text))),
            (RulesetKind::FreeText, Value::Object(_)) => serde_json::from_value::<BilingualText>(value.clone())
                .ok()
                .map(CorrectAnswer::Text),
            _ => None,
        }
    }
}

/// Parses a decimal number, rejecting blanks and non-finite values.
pub fn parse_finite(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub number: QuestionNumber,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<CorrectAnswer>,
}

/// Question as stored or received, before its answer is checked against the
/// round's ruleset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDocument {
    #[serde(default)]
    pub number: QuestionNumber,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: Value,
}

impl QuestionDocument {
    pub fn into_question(self, kind: RulesetKind) -> Question {
        let correct_answer = CorrectAnswer::from_value(kind, &self.correct_answer);
        if correct_answer.is_none() && !self.correct_answer.is_null() {
            warn!(
                "Question {} has a correct answer unusable for a {} round: {}",
                self.number,
                kind.as_str(),
                self.correct_answer
            );
        }

        Question {
            number: self.number,
            text: self.text.unwrap_or_default(),
            options: self.options,
            correct_answer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RoundDocument")]
pub struct Round {
    pub round_number: RoundNumber,
    #[serde(flatten)]
    pub ruleset: Ruleset,
    pub questions: Vec<Question>,
}

impl Round {
    pub fn new(round_number: RoundNumber, kind: RulesetKind) -> Self {
        Self {
            round_number,
            ruleset: Ruleset::defaults(kind),
            questions: Vec::new(),
        }
    }

    pub fn question(&self, number: QuestionNumber) -> Option<&Question> {
        self.questions.iter().find(|q| q.number == number)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundDocument {
    #[serde(default)]
    pub round_number: RoundNumber,
    #[serde(default)]
    pub ruleset: RulesetKind,
    pub points_per_correct_answer: Option<f64>,
    pub points_exact_match: Option<f64>,
    pub points_closest_without_exact_match: Option<f64>,
    #[serde(default)]
    pub questions: Vec<QuestionDocument>,
}

impl From<RoundDocument> for Round {
    fn from(doc: RoundDocument) -> Self {
        let ruleset = Ruleset::from_document(&doc);
        let kind = ruleset.kind();
        Self {
            round_number: doc.round_number,
            ruleset,
            questions: doc.questions.into_iter().map(|q| q.into_question(kind)).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub rounds: Vec<Round>,
    #[serde(default)]
    pub teams: Vec<TeamName>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub id: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizEditError {
    #[error("round {0} not found")]
    RoundNotFound(RoundNumber),
    #[error("question {question} not found in round {round}")]
    QuestionNotFound {
        round: RoundNumber,
        question: QuestionNumber,
    },
    #[error("team name must not be blank")]
    BlankTeamName,
    #[error("a question holds at most 4 options, got {0}")]
    TooManyOptions(usize),
    #[error("round {0} listed more than once")]
    DuplicateRoundInOrder(RoundNumber),
}

impl Quiz {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            rounds: Vec::new(),
            teams: Vec::new(),
        }
    }

    pub fn summary(&self) -> QuizSummary {
        QuizSummary {
            id: self.id.clone(),
            title: self.title.clone(),
        }
    }

    pub fn round(&self, round_number: RoundNumber) -> Option<&Round> {
        self.rounds.iter().find(|r| r.round_number == round_number)
    }

    fn round_mut(&mut self, round_number: RoundNumber) -> Result<&mut Round, QuizEditError> {
        self.rounds
            .iter_mut()
            .find(|r| r.round_number == round_number)
            .ok_or(QuizEditError::RoundNotFound(round_number))
    }

    /// Replaces the round with the same number in place, or appends it.
    pub fn upsert_round(&mut self, round: Round) {
        match self.rounds.iter_mut().find(|r| r.round_number == round.round_number) {
            Some(existing) => *existing = round,
            None => self.rounds.push(round),
        }
    }

    pub fn remove_round(&mut self, round_number: RoundNumber) -> Result<Round, QuizEditError> {
        let idx = self
            .rounds
            .iter()
            .position(|r| r.round_number == round_number)
            .ok_or(QuizEditError::RoundNotFound(round_number))?;
        Ok(self.rounds.remove(idx))
    }

    /// Switching to another ruleset resets its parameters to their defaults
    /// and clears every stored correct answer, which belonged to the old mode.
    pub fn set_round_ruleset(&mut self, round_number: RoundNumber, kind: RulesetKind) -> Result<(), QuizEditError> {
        let round = self.round_mut(round_number)?;
        if round.ruleset.kind() == kind {
            return Ok(());
        }

        round.ruleset = Ruleset::defaults(kind);
        for question in &mut round.questions {
            question.correct_answer = None;
            if kind != RulesetKind::MultipleChoice {
                question.options.clear();
            }
        }
        Ok(())
    }

    /// Moves the listed rounds to the front in the given order. Rounds left
    /// out keep their relative order after them.
    pub fn reorder_rounds(&mut self, order: &[RoundNumber]) -> Result<(), QuizEditError> {
        for (idx, number) in order.iter().enumerate() {
            if order[..idx].contains(number) {
                return Err(QuizEditError::DuplicateRoundInOrder(*number));
            }
            if self.round(*number).is_none() {
                return Err(QuizEditError::RoundNotFound(*number));
            }
        }

        let rank = |round: &Round| {
            order
                .iter()
                .position(|n| *n == round.round_number)
                .unwrap_or(order.len())
        };
        self.rounds.sort_by_key(rank);
        Ok(())
    }

    pub fn upsert_question(&mut self, round_number: RoundNumber, question: Question) -> Result<(), QuizEditError> {
        if question.options.len() > MAX_OPTIONS {
            return Err(QuizEditError::TooManyOptions(question.options.len()));
        }

        let round = self.round_mut(round_number)?;
        match round.questions.iter_mut().find(|q| q.number == question.number) {
            Some(existing) => *existing = question,
            None => round.questions.push(question),
        }
        Ok(())
    }

    pub fn remove_question(
        &mut self,
        round_number: RoundNumber,
        number: QuestionNumber,
    ) -> Result<Question, QuizEditError> {
        let round = self.round_mut(round_number)?;
        let idx = round
            .questions
            .iter()
            .position(|q| q.number == number)
            .ok_or(QuizEditError::QuestionNotFound {
                round: round_number,
                question: number,
            })?;
        Ok(round.questions.remove(idx))
    }

    /// Returns `false` when the team was already on the roster.
    pub fn add_team(&mut self, name: &str) -> Result<bool, QuizEditError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(QuizEditError::BlankTeamName);
        }
        if self.teams.iter().any(|t| t == name) {
            return Ok(false);
        }
        self.teams.push(name.to_string());
        Ok(true)
    }

    /// Replaces the roster, trimming names and dropping repeats. A blank name
    /// rejects the whole roster.
    pub fn set_teams(&mut self, names: Vec<TeamName>) -> Result<(), QuizEditError> {
        let mut roster = Quiz::new(self.id.clone());
        for name in &names {
            roster.add_team(name)?;
        }
        self.teams = roster.teams;
        Ok(())
    }

    pub fn remove_team(&mut self, name: &str) -> bool {
        let before = self.teams.len();
        self.teams.retain(|t| t != name);
        self.teams.len() != before
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(f64),
    Text(String),
}

impl AnswerValue {
    /// Choice labels only ever come in as strings.
    pub fn as_choice(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(text) => Some(text),
            AnswerValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AnswerValue::Number(n) => Some(*n).filter(|n| n.is_finite()),
            AnswerValue::Text(text) => parse_finite(text),
        }
    }

    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            AnswerValue::Text(text) => Cow::Borrowed(text),
            AnswerValue::Number(n) => Cow::Owned(n.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub number: QuestionNumber,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<AnswerValue>,
}

/// One team's answers for one round. Stored keyed by
/// `(quiz_id, team_name, round_number)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default)]
    pub quiz_id: String,
    pub team_name: TeamName,
    pub round_number: RoundNumber,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

impl Submission {
    pub fn answer_for(&self, question: QuestionNumber) -> Option<&AnswerValue> {
        self.answers
            .iter()
            .find(|a| a.number == question)
            .and_then(|a| a.answer.as_ref())
    }
}
