use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::models::QuestionNumber;

/// Entity type the extraction processor assigns to a handwritten answer line.
pub const ANSWER_ENTITY_TYPE: &str = "answer";

static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^([0-9]+)\.(.*)$").expect("numbered line pattern is valid"));

/// Entity produced by the document-extraction service. Any other fields are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrEntity {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mention_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAnswer {
    pub number: QuestionNumber,
    pub text: String,
}

/// Turns OCR entities into `{number, text}` pairs sorted by number.
/// Entities that are not answers or do not read as `N. text` are skipped.
pub fn parse_answers(entities: &[OcrEntity]) -> Vec<ParsedAnswer> {
    let mut answers: Vec<ParsedAnswer> = entities
        .iter()
        .filter(|entity| entity.kind.as_deref() == Some(ANSWER_ENTITY_TYPE))
        .filter_map(|entity| parse_line(entity.mention_text.as_deref().unwrap_or_default()))
        .collect();

    answers.sort_by_key(|answer| answer.number);
    debug!("Parsed {} answers from {} entities", answers.len(), entities.len());
    answers
}

fn parse_line(mention: &str) -> Option<ParsedAnswer> {
    let captures = NUMBERED_LINE.captures(mention.trim())?;
    let number = captures[1].parse::<QuestionNumber>().ok()?;
    Some(ParsedAnswer {
        number,
        text: captures[2].trim().to_string(),
    })
}
