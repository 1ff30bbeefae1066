use log::debug;

use super::distance::is_free_text_correct_within;
use super::types::{Points, TeamPoints};
use crate::config::settings::ScoringSettings;
use crate::domain::models::{CorrectAnswer, Question, Round, Ruleset, Submission};

/// Scores one round. `submissions` must already be restricted to this round;
/// nothing here looks at their round number.
///
/// Every team with a submission gets an entry, even with zero points.
pub fn score_round(round: &Round, submissions: &[Submission], settings: &ScoringSettings) -> TeamPoints {
    let mut points: TeamPoints = submissions
        .iter()
        .map(|s| (s.team_name.clone(), 0.0))
        .collect();

    for question in &round.questions {
        match &round.ruleset {
            Ruleset::MultipleChoice {
                points_per_correct_answer,
            } => award_choice(question, submissions, *points_per_correct_answer, &mut points),
            Ruleset::FreeText {
                points_per_correct_answer,
            } => award_free_text(question, submissions, *points_per_correct_answer, settings, &mut points),
            Ruleset::Number {
                points_exact_match,
                points_closest_without_exact_match,
            } => award_number(
                question,
                submissions,
                *points_exact_match,
                *points_closest_without_exact_match,
                &mut points,
            ),
        }
    }

    debug!(
        "Scored round {} ({}) for {} teams",
        round.round_number,
        round.ruleset.kind().as_str(),
        points.len()
    );
    points
}

fn award(points: &mut TeamPoints, team: &str, amount: Points) {
    *points.entry(team.to_string()).or_insert(0.0) += amount;
}

fn award_choice(question: &Question, submissions: &[Submission], amount: Points, points: &mut TeamPoints) {
    let Some(CorrectAnswer::Choice(label)) = &question.correct_answer else {
        return;
    };

    for submission in submissions {
        let submitted = submission.answer_for(question.number).and_then(|a| a.as_choice());
        if submitted == Some(label.as_str()) {
            award(points, &submission.team_name, amount);
        }
    }
}

fn award_free_text(
    question: &Question,
    submissions: &[Submission],
    amount: Points,
    settings: &ScoringSettings,
    points: &mut TeamPoints,
) {
    let Some(CorrectAnswer::Text(correct)) = &question.correct_answer else {
        return;
    };

    for submission in submissions {
        let submitted = submission
            .answer_for(question.number)
            .map(|a| a.as_text())
            .unwrap_or_default();
        if is_free_text_correct_within(&submitted, correct, settings.free_text_threshold) {
            award(points, &submission.team_name, amount);
        }
    }
}

/// Exact hits all take `exact`; without any, every team sharing the smallest
/// distance takes `closest`.
fn award_number(
    question: &Question,
    submissions: &[Submission],
    exact: Points,
    closest: Points,
    points: &mut TeamPoints,
) {
    let Some(CorrectAnswer::Number(correct)) = question.correct_answer else {
        return;
    };
    if !correct.is_finite() {
        return;
    }

    let guesses: Vec<(&str, f64)> = submissions
        .iter()
        .filter_map(|s| {
            let guess = s.answer_for(question.number)?.as_number()?;
            Some((s.team_name.as_str(), (guess - correct).abs()))
        })
        .collect();

    let exact_hits: Vec<&str> = guesses
        .iter()
        .filter(|(_, diff)| *diff == 0.0)
        .map(|(team, _)| *team)
        .collect();

    if !exact_hits.is_empty() {
        for team in exact_hits {
            award(points, team, exact);
        }
        return;
    }

    let Some(best) = guesses.iter().map(|(_, diff)| *diff).min_by(f64::total_cmp) else {
        return;
    };
    for (team, diff) in &guesses {
        if *diff == best {
            award(points, team, closest);
        }
    }
}
