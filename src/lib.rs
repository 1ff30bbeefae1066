pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod http;
pub mod rate_limiter;
pub mod scoring;
pub mod services;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use cli::Cli;
use colored::Colorize;
use serde_json::Value;
use std::path::Path;

use crate::api::ocr_client::{extract_entities, map_entities};
use crate::cache::Cache;
use crate::cli::Command;
use crate::config::settings::AppConfig;
use crate::domain::answer_sheet::{OcrEntity, parse_answers};
use crate::scoring::{ScoreEntry, Scope};
use crate::services::ServerService;
use crate::services::leaderboard::build_leaderboard;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::from_env();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_leaderboard(quiz_id: &str, scope: &str) -> Result<()> {
    let scope: Scope = scope.parse()?;
    let config = AppConfig::from_env();

    let pool = database::create_pool(&config.storage.database_path)?;
    let mut conn = database::get_connection(&pool)?;
    database::setup::ensure_schema(&mut conn)?;

    let entries = build_leaderboard(&mut conn, quiz_id, scope, &config.scoring)?
        .with_context(|| format!("Quiz {} not found", quiz_id))?;

    println!("{}", format!("Leaderboard for {} (scope: {})", quiz_id, scope).bold());
    for line in format_leaderboard(&entries) {
        println!("{}", line);
    }
    Ok(())
}

fn format_leaderboard(entries: &[ScoreEntry]) -> Vec<String> {
    let leading = entries.first().map(|e| e.points);

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let line = format!("{:>3}. {:<30} {:>7}", i + 1, entry.team_name, entry.points);
            if Some(entry.points) == leading && entry.points > 0.0 {
                line.green().bold().to_string()
            } else {
                line
            }
        })
        .collect()
}

pub fn handle_parse_sheet(file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let value: Value = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse JSON from {}", file.display()))?;

    let entities = read_entities(&value);
    for answer in parse_answers(&entities) {
        println!("{:>3}. {}", answer.number, answer.text);
    }
    Ok(())
}

/// Accepts a bare entity array or a full processor response.
fn read_entities(value: &Value) -> Vec<OcrEntity> {
    if value.is_array() {
        map_entities(value)
    } else {
        extract_entities(value)
    }
}

pub fn handle_reset(clear_cache: bool) -> Result<()> {
    let config = AppConfig::from_env();
    let pool = database::create_pool(&config.storage.database_path)?;
    let mut conn = database::get_connection(&pool)?;
    database::setup::reset_database(&mut conn)?;

    if clear_cache {
        Cache::new(&config.storage.cache_dir)?.clear()?;
    }
    Ok(())
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_entities_accepts_both_shapes() {
        let bare = json!([{"type": "answer", "mentionText": "1. Rome"}]);
        let wrapped = json!({"document": {"entities": [{"type": "answer", "mentionText": "1. Rome"}]}});

        assert_eq!(read_entities(&bare), read_entities(&wrapped));
        assert_eq!(read_entities(&bare).len(), 1);
    }

    #[test]
    fn test_read_entities_skips_malformed_array_entries() {
        let bare = json!([{"type": "answer", "mentionText": 7}, {"type": "answer", "mentionText": "2. Oslo"}]);

        let answers = parse_answers(&read_entities(&bare));
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].text, "Oslo");
    }

    #[test]
    fn test_format_leaderboard_ranks_in_order() {
        colored::control::set_override(false);
        let lines = format_leaderboard(&[ScoreEntry::new("Owls", 4.0), ScoreEntry::new("Foxes", 1.5)]);

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  1. Owls"));
        assert!(lines[0].ends_with('4'));
        assert!(lines[1].starts_with("  2. Foxes"));
        assert!(lines[1].ends_with("1.5"));
    }
}
