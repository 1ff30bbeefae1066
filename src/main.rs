use anyhow::Result;

use quiz_board::cli::Command;
use quiz_board::{
    handle_completions, handle_leaderboard, handle_parse_sheet, handle_reset, handle_serve, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Serve { port } => handle_serve(*port),
        Command::Leaderboard { quiz_id, scope } => handle_leaderboard(quiz_id, scope),
        Command::ParseSheet { file } => handle_parse_sheet(file),
        Command::Reset { cache } => handle_reset(*cache),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
