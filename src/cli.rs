use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "quiz-board backend")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Start the backend server
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Print the ranked leaderboard of a quiz
    Leaderboard {
        /// Quiz identifier
        quiz_id: String,
        /// "all" or a single round number
        #[arg(short, long, default_value = "all")]
        scope: String,
    },
    /// Parse a saved OCR entity dump (JSON array or full processor response)
    ParseSheet {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// Drop and recreate the database schema
    Reset {
        /// Also discard cached answer-sheet extractions
        #[arg(long)]
        cache: bool,
    },
    /// Print shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}
