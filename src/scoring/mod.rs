pub mod distance;
pub mod quiz;
pub mod round;
pub mod text;
pub mod types;

pub use distance::{distance, is_free_text_correct};
pub use quiz::{Scope, score_quiz};
pub use round::score_round;
pub use text::normalize;
pub use types::{Points, ScoreEntry, TeamPoints};
