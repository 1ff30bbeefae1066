pub mod answer_sheet;
pub mod models;

pub use answer_sheet::{OcrEntity, ParsedAnswer, parse_answers};
pub use models::*;
