pub mod settings;

pub use settings::{AppConfig, OcrSettings, ScoringSettings, StorageSettings};
