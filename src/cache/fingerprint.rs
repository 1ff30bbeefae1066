use serde::Deserialize;

/// Identifies an uploaded scan by what the browser reports about the file,
/// without hashing its content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fingerprint {
    pub file_name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub last_modified: i64,
}

impl Fingerprint {
    pub fn new(file_name: impl Into<String>, size: u64, last_modified: i64) -> Self {
        Self {
            file_name: file_name.into(),
            size,
            last_modified,
        }
    }

    /// Filesystem-safe cache key. Characters outside `[A-Za-z0-9._-]` in the
    /// file name become `_`.
    pub fn cache_key(&self) -> String {
        let name: String = self
            .file_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
            .collect();
        format!("{}-{}-{}", name, self.size, self.last_modified)
    }
}
