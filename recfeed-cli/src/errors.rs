//! Small error-context helper for the CLI layer.

use anyhow::Result;

/// Appends a short, user-facing suggestion to an error's `Display` text.
pub trait WithSuggestion<T> {
    fn with_suggestion(self, suggestion: &str) -> Result<T>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> WithSuggestion<T> for Result<T, E> {
    fn with_suggestion(self, suggestion: &str) -> Result<T> {
        self.map_err(|e| anyhow::anyhow!("{e}\n\nsuggestion: {suggestion}"))
    }
}
