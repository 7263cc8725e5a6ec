use crate::config::DEFAULT_SUPPRESS_KEYWORDS;

/// Case-insensitive substring match against a keyword list.
///
/// Purely heuristic: "frame" also matches "iframe" or "frameworks".
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    keywords: Vec<String>,
}

impl KeywordFilter {
    /// Normalize `keywords` to trimmed lowercase, dropping blanks
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Whether `message` contains any keyword
    pub fn should_suppress(&self, message: &str) -> bool {
        if self.keywords.is_empty() {
            return false;
        }
        let message = message.to_lowercase();
        self.keywords.iter().any(|k| message.contains(k.as_str()))
    }

    /// Normalized keyword list
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for KeywordFilter {
    fn default() -> Self {
        Self::new(DEFAULT_SUPPRESS_KEYWORDS)
    }
}
