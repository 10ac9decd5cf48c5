use crate::config::DEFAULT_QUERY_MARKER;

/// Pulls the query fragment out of a general-log line.
///
/// A line qualifies when it contains the marker token (literal, case sensitive). The
/// fragment is the rest of the line after the first occurrence, trimmed. A line with
/// nothing but whitespace after the marker yields no fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extractor {
    marker: String,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(DEFAULT_QUERY_MARKER)
    }
}

impl Extractor {
    pub fn new(marker: impl Into<String>) -> Self {
        Self { marker: marker.into() }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn extract<'a>(&self, line: &'a str) -> Option<&'a str> {
        let start = line.find(self.marker.as_str())?;
        let fragment = line[start + self.marker.len()..].trim();
        if fragment.is_empty() {
            None
        } else {
            Some(fragment)
        }
    }
}

/// One-shot extraction with the default `Query` marker.
pub fn extract_query(line: &str) -> Option<&str> {
    Extractor::default().extract(line)
}
