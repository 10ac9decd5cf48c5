use crate::aggregate::{Aggregator, ExactAggregator, FrequencyTable, FuzzyAggregator, QueryCount};
use crate::config::{AnalysisConfig, ConfigError, Strategy};
use crate::extractor::Extractor;
use regex::Regex;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot read {}: {source}", describe(.path))]
    StreamUnreadable {
        path: Option<PathBuf>,
        #[source]
        source: io::Error,
    },
}

fn describe(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!("'{}'", p.display()),
        None => "input stream".to_string(),
    }
}

/// Query frequencies ordered by count (highest first, ties in first-encounter order).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    #[serde(flatten)]
    pub strategy: Strategy,
    pub lines_read: usize,
    pub matched_lines: usize,
    pub queries: Vec<QueryCount>,
}

impl AnalysisResult {
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn total(&self) -> usize {
        self.queries.iter().map(|q| q.count).sum()
    }

    /// The `n` most frequent entries; `0` means all of them.
    pub fn top(&self, n: usize) -> &[QueryCount] {
        if n == 0 || n >= self.queries.len() {
            &self.queries
        } else {
            &self.queries[..n]
        }
    }

    /// Keeps entries whose text matches `include` (if given) and not `exclude` (if given).
    /// Order and the line statistics are left untouched.
    pub fn retain_matching(&mut self, include: Option<&Regex>, exclude: Option<&Regex>) {
        if let Some(rx) = include {
            self.queries.retain(|q| rx.is_match(&q.query));
        }
        if let Some(rx) = exclude {
            self.queries.retain(|q| !rx.is_match(&q.query));
        }
    }
}

pub fn analyze<R: BufRead>(reader: R, config: &AnalysisConfig) -> Result<AnalysisResult, AnalyzeError> {
    run(reader.lines(), config, None)
}

pub fn analyze_path(path: impl AsRef<Path>, config: &AnalysisConfig) -> Result<AnalysisResult, AnalyzeError> {
    let path = path.as_ref();
    // Reject bad configuration before touching the file
    config.validate()?;
    let file = File::open(path).map_err(|source| {
        tracing::warn!(path = %path.display(), error = %source, "cannot open query log");
        AnalyzeError::StreamUnreadable { path: Some(path.to_path_buf()), source }
    })?;
    run(BufReader::new(file).lines(), config, Some(path))
}

/// Analyzes lines already held in memory.
pub fn analyze_lines<'a, I>(lines: I, config: &AnalysisConfig) -> Result<AnalysisResult, AnalyzeError>
where
    I: IntoIterator<Item = &'a str>,
{
    run(lines.into_iter().map(Ok::<_, io::Error>), config, None)
}

fn run<I, L>(lines: I, config: &AnalysisConfig, path: Option<&Path>) -> Result<AnalysisResult, AnalyzeError>
where
    I: Iterator<Item = io::Result<L>>,
    L: AsRef<str>,
{
    let strategy = config.validate()?;
    let extractor = Extractor::new(config.marker.as_str());
    tracing::debug!(?strategy, marker = extractor.marker(), "starting query analysis");

    let outcome = match strategy {
        Strategy::Exact => consume(lines, &extractor, ExactAggregator::new()),
        Strategy::Fuzzy { threshold } => consume(lines, &extractor, FuzzyAggregator::new(threshold)),
    };
    let (table, lines_read, matched_lines) = outcome.map_err(|source| {
        tracing::warn!(error = %source, "query log read failed, discarding partial analysis");
        AnalyzeError::StreamUnreadable { path: path.map(Path::to_path_buf), source }
    })?;

    tracing::debug!(lines_read, matched_lines, distinct = table.len(), "query analysis complete");
    Ok(AnalysisResult { strategy, lines_read, matched_lines, queries: table.sorted() })
}

fn consume<I, L, A>(lines: I, extractor: &Extractor, mut agg: A) -> io::Result<(FrequencyTable, usize, usize)>
where
    I: Iterator<Item = io::Result<L>>,
    L: AsRef<str>,
    A: Aggregator,
{
    let mut lines_read = 0;
    let mut matched = 0;
    for line in lines {
        let line = line?;
        lines_read += 1;
        if let Some(fragment) = extractor.extract(line.as_ref()) {
            agg.add(fragment);
            matched += 1;
        }
    }
    Ok((agg.finish(), lines_read, matched))
}
