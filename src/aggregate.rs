use crate::config::Threshold;
use crate::similarity::{self, Scorer};
use ahash::AHashMap;
use itertools::Itertools;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryCount {
    pub query: String,
    pub count: usize,
}

impl QueryCount {
    fn first(query: &str) -> Self {
        Self { query: query.to_string(), count: 1 }
    }
}

/// Query counts in first-encounter order. Keys are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<QueryCount>,
}

impl FrequencyTable {
    pub fn entries(&self) -> &[QueryCount] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Entries ordered by count, highest first. Equal counts keep first-encounter order.
    pub fn sorted(&self) -> Vec<QueryCount> {
        self.entries
            .iter()
            .cloned()
            .sorted_by(|a, b| b.count.cmp(&a.count))
            .collect()
    }
}

/// Accumulates fragments into a [`FrequencyTable`].
pub trait Aggregator {
    fn add(&mut self, fragment: &str);
    fn finish(self) -> FrequencyTable;
}

/// Groups fragments that are byte-for-byte equal.
#[derive(Debug, Default)]
pub struct ExactAggregator {
    index: AHashMap<String, usize>,
    entries: Vec<QueryCount>,
}

impl ExactAggregator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Aggregator for ExactAggregator {
    fn add(&mut self, fragment: &str) {
        if let Some(&slot) = self.index.get(fragment) {
            self.entries[slot].count += 1;
            return;
        }
        tracing::trace!(query = fragment, "new exact query");
        self.index.insert(fragment.to_string(), self.entries.len());
        self.entries.push(QueryCount::first(fragment));
    }

    fn finish(self) -> FrequencyTable {
        FrequencyTable { entries: self.entries }
    }
}

/// Groups fragments by similarity with greedy first-fit assignment.
///
/// A fragment joins the earliest-created group whose representative is identical to it
/// or scores strictly above the threshold against it, even when a later group would
/// score higher. The representative is the fragment that opened the group and never
/// changes. Membership therefore depends on input order.
#[derive(Debug)]
pub struct FuzzyAggregator {
    threshold: u8,
    scorer: Scorer,
    groups: Vec<QueryCount>,
}

impl FuzzyAggregator {
    pub fn new(threshold: Threshold) -> Self {
        Self::with_scorer(threshold, similarity::ratio)
    }

    pub fn with_scorer(threshold: Threshold, scorer: Scorer) -> Self {
        Self { threshold: threshold.get(), scorer, groups: Vec::new() }
    }
}

impl Aggregator for FuzzyAggregator {
    fn add(&mut self, fragment: &str) {
        let scorer = self.scorer;
        let threshold = self.threshold;
        // An identical representative always qualifies, so keys stay unique at threshold 100
        let joins = |g: &&mut QueryCount| g.query == fragment || scorer(fragment, &g.query) > threshold;
        match self.groups.iter_mut().find(joins) {
            Some(group) => group.count += 1,
            None => {
                tracing::trace!(query = fragment, groups = self.groups.len() + 1, "new fuzzy group");
                self.groups.push(QueryCount::first(fragment));
            }
        }
    }

    fn finish(self) -> FrequencyTable {
        FrequencyTable { entries: self.groups }
    }
}
