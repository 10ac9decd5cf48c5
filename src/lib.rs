pub mod config;
pub mod extractor;
pub mod similarity;
pub mod aggregate;
pub mod analyzer;

pub use aggregate::{Aggregator, ExactAggregator, FrequencyTable, FuzzyAggregator, QueryCount};
pub use analyzer::{analyze, analyze_lines, analyze_path, AnalysisResult, AnalyzeError};
pub use config::{AggregationMode, AnalysisConfig, ConfigError, Strategy, Threshold};
pub use extractor::Extractor;
