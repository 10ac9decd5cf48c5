use anyhow::Context;
use clap::{Parser, ValueEnum};
use querylens::{AggregationMode, AnalysisConfig, AnalysisResult};
use regex::Regex;
use std::io;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Count byte-identical queries
    Exact,
    /// Group similar queries (first-fit above --threshold)
    Fuzzy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "querylens", version, about = "Query frequency analysis for database general query logs")]
struct Cli {
    /// General query log to analyze (`-` or omitted for stdin)
    input: Option<String>,

    /// Aggregation mode
    #[arg(long = "mode", value_enum, default_value_t = Mode::Exact)]
    mode: Mode,

    /// Similarity percentage a query must exceed to join a group (fuzzy mode, 0-100)
    #[arg(long = "threshold", default_value_t = querylens::config::DEFAULT_THRESHOLD, allow_negative_numbers = true)]
    threshold: i64,

    /// Token that introduces the query text on a log line
    #[arg(long = "marker", default_value = querylens::config::DEFAULT_QUERY_MARKER)]
    marker: String,

    /// Print only the N most frequent queries (0 = all)
    #[arg(long = "top", default_value_t = 20)]
    top: usize,

    /// Output format
    #[arg(long = "format", value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Keep only queries matching this regex
    #[arg(long = "match")]
    match_re: Option<String>,

    /// Drop queries matching this regex
    #[arg(long = "exclude")]
    exclude_re: Option<String>,

    /// Enable debug logging on stderr
    #[arg(long = "debug", default_value_t = false)]
    debug: bool,
}

/// Priority: RUST_LOG > --debug > "warn".
fn init_logging(debug: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .compact()
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let mode = match cli.mode {
        Mode::Exact => AggregationMode::Exact,
        Mode::Fuzzy => AggregationMode::Fuzzy { threshold: Some(cli.threshold) },
    };
    let config = AnalysisConfig::default().with_marker(cli.marker.as_str()).with_mode(mode);

    let include = cli.match_re.as_deref().map(Regex::new).transpose().context("invalid --match regex")?;
    let exclude = cli.exclude_re.as_deref().map(Regex::new).transpose().context("invalid --exclude regex")?;

    let mut result = match cli.input.as_deref() {
        None | Some("-") => {
            querylens::analyze(io::stdin().lock(), &config).context("failed to analyze stdin")?
        }
        Some(path) => {
            querylens::analyze_path(path, &config).with_context(|| format!("failed to analyze {path}"))?
        }
    };
    result.retain_matching(include.as_ref(), exclude.as_ref());

    match cli.format {
        Format::Table => print_table(&result, cli.top),
        Format::Json => {
            let shown = result.top(cli.top).len();
            result.queries.truncate(shown);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}

fn print_table(result: &AnalysisResult, top: usize) {
    println!("Result:");
    for q in result.top(top) {
        println!("{} - {}", q.count, q.query);
    }
}
