//! # review_nlp
//!
//! Preprocessing and summary statistics for sentiment-labeled movie reviews.
//!
//! The pipeline per review is: sanitize the raw text (script/SQL patterns,
//! HTML escaping), tokenize, keep alphabetic non-stopword tokens, then stem
//! and lemmatize them. [`analyze_dataset`] runs it over a whole CSV file and
//! produces the summary printed by the CLI, plus optional exports.
//!
//! ## Example
//! ```
//! use review_nlp::{LinguisticContext, Normalizer, SanitizePolicy, Sanitizer, SqlRules};
//!
//! let sanitizer = Sanitizer::new(SanitizePolicy::Strip, SqlRules::Phrases).unwrap();
//! let normalizer = Normalizer::new(LinguisticContext::english().unwrap()).unwrap();
//!
//! let clean = sanitizer.sanitize("Great <script>alert(1)</script> movie!").unwrap();
//! let forms = normalizer.process(&clean);
//! assert_eq!(forms.stems, vec!["great", "movi"]);
//! assert_eq!(forms.lemmas, vec!["great", "movie"]);
//! ```

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use log::info;

pub mod batch;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod export;
pub mod normalizer;
pub mod sanitizer;
pub mod tokenize;

pub use batch::{AggregateStats, BatchOutput, FailurePolicy, ProcessedReview, RowFailure};
pub use dashboard::{BoxStats, DashboardView, Metrics, SentimentFilter};
pub use dataset::{Columns, Review, Sentiment, load_reviews, read_reviews};
pub use error::{Result, ReviewError};
pub use export::{ExportFormat, ExportTarget};
pub use normalizer::{Lemmatizer, LinguisticContext, Normalizer, TokenForms};
pub use sanitizer::{SanitizePolicy, Sanitizer, SqlRules, html_escape};
pub use tokenize::tokenize;

const PREVIEW_ROWS: usize = 5;
const PREVIEW_CHARS: usize = 60;

/// Settings for one pipeline run. Mirrors the CLI flags.
#[derive(Clone, Debug)]
pub struct PipelineOptions {
    pub sanitize_policy: SanitizePolicy,
    pub sql_rules: SqlRules,
    pub failure_policy: FailurePolicy,
    pub extra_stopwords: Option<PathBuf>,
    pub extra_lemmas: Option<PathBuf>,
    pub columns: Columns,
    pub filter: SentimentFilter,
    pub top_n: usize,
    pub export_format: Option<ExportFormat>,
    pub out_dir: PathBuf,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            sanitize_policy: SanitizePolicy::Strip,
            sql_rules: SqlRules::Phrases,
            failure_policy: FailurePolicy::Abort,
            extra_stopwords: None,
            extra_lemmas: None,
            columns: Columns::default(),
            filter: SentimentFilter::All,
            top_n: 20,
            export_format: None,
            out_dir: PathBuf::from("."),
        }
    }
}

/// Result of [`analyze_dataset`].
#[derive(Debug)]
pub struct Report {
    pub summary: String,
    pub output: BatchOutput,
    pub exported: Vec<PathBuf>,
}

/// Takes a slice of words and counts each one.
/// # Example
/// ```
/// use review_nlp::count_words;
/// let words = vec!["two".to_string(), "one".to_string(), "two".to_string()];
/// let counted = count_words(&words);
/// assert_eq!(counted["two"], 2);
/// assert_eq!(counted["one"], 1);
/// ```
pub fn count_words(words: &[String]) -> HashMap<String, u32> {
    let mut frequency: HashMap<String, u32> = HashMap::new();
    for word in words {
        *frequency.entry(word.to_owned()).or_insert(0) += 1;
    }
    frequency
}

/// Sort a word-frequency map by count (descending), ties by word (ascending).
/// # Example
/// ```
/// use review_nlp::sort_map_to_vec;
/// use std::collections::HashMap;
/// let mut words_map = HashMap::new();
/// words_map.insert("b".to_string(), 2_u32);
/// words_map.insert("a".to_string(), 2_u32);
/// words_map.insert("c".to_string(), 3_u32);
/// let expected = vec![("c".to_string(), 3), ("a".to_string(), 2), ("b".to_string(), 2)];
/// assert_eq!(sort_map_to_vec(words_map), expected);
/// ```
pub fn sort_map_to_vec(frequency: HashMap<String, u32>) -> Vec<(String, u32)> {
    let mut vec_sorted: Vec<(String, u32)> = frequency.into_iter().collect();
    vec_sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    vec_sorted
}

/// Neutralize spreadsheet formulas: cells starting with `=`, `+`, `-`, `@`,
/// tab or CR get a leading `'`.
pub fn csv_safe_cell(cell: String) -> String {
    match cell.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{cell}"),
        _ => cell,
    }
}

fn excerpt(text: &str) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        flat
    } else {
        let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}...")
    }
}

/// Text summary of a finished batch: stats, preview, skipped rows, dashboard data.
pub fn summarize(output: &BatchOutput, view: &DashboardView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", output.stats);

    let _ = writeln!(out, "\nFirst {} rows:", output.rows.len().min(PREVIEW_ROWS));
    for r in output.rows.iter().take(PREVIEW_ROWS) {
        let _ = writeln!(
            out,
            "  #{} [{}] {}\n    stems: {}\n    lemmas: {}",
            r.row,
            r.sentiment,
            excerpt(&r.text),
            r.stems.join(" "),
            r.lemmas.join(" ")
        );
    }

    if !output.failures.is_empty() {
        let _ = writeln!(out, "\nSkipped rows: {}", output.failures.len());
        for f in &output.failures {
            let _ = writeln!(out, "  #{}: {}", f.row, f.message);
        }
    }

    out.push('\n');
    out.push_str(&view.render());
    out
}

/// Load, process, summarize and optionally export the dataset at `path`.
pub fn analyze_dataset(path: &Path, options: &PipelineOptions) -> Result<Report> {
    // resources first: a missing dictionary must fail before any row is read
    let context = LinguisticContext::load(
        options.extra_stopwords.as_deref(),
        options.extra_lemmas.as_deref(),
    )
    .inspect_err(|e| log::error!("{e}"))?;
    let normalizer = Normalizer::new(context)?;
    let sanitizer = Sanitizer::new(options.sanitize_policy, options.sql_rules)?;

    let reviews = load_reviews(path, &options.columns)?;
    let output = batch::run(&reviews, &sanitizer, &normalizer, options.failure_policy)?;

    let view = DashboardView::build(&output.rows, options.filter, options.top_n);
    let summary = summarize(&output, &view);

    let mut exported = Vec::new();
    if let Some(format) = options.export_format {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "reviews".to_string());
        let target = ExportTarget::new(&options.out_dir, &stem)?;
        if format == ExportFormat::Txt {
            exported.push(export::export_summary(&summary, &target)?);
        } else {
            let filtered: Vec<ProcessedReview> = view.rows.iter().map(|r| (*r).clone()).collect();
            exported.extend(export::export_rows(&filtered, format, &target)?);
            exported.extend(export::export_wordfreq(&view.top_words, format, &target)?);
        }
        info!("Exported {} file(s) to {}", exported.len(), options.out_dir.display());
    }

    Ok(Report {
        summary,
        output,
        exported,
    })
}
