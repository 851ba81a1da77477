#![forbid(unsafe_code)]
//! # Review NLP CLI
//!
//! Command-line interface for the `review_nlp` crate. It loads a CSV of
//! sentiment-labeled reviews, sanitizes and normalizes every review, and prints
//! summary statistics plus the data behind the usual review charts.
//!
//! ## Example
//! ```bash
//! cargo run --release -- data/reviews.csv --sentiment positive --export-format csv
//! ```
//!
//! Exit codes: 0 on success, 1 on a dataset error, 2 on any other error.
//! See `--help` for all available options.

use clap::Parser;
use log::error;
use std::path::PathBuf;
use std::process;
use review_nlp::{
    Columns, ExportFormat, FailurePolicy, PipelineOptions, SanitizePolicy, SentimentFilter,
    SqlRules, analyze_dataset,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// CSV file with a review text column and a sentiment column
    path: PathBuf,

    /// What to do with script/SQL patterns: strip them or reject the row
    #[arg(long, value_enum, default_value_t = SanitizePolicy::Strip)]
    sanitize_policy: SanitizePolicy,

    /// SQL patterns to flag: statement phrases only, or bare keywords too
    #[arg(long, value_enum, default_value_t = SqlRules::Phrases)]
    sql_rules: SqlRules,

    /// On a failing row: abort the whole run or skip the row and continue
    #[arg(long, value_enum, default_value_t = FailurePolicy::Abort)]
    on_error: FailurePolicy,

    /// Optional path to additional stopword file (.txt, one word per line)
    #[arg(long)]
    stopwords: Option<PathBuf>,

    /// Optional path to additional lemma file (form<TAB>lemma per line)
    #[arg(long)]
    lemmas: Option<PathBuf>,

    /// Restrict the dashboard metrics and exports to one sentiment
    #[arg(long, value_enum, default_value_t = SentimentFilter::All)]
    sentiment: SentimentFilter,

    /// Number of most frequent words to report
    #[arg(long, default_value_t = 20)]
    top: usize,

    /// Export results (txt, csv, tsv, json); nothing is written if omitted
    #[arg(long, value_enum)]
    export_format: Option<ExportFormat>,

    /// Directory for exported files
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Name of the review text column
    #[arg(long, default_value = "review")]
    text_column: String,

    /// Name of the sentiment label column
    #[arg(long, default_value = "sentiment")]
    label_column: String,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let options = PipelineOptions {
        sanitize_policy: cli.sanitize_policy,
        sql_rules: cli.sql_rules,
        failure_policy: cli.on_error,
        extra_stopwords: cli.stopwords,
        extra_lemmas: cli.lemmas,
        columns: Columns {
            text: cli.text_column,
            label: cli.label_column,
        },
        filter: cli.sentiment,
        top_n: cli.top,
        export_format: cli.export_format,
        out_dir: cli.out_dir,
    };

    match analyze_dataset(&cli.path, &options) {
        Ok(report) => {
            println!("{}", report.summary);
            for path in &report.exported {
                println!("Wrote {}", path.display());
            }
        }
        Err(e) => {
            error!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}
