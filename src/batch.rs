//! Sanitize and normalize every review of a batch, then aggregate.

use std::fmt;

use clap::ValueEnum;
use log::{debug, error, info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::dataset::{Review, Sentiment};
use crate::error::{Result, ReviewError};
use crate::normalizer::Normalizer;
use crate::sanitizer::Sanitizer;
use crate::tokenize::word_count;

/// How a failing row affects the batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, ValueEnum)]
pub enum FailurePolicy {
    /// Stop at the first failing row (in input order) and return its error.
    #[default]
    Abort,
    /// Log the failure, skip the row and keep going.
    Continue,
}

/// A review with its derived fields, ready for charts and exports.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcessedReview {
    pub row: usize,
    pub text: String,
    pub sentiment: Sentiment,
    pub sanitized: String,
    pub stems: Vec<String>,
    pub lemmas: Vec<String>,
    /// Raw text length in characters.
    pub review_length: usize,
    /// Token count of the raw text, punctuation included.
    pub word_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RowFailure {
    pub row: usize,
    pub message: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct AggregateStats {
    pub count: usize,
    pub mean_stems: f64,
    pub mean_lemmas: f64,
}

impl AggregateStats {
    /// Stats over `(stem count, lemma count)` pairs. Means are 0.0 for no rows.
    pub fn from_lengths<I>(lengths: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let (mut count, mut stems, mut lemmas) = (0usize, 0usize, 0usize);
        for (s, l) in lengths {
            count += 1;
            stems += s;
            lemmas += l;
        }
        if count == 0 {
            return Self::default();
        }
        Self {
            count,
            mean_stems: stems as f64 / count as f64,
            mean_lemmas: lemmas as f64 / count as f64,
        }
    }

    pub fn from_rows(rows: &[ProcessedReview]) -> Self {
        Self::from_lengths(rows.iter().map(|r| (r.stems.len(), r.lemmas.len())))
    }
}

impl fmt::Display for AggregateStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Reviews processed: {}", self.count)?;
        writeln!(f, "Mean stems per review: {:.1}", self.mean_stems)?;
        write!(f, "Mean lemmas per review: {:.1}", self.mean_lemmas)
    }
}

#[derive(Clone, Debug, Default)]
pub struct BatchOutput {
    pub rows: Vec<ProcessedReview>,
    pub failures: Vec<RowFailure>,
    pub stats: AggregateStats,
}

/// Sanitize then normalize one review.
pub fn process_review(
    review: &Review,
    sanitizer: &Sanitizer,
    normalizer: &Normalizer,
) -> Result<ProcessedReview> {
    let sanitized = sanitizer.sanitize(&review.text)?;
    let forms = normalizer.process(&sanitized);
    debug!("Row {}: {} tokens kept", review.row, forms.len());
    Ok(ProcessedReview {
        row: review.row,
        text: review.text.clone(),
        sentiment: review.sentiment,
        sanitized,
        stems: forms.stems,
        lemmas: forms.lemmas,
        review_length: review.text.chars().count(),
        word_count: word_count(&review.text),
    })
}

/// Process all reviews in parallel; output order follows input order.
pub fn run(
    reviews: &[Review],
    sanitizer: &Sanitizer,
    normalizer: &Normalizer,
    policy: FailurePolicy,
) -> Result<BatchOutput> {
    let results: Vec<Result<ProcessedReview>> = reviews
        .par_iter()
        .map(|r| process_review(r, sanitizer, normalizer))
        .collect();

    let mut out = BatchOutput::default();
    for (review, result) in reviews.iter().zip(results) {
        match result {
            Ok(row) => out.rows.push(row),
            Err(e) => match policy {
                FailurePolicy::Abort => {
                    error!("Row {} failed, aborting batch: {e}", review.row);
                    return Err(ReviewError::in_row(review.row, e));
                }
                FailurePolicy::Continue => {
                    warn!("Row {} skipped: {e}", review.row);
                    out.failures.push(RowFailure {
                        row: review.row,
                        message: e.to_string(),
                    });
                }
            },
        }
    }

    out.stats = AggregateStats::from_rows(&out.rows);
    info!(
        "Processed {} reviews ({} skipped)",
        out.stats.count,
        out.failures.len()
    );
    Ok(out)
}
