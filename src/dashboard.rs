//! Data behind the review dashboard: filtered rows, headline metrics and the
//! series each chart is drawn from.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use clap::ValueEnum;
use log::warn;
use serde::Serialize;

use crate::batch::ProcessedReview;
use crate::dataset::Sentiment;
use crate::{count_words, sort_map_to_vec};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, ValueEnum)]
pub enum SentimentFilter {
    #[default]
    All,
    Positive,
    Negative,
}

impl SentimentFilter {
    pub fn matches(&self, sentiment: Sentiment) -> bool {
        match self {
            SentimentFilter::All => true,
            SentimentFilter::Positive => sentiment == Sentiment::Positive,
            SentimentFilter::Negative => sentiment == Sentiment::Negative,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub total: usize,
    pub positive: usize,
    /// Share of positive reviews in percent.
    pub positive_share: f64,
    pub mean_review_length: f64,
    pub mean_word_count: f64,
}

/// Five-number summary of review lengths, as drawn by a box plot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl BoxStats {
    pub fn from_values(values: &[usize]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted: Vec<f64> = values.iter().map(|&v| v as f64).collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Some(Self {
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

// linear interpolation between closest ranks; `sorted` must be non-empty
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * p;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[derive(Clone, Debug)]
pub struct DashboardView<'a> {
    pub filter: SentimentFilter,
    pub rows: Vec<&'a ProcessedReview>,
    pub metrics: Metrics,
    pub distribution: Vec<(Sentiment, usize)>,
    pub lengths: Vec<(Sentiment, BoxStats)>,
    /// Requested size of the top-word list; `top_words` may be shorter.
    pub top_n: usize,
    pub top_words: Vec<(String, u32)>,
}

impl<'a> DashboardView<'a> {
    pub fn build(rows: &'a [ProcessedReview], filter: SentimentFilter, top_n: usize) -> Self {
        let rows: Vec<&ProcessedReview> =
            rows.iter().filter(|r| filter.matches(r.sentiment)).collect();
        if rows.is_empty() {
            warn!("No reviews match the sentiment filter {filter:?}");
        }

        let total = rows.len();
        let positive = rows
            .iter()
            .filter(|r| r.sentiment == Sentiment::Positive)
            .count();
        let mean = |f: fn(&ProcessedReview) -> usize| {
            if total == 0 {
                0.0
            } else {
                rows.iter().map(|r| f(r)).sum::<usize>() as f64 / total as f64
            }
        };
        let metrics = Metrics {
            total,
            positive,
            positive_share: if total == 0 {
                0.0
            } else {
                positive as f64 * 100.0 / total as f64
            },
            mean_review_length: mean(|r| r.review_length),
            mean_word_count: mean(|r| r.word_count),
        };

        let mut by_sentiment: BTreeMap<Sentiment, Vec<usize>> = BTreeMap::new();
        for r in &rows {
            by_sentiment
                .entry(r.sentiment)
                .or_default()
                .push(r.review_length);
        }
        let distribution = by_sentiment
            .iter()
            .map(|(s, lengths)| (*s, lengths.len()))
            .collect();
        let lengths = by_sentiment
            .iter()
            .filter_map(|(s, lengths)| BoxStats::from_values(lengths).map(|b| (*s, b)))
            .collect();

        let lemmas: Vec<String> = rows.iter().flat_map(|r| r.lemmas.iter().cloned()).collect();
        let mut top_words = sort_map_to_vec(count_words(&lemmas));
        top_words.truncate(top_n);

        Self {
            filter,
            rows,
            metrics,
            distribution,
            lengths,
            top_n,
            top_words,
        }
    }

    /// Plain-text rendering used for the CLI summary.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.rows.is_empty() {
            out.push_str("No reviews match the selected filter.\n");
            return out;
        }
        let m = &self.metrics;
        let _ = writeln!(out, "Filter: {:?}", self.filter);
        let _ = writeln!(out, "Total reviews: {}", m.total);
        let _ = writeln!(
            out,
            "Positive reviews: {} ({:.1}%)",
            m.positive, m.positive_share
        );
        let _ = writeln!(out, "Mean length: {:.0} characters", m.mean_review_length);
        let _ = writeln!(out, "Mean word count: {:.1}", m.mean_word_count);

        out.push_str("\nSentiment distribution:\n");
        for (s, n) in &self.distribution {
            let _ = writeln!(
                out,
                "  {s}\t{n}\t{:.1}%",
                *n as f64 * 100.0 / m.total as f64
            );
        }

        out.push_str("\nReview length by sentiment (min/q1/median/q3/max):\n");
        for (s, b) in &self.lengths {
            let _ = writeln!(
                out,
                "  {s}\t{:.0}/{:.0}/{:.0}/{:.0}/{:.0}",
                b.min, b.q1, b.median, b.q3, b.max
            );
        }

        let _ = writeln!(out, "\nTop {} words:", self.top_n);
        for (word, count) in &self.top_words {
            let _ = writeln!(out, "  {word}\t{count}");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(row: usize, sentiment: Sentiment, len: usize, lemmas: &[&str]) -> ProcessedReview {
        ProcessedReview {
            row,
            text: "x".repeat(len),
            sentiment,
            sanitized: "x".repeat(len),
            stems: lemmas.iter().map(|s| s.to_string()).collect(),
            lemmas: lemmas.iter().map(|s| s.to_string()).collect(),
            review_length: len,
            word_count: lemmas.len(),
        }
    }

    fn rows() -> Vec<ProcessedReview> {
        vec![
            row(1, Sentiment::Positive, 10, &["great", "movie"]),
            row(2, Sentiment::Negative, 20, &["bad", "movie"]),
            row(3, Sentiment::Positive, 30, &["great", "cast"]),
            row(4, Sentiment::Positive, 50, &["movie"]),
        ]
    }

    #[test]
    fn all_filter_metrics() {
        let data = rows();
        let v = DashboardView::build(&data, SentimentFilter::All, 10);
        assert_eq!(v.metrics.total, 4);
        assert_eq!(v.metrics.positive, 3);
        assert_eq!(v.metrics.positive_share, 75.0);
        assert_eq!(v.metrics.mean_review_length, 27.5);
        assert_eq!(
            v.distribution,
            vec![(Sentiment::Positive, 3), (Sentiment::Negative, 1)]
        );
    }

    #[test]
    fn negative_filter_keeps_only_negative_rows() {
        let data = rows();
        let v = DashboardView::build(&data, SentimentFilter::Negative, 10);
        assert_eq!(v.rows.len(), 1);
        assert_eq!(v.rows[0].row, 2);
        assert_eq!(v.metrics.positive, 0);
        assert_eq!(v.metrics.positive_share, 0.0);
    }

    #[test]
    fn top_words_sorted_by_count_then_word() {
        let data = rows();
        let v = DashboardView::build(&data, SentimentFilter::All, 2);
        assert_eq!(
            v.top_words,
            vec![("movie".to_string(), 3), ("great".to_string(), 2)]
        );
    }

    #[test]
    fn box_stats_interpolate() {
        let b = BoxStats::from_values(&[50, 10, 30]).unwrap();
        assert_eq!(b.min, 10.0);
        assert_eq!(b.q1, 20.0);
        assert_eq!(b.median, 30.0);
        assert_eq!(b.q3, 40.0);
        assert_eq!(b.max, 50.0);
        assert!(BoxStats::from_values(&[]).is_none());
    }

    #[test]
    fn empty_selection_renders_notice() {
        let data = vec![row(1, Sentiment::Positive, 5, &["fine"])];
        let v = DashboardView::build(&data, SentimentFilter::Negative, 5);
        assert_eq!(v.metrics, Metrics::default());
        assert!(v.render().contains("No reviews match"));
    }

    #[test]
    fn header_shows_requested_count_even_when_fewer_words() {
        let data = rows();
        let v = DashboardView::build(&data, SentimentFilter::All, 20);
        assert_eq!(v.top_words.len(), 4);
        let out = v.render();
        assert!(out.contains("\nTop 20 words:\n"), "{out}");
        assert!(!out.contains("Top 4 words:"));
    }

    #[test]
    fn render_lists_sections() {
        let data = rows();
        let out = DashboardView::build(&data, SentimentFilter::All, 3).render();
        let i_dist = out.find("Sentiment distribution:").unwrap();
        let i_len = out.find("Review length by sentiment").unwrap();
        let i_top = out.find("Top 3 words:").unwrap();
        assert!(i_dist < i_len && i_len < i_top);
        assert!(out.contains("\n  movie\t3\n"));
        assert!(out.contains("Positive reviews: 3 (75.0%)"));
    }
}
