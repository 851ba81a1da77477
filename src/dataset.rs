//! Loading labeled reviews from CSV.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use csv::ReaderBuilder;
use log::{error, info};
use serde::Serialize;

use crate::error::{Result, ReviewError};

pub const DEFAULT_TEXT_COLUMN: &str = "review";
pub const DEFAULT_LABEL_COLUMN: &str = "sentiment";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            other => Err(format!("unknown sentiment label '{other}'")),
        }
    }
}

/// One labeled review. `row` is the 1-based data row in the source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Review {
    pub row: usize,
    pub text: String,
    pub sentiment: Sentiment,
}

/// Column names of the source table.
#[derive(Clone, Debug)]
pub struct Columns {
    pub text: String,
    pub label: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT_COLUMN.to_string(),
            label: DEFAULT_LABEL_COLUMN.to_string(),
        }
    }
}

/// Read all reviews from a CSV file with a header row.
pub fn load_reviews(path: &Path, columns: &Columns) -> Result<Vec<Review>> {
    let file = File::open(path).map_err(|e| {
        let err = ReviewError::data_loading(format!("cannot open {}: {e}", path.display()));
        error!("{err}");
        err
    })?;
    let reviews = read_reviews(file, columns).inspect_err(|e| error!("{}: {e}", path.display()))?;
    info!("Loaded {} reviews from {}", reviews.len(), path.display());
    Ok(reviews)
}

/// Read reviews from any CSV source. Fails on missing columns, bad labels or zero rows.
pub fn read_reviews<R: Read>(source: R, columns: &Columns) -> Result<Vec<Review>> {
    let mut reader = ReaderBuilder::new().flexible(false).from_reader(source);
    let headers = reader
        .headers()
        .map_err(|e| ReviewError::data_loading(format!("cannot read header: {e}")))?
        .clone();

    let position = |name: &str| headers.iter().position(|h| h.trim() == name);
    let missing: Vec<&str> = [columns.text.as_str(), columns.label.as_str()]
        .into_iter()
        .filter(|c| position(*c).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(ReviewError::data_loading(format!(
            "missing required column(s): {}",
            missing.join(", ")
        )));
    }
    let (Some(text_idx), Some(label_idx)) = (position(&columns.text), position(&columns.label))
    else {
        return Err(ReviewError::data_loading("missing required columns"));
    };

    let mut reviews = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let row = i + 1;
        let record = record
            .map_err(|e| ReviewError::data_loading(format!("row {row}: malformed record: {e}")))?;
        let text = record.get(text_idx).unwrap_or_default().to_string();
        let sentiment = record
            .get(label_idx)
            .unwrap_or_default()
            .parse::<Sentiment>()
            .map_err(|e| ReviewError::data_loading(format!("row {row}: {e}")))?;
        reviews.push(Review {
            row,
            text,
            sentiment,
        });
    }

    if reviews.is_empty() {
        return Err(ReviewError::data_loading("the dataset contains no rows"));
    }
    Ok(reviews)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(csv: &str) -> Result<Vec<Review>> {
        read_reviews(csv.as_bytes(), &Columns::default())
    }

    #[test]
    fn reads_rows_in_order() {
        let rows = read("review,sentiment\n\"Loved it, truly\",positive\nMeh,NEGATIVE\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text, "Loved it, truly");
        assert_eq!(rows[0].sentiment, Sentiment::Positive);
        assert_eq!(rows[1].sentiment, Sentiment::Negative);
        assert_eq!(rows[1].row, 2);
    }

    #[test]
    fn column_order_does_not_matter() {
        let rows = read("sentiment,id,review\nnegative,7,Bad\n").unwrap();
        assert_eq!(rows[0].text, "Bad");
    }

    #[test]
    fn missing_column_is_reported() {
        let err = read("text,sentiment\nfoo,positive\n").unwrap_err();
        assert!(matches!(err, ReviewError::DataLoading(_)));
        assert!(err.to_string().contains("review"));
    }

    #[test]
    fn empty_dataset_fails() {
        let err = read("review,sentiment\n").unwrap_err();
        assert!(err.to_string().contains("no rows"));
        assert!(read("").is_err());
    }

    #[test]
    fn unknown_label_fails_with_row() {
        let err = read("review,sentiment\nok,positive\nhmm,neutral\n").unwrap_err();
        assert!(err.to_string().contains("row 2"));
        assert!(err.to_string().contains("neutral"));
    }

    #[test]
    fn custom_column_names() {
        let cols = Columns {
            text: "body".into(),
            label: "label".into(),
        };
        let rows = read_reviews("body,label\nFine,positive\n".as_bytes(), &cols).unwrap();
        assert_eq!(rows[0].text, "Fine");
    }
}
