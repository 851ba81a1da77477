//! Error types for `review_nlp`

use thiserror::Error;

/// Errors that can occur while loading, cleaning or exporting reviews
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Dataset error: {0}")]
    DataLoading(String),

    #[error("Potentially malicious input rejected: {0}")]
    Validation(String),

    #[error("Linguistic resource unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("Row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: Box<ReviewError>,
    },

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReviewError>;

impl ReviewError {
    pub fn data_loading(msg: impl Into<String>) -> Self {
        Self::DataLoading(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn resource(msg: impl Into<String>) -> Self {
        Self::ResourceUnavailable(msg.into())
    }

    pub fn in_row(row: usize, source: ReviewError) -> Self {
        Self::Row {
            row,
            source: Box::new(source),
        }
    }

    /// Process exit code for the CLI: 1 for dataset problems, 2 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DataLoading(_) => 1,
            Self::Row { source, .. } => source.exit_code(),
            _ => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_errors_map_to_exit_code_one() {
        assert_eq!(ReviewError::data_loading("missing column").exit_code(), 1);
        assert_eq!(
            ReviewError::in_row(3, ReviewError::data_loading("bad label")).exit_code(),
            1
        );
    }

    #[test]
    fn other_errors_map_to_exit_code_two() {
        assert_eq!(ReviewError::validation("script").exit_code(), 2);
        assert_eq!(ReviewError::resource("stopwords").exit_code(), 2);
        assert_eq!(
            ReviewError::in_row(1, ReviewError::validation("sql")).exit_code(),
            2
        );
    }

    #[test]
    fn messages_carry_detail() {
        let e = ReviewError::data_loading("missing column 'review'");
        assert!(e.to_string().contains("missing column 'review'"));
        let r = ReviewError::in_row(7, ReviewError::validation("script tag"));
        assert_eq!(
            r.to_string(),
            "Row 7: Potentially malicious input rejected: script tag"
        );
    }
}
