//! Free-text sanitizing against script and SQL injection.
//!
//! Detection is pattern based and targets two threat classes only: `<script>`
//! blocks / `javascript:` attributes, and SQL statement fragments. Whatever is
//! left is HTML-escaped so it can be embedded in markup.

use clap::ValueEnum;
use log::{debug, warn};
use regex::Regex;

use crate::error::{Result, ReviewError};

const SCRIPT_PATTERN: &str =
    r"(?is)<script\b[^>]*>.*?</script\s*>|<\w+\s+[^>]*?javascript:[^>]*>";

const SQL_PHRASE_PATTERN: &str = r"(?i)\b(?:union(?:\s+all)?\s+select(?:\s+[\w*,\s]+?\s+from)?|select\s+[\w*,\s]+?\s+from|insert\s+into|delete\s+from|drop\s+table)\b";

const SQL_KEYWORD_PATTERN: &str = r"(?i)\b(?:union|select|insert|delete|drop|alter)\b";

pub const DEFAULT_SQL_MARKER: &str = "[SQL]";

/// What to do when a threat pattern matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, ValueEnum)]
pub enum SanitizePolicy {
    /// Remove script spans, replace SQL spans with a marker, keep going.
    #[default]
    Strip,
    /// Fail with a validation error.
    Reject,
}

/// Which SQL fragments count as a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, ValueEnum)]
pub enum SqlRules {
    /// Statement phrases such as `select ... from` or `drop table`.
    #[default]
    Phrases,
    /// The phrases plus the bare keywords `union`, `select`, `insert`, `delete`, `drop`, `alter`.
    Keywords,
}

#[derive(Debug, Clone)]
pub struct Sanitizer {
    policy: SanitizePolicy,
    script: Regex,
    sql_phrases: Regex,
    sql_keywords: Option<Regex>,
    marker: String,
}

impl Sanitizer {
    pub fn new(policy: SanitizePolicy, rules: SqlRules) -> Result<Self> {
        let sql_keywords = match rules {
            SqlRules::Phrases => None,
            SqlRules::Keywords => Some(Regex::new(SQL_KEYWORD_PATTERN)?),
        };
        Ok(Self {
            policy,
            script: Regex::new(SCRIPT_PATTERN)?,
            sql_phrases: Regex::new(SQL_PHRASE_PATTERN)?,
            sql_keywords,
            marker: DEFAULT_SQL_MARKER.to_string(),
        })
    }

    /// Replace the marker written over SQL spans in strip mode.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Clean `text` according to the configured policy.
    ///
    /// Empty input is returned unchanged.
    pub fn sanitize(&self, text: &str) -> Result<String> {
        if text.is_empty() {
            return Ok(String::new());
        }
        match self.policy {
            SanitizePolicy::Strip => Ok(html_escape(&self.strip(text))),
            SanitizePolicy::Reject => {
                if let Some(threat) = self.detect(text) {
                    warn!("Rejected input: {threat} detected");
                    return Err(ReviewError::validation(format!("{threat} detected")));
                }
                Ok(html_escape(text))
            }
        }
    }

    /// Like [`Sanitizer::sanitize`], passing a missing value through untouched.
    pub fn sanitize_opt(&self, text: Option<&str>) -> Result<Option<String>> {
        text.map(|t| self.sanitize(t)).transpose()
    }

    /// Name of the first threat class found in `text`, if any.
    pub fn detect(&self, text: &str) -> Option<&'static str> {
        if self.script.is_match(text) {
            Some("script injection")
        } else if self.sql_phrases.is_match(text)
            || self.sql_keywords.as_ref().is_some_and(|re| re.is_match(text))
        {
            Some("SQL injection")
        } else {
            None
        }
    }

    fn strip(&self, text: &str) -> String {
        let no_script = self.script.replace_all(text, "");
        let marker = regex::NoExpand(&self.marker);
        let mut out = self.sql_phrases.replace_all(&no_script, marker).into_owned();
        if let Some(re) = &self.sql_keywords {
            // keep markers from earlier passes intact
            out = re.replace_all(&out, regex::NoExpand(&self.marker)).into_owned();
        }
        if out != text {
            debug!("Stripped suspicious content from {} byte input", text.len());
        }
        out
    }
}

/// Escape `&`, `<`, `>`, `"` and `'` for safe embedding in HTML.
pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip() -> Sanitizer {
        Sanitizer::new(SanitizePolicy::Strip, SqlRules::Phrases).unwrap()
    }

    fn reject() -> Sanitizer {
        Sanitizer::new(SanitizePolicy::Reject, SqlRules::Phrases).unwrap()
    }

    #[test]
    fn valid_input_is_unchanged() {
        assert_eq!(strip().sanitize("Valid input 123").unwrap(), "Valid input 123");
        assert_eq!(reject().sanitize("Valid input 123").unwrap(), "Valid input 123");
    }

    #[test]
    fn clean_input_is_only_escaped() {
        let t = r#"Tom & Jerry said "5 > 3" isn't <b>bold</b>"#;
        assert_eq!(strip().sanitize(t).unwrap(), html_escape(t));
        assert_eq!(reject().sanitize(t).unwrap(), html_escape(t));
    }

    #[test]
    fn empty_and_missing_pass_through() {
        assert_eq!(strip().sanitize("").unwrap(), "");
        assert_eq!(reject().sanitize("").unwrap(), "");
        assert_eq!(strip().sanitize_opt(None).unwrap(), None);
        assert_eq!(
            strip().sanitize_opt(Some("ok")).unwrap(),
            Some("ok".to_string())
        );
    }

    #[test]
    fn script_span_is_removed_in_strip_mode() {
        let out = strip()
            .sanitize("Nice <SCRIPT type=\"text/javascript\">\nalert('x');\n</script> film")
            .unwrap();
        assert_eq!(out, "Nice  film");
        assert!(!out.to_lowercase().contains("script"));
    }

    #[test]
    fn javascript_attribute_tag_is_removed() {
        let out = strip()
            .sanitize("click <a href=\"javascript:alert(1)\">here</a>")
            .unwrap();
        assert_eq!(out, "click here&lt;/a&gt;");
    }

    #[test]
    fn javascript_attribute_tag_is_rejected_in_reject_mode() {
        let err = reject()
            .sanitize("click <a href=\"javascript:alert(1)\">here</a>")
            .unwrap_err();
        assert!(matches!(err, ReviewError::Validation(_)));
        assert!(err.to_string().contains("script injection"));
    }

    #[test]
    fn script_is_rejected_in_reject_mode() {
        let err = reject()
            .sanitize("Invalid <script>alert('xss')</script>")
            .unwrap_err();
        assert!(matches!(err, ReviewError::Validation(_)));
        assert!(err.to_string().contains("script injection"));
    }

    #[test]
    fn sql_phrase_is_replaced_with_marker() {
        let out = strip().sanitize("x; DROP TABLE users; --").unwrap();
        assert_eq!(out, "x; [SQL] users; --");
        let out = strip().sanitize("insert into t values").unwrap();
        assert_eq!(out, "[SQL] t values");
    }

    #[test]
    fn sql_phrase_is_rejected_in_reject_mode() {
        let err = reject().sanitize("1 UNION ALL SELECT password").unwrap_err();
        assert!(err.to_string().contains("SQL injection"));
    }

    #[test]
    fn bare_keywords_only_flagged_with_keyword_rules() {
        let text = "I would not alter a single frame";
        assert_eq!(strip().sanitize(text).unwrap(), text);
        let broad = Sanitizer::new(SanitizePolicy::Strip, SqlRules::Keywords).unwrap();
        assert_eq!(
            broad.sanitize(text).unwrap(),
            "I would not [SQL] a single frame"
        );
        let broad_reject = Sanitizer::new(SanitizePolicy::Reject, SqlRules::Keywords).unwrap();
        assert!(broad_reject.sanitize(text).is_err());
    }

    #[test]
    fn keywords_inside_words_are_ignored() {
        let text = "The selection was dropped from the festival";
        let broad = Sanitizer::new(SanitizePolicy::Strip, SqlRules::Keywords).unwrap();
        assert_eq!(broad.sanitize(text).unwrap(), text);
    }

    #[test]
    fn custom_marker() {
        let s = strip().with_marker("[REMOVED]");
        assert_eq!(s.sanitize("delete from x").unwrap(), "[REMOVED] x");
    }

    #[test]
    fn end_to_end_example() {
        let out = strip()
            .sanitize("Great <script>alert(1)</script> movie! UNION SELECT * FROM users")
            .unwrap();
        assert_eq!(out, "Great  movie! [SQL] users");
    }

    #[test]
    fn escapes_quotes_and_ampersand() {
        assert_eq!(
            html_escape(r#"a&b "c" 'd'"#),
            "a&amp;b &quot;c&quot; &#x27;d&#x27;"
        );
    }
}
