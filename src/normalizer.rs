//! Token normalization: filtering, stemming and lemmatization.
//!
//! All linguistic resources live in a [`LinguisticContext`] that is built once
//! and only read afterwards, so a single [`Normalizer`] can be shared across
//! worker threads.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use log::{debug, info};
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::Serialize;

use crate::error::{Result, ReviewError};
use crate::tokenize::tokenize;

const EMBEDDED_STOPWORDS: &str = include_str!("resources/stopwords_en.txt");
const EMBEDDED_LEMMAS: &str = include_str!("resources/lemma_exceptions.tsv");
const EMBEDDED_NOUNS: &str = include_str!("resources/nouns_en.txt");

// Character references as produced by the sanitizer's HTML escaping.
const ENTITY_PATTERN: &str = r"&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z][a-zA-Z0-9]*);";

/// Index-aligned token forms of one text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenForms {
    pub tokens: Vec<String>,
    pub stems: Vec<String>,
    pub lemmas: Vec<String>,
}

impl TokenForms {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Dictionary-first noun lemmatizer.
///
/// Looks the word up in the exception table, then tries the detachment rules
/// and keeps a candidate only if the noun lexicon knows it. Words no rule can
/// map to a known noun go through plain suffix rules instead.
#[derive(Debug, Clone, Default)]
pub struct Lemmatizer {
    exceptions: HashMap<String, String>,
    nouns: HashSet<String>,
}

// (suffix, replacement) pairs, tried in this order
const DETACHMENTS: [(&str, &str); 9] = [
    ("s", ""),
    ("ses", "s"),
    ("ves", "f"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
];

impl Lemmatizer {
    /// Exception lemmas count as known nouns too.
    pub fn new(exceptions: HashMap<String, String>, mut nouns: HashSet<String>) -> Self {
        nouns.extend(exceptions.values().cloned());
        Self { exceptions, nouns }
    }

    pub fn lemmatize(&self, word: &str) -> String {
        if let Some(lemma) = self.exceptions.get(word) {
            return lemma.clone();
        }
        if word.chars().count() < 4 || self.nouns.contains(word) {
            return word.to_string();
        }
        let known = DETACHMENTS
            .iter()
            .filter_map(|(suffix, replacement)| {
                word.strip_suffix(suffix)
                    .map(|stem| format!("{stem}{replacement}"))
            })
            .filter(|candidate| self.nouns.contains(candidate))
            .min_by_key(String::len);
        known.unwrap_or_else(|| fallback(word))
    }
}

fn fallback(word: &str) -> String {
    for suffix in ["sses", "shes", "ches", "zzes", "xes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with("ies") && word.len() > 4 {
        return format!("{}y", &word[..word.len() - 3]);
    }
    if let Some(stem) = word.strip_suffix("men") {
        return format!("{stem}man");
    }
    if word.ends_with('s') && !["ss", "us", "is"].iter().any(|s| word.ends_with(s)) {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Process-wide read-only resources: stopwords, stemmer and lemmatizer.
pub struct LinguisticContext {
    stopwords: HashSet<String>,
    stemmer: Stemmer,
    lemmatizer: Lemmatizer,
}

impl LinguisticContext {
    /// English resources embedded in the binary.
    pub fn english() -> Result<Self> {
        Self::load(None, None)
    }

    /// Embedded English resources extended by optional user files.
    ///
    /// `extra_stopwords` holds one word per line, `extra_lemmas` one
    /// `form<TAB>lemma` pair per line. Lines starting with `#` are ignored.
    pub fn load(extra_stopwords: Option<&Path>, extra_lemmas: Option<&Path>) -> Result<Self> {
        let mut stopwords = parse_word_list(EMBEDDED_STOPWORDS);
        let mut exceptions = parse_lemmas(EMBEDDED_LEMMAS, "embedded lemma table")?;

        if let Some(path) = extra_stopwords {
            let extra = parse_word_list(&read_resource(path, "stopword")?);
            if extra.is_empty() {
                return Err(ReviewError::resource(format!(
                    "stopword file {} contains no words",
                    path.display()
                )));
            }
            debug!("Loaded {} extra stopwords from {}", extra.len(), path.display());
            stopwords.extend(extra);
        }
        if let Some(path) = extra_lemmas {
            let content = read_resource(path, "lemma")?;
            let extra = parse_lemmas(&content, &path.display().to_string())?;
            if extra.is_empty() {
                return Err(ReviewError::resource(format!(
                    "lemma file {} contains no entries",
                    path.display()
                )));
            }
            debug!("Loaded {} extra lemmas from {}", extra.len(), path.display());
            exceptions.extend(extra);
        }

        if stopwords.is_empty() || exceptions.is_empty() {
            return Err(ReviewError::resource("embedded English resources are empty"));
        }
        info!(
            "Linguistic resources ready: {} stopwords, {} lemma exceptions",
            stopwords.len(),
            exceptions.len()
        );
        Ok(Self {
            stopwords,
            stemmer: Stemmer::create(Algorithm::English),
            lemmatizer: Lemmatizer::new(exceptions, parse_word_list(EMBEDDED_NOUNS)),
        })
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    pub fn stem(&self, word: &str) -> String {
        self.stemmer.stem(word).into_owned()
    }

    pub fn lemmatize(&self, word: &str) -> String {
        self.lemmatizer.lemmatize(word)
    }
}

fn read_resource(path: &Path, kind: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        ReviewError::resource(format!("cannot read {kind} file {}: {e}", path.display()))
    })
}

fn parse_word_list(content: &str) -> HashSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_lowercase)
        .collect()
}

fn parse_lemmas(content: &str, origin: &str) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for (n, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((form, lemma)) = line.split_once('\t') else {
            return Err(ReviewError::resource(format!(
                "{origin}, line {}: expected form<TAB>lemma",
                n + 1
            )));
        };
        let (form, lemma) = (form.trim(), lemma.trim());
        if form.is_empty() || lemma.is_empty() {
            return Err(ReviewError::resource(format!(
                "{origin}, line {}: empty form or lemma",
                n + 1
            )));
        }
        map.insert(form.to_lowercase(), lemma.to_lowercase());
    }
    Ok(map)
}

fn is_latin(c: char) -> bool {
    c.is_ascii_alphabetic()
        || ('\u{00C0}'..='\u{024F}').contains(&c)
        || ('\u{1E00}'..='\u{1EFF}').contains(&c)
}

/// Alphabetic only, and not mixing Latin with other scripts.
fn is_plain_word(token: &str) -> bool {
    if token.is_empty() || !token.chars().all(char::is_alphabetic) {
        return false;
    }
    let latin = token.chars().filter(|&c| is_latin(c)).count();
    latin == 0 || latin == token.chars().count()
}

pub struct Normalizer {
    context: LinguisticContext,
    entity: Regex,
}

impl Normalizer {
    pub fn new(context: LinguisticContext) -> Result<Self> {
        Ok(Self {
            context,
            entity: Regex::new(ENTITY_PATTERN)?,
        })
    }

    /// Lowercased alphabetic non-stopword tokens of `text`, in order.
    pub fn normalized_tokens(&self, text: &str) -> Vec<String> {
        let text = self.entity.replace_all(text, " ");
        tokenize(&text)
            .into_iter()
            .filter(|t| is_plain_word(t))
            .map(str::to_lowercase)
            .filter(|t| !self.context.is_stopword(t))
            .collect()
    }

    /// Tokens of `text` with their stems and lemmas.
    pub fn process(&self, text: &str) -> TokenForms {
        let tokens = self.normalized_tokens(text);
        let stems = tokens.iter().map(|t| self.context.stem(t)).collect();
        let lemmas = tokens.iter().map(|t| self.context.lemmatize(t)).collect();
        TokenForms {
            tokens,
            stems,
            lemmas,
        }
    }
}
