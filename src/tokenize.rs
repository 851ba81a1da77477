//! English word-level tokenizer.
//!
//! Segments on Unicode word boundaries, drops whitespace, keeps every
//! punctuation mark as its own token and splits clitics off their host word
//! (`don't` -> `do`, `n't`; `movie's` -> `movie`, `'s`).

use unicode_segmentation::UnicodeSegmentation;

fn is_apostrophe(c: char) -> bool {
    c == '\'' || c == '\u{2019}'
}

/// Split `text` into tokens, preserving order.
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    for segment in text.split_word_bounds() {
        if segment.chars().all(char::is_whitespace) {
            continue;
        }
        push_with_clitics(segment, &mut tokens);
    }
    tokens
}

/// Number of tokens in `text`, punctuation included.
pub fn word_count(text: &str) -> usize {
    tokenize(text).len()
}

fn push_with_clitics<'a>(segment: &'a str, tokens: &mut Vec<&'a str>) {
    let Some(apos) = segment.char_indices().find(|&(_, c)| is_apostrophe(c)) else {
        tokens.push(segment);
        return;
    };
    if apos.0 == 0 {
        tokens.push(segment);
        return;
    }

    // "n't" belongs to the clitic, not the host: "can't" -> "ca", "n't"
    let before = &segment[..apos.0];
    let after = &segment[apos.0 + apos.1.len_utf8()..];
    if after.eq_ignore_ascii_case("t") && before.len() > 1 && before.to_lowercase().ends_with('n') {
        let split = before.len() - 1;
        tokens.push(&segment[..split]);
        tokens.push(&segment[split..]);
        return;
    }
    tokens.push(before);
    tokens.push(&segment[apos.0..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_punctuation() {
        assert_eq!(tokenize("Great movie!"), vec!["Great", "movie", "!"]);
        assert_eq!(
            tokenize("Wow... really?!"),
            vec!["Wow", ".", ".", ".", "really", "?", "!"]
        );
    }

    #[test]
    fn splits_negation_clitic() {
        assert_eq!(tokenize("I don't know"), vec!["I", "do", "n't", "know"]);
        assert_eq!(tokenize("can't"), vec!["ca", "n't"]);
        assert_eq!(tokenize("isn\u{2019}t"), vec!["is", "n\u{2019}t"]);
    }

    #[test]
    fn splits_possessive_and_contractions() {
        assert_eq!(tokenize("the movie's end"), vec!["the", "movie", "'s", "end"]);
        assert_eq!(tokenize("they're here"), vec!["they", "'re", "here"]);
    }

    #[test]
    fn numbers_stay_whole() {
        assert_eq!(tokenize("rated 3.5 of 10"), vec!["rated", "3.5", "of", "10"]);
    }

    #[test]
    fn empty_and_whitespace_only() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \n\t ").is_empty());
        assert_eq!(word_count("a, b"), 3);
    }
}
