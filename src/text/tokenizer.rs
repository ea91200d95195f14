use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::text::Language;

// Terminal punctuation followed by whitespace or end of input, or a line break.
static SENTENCE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?؟…]+(?:\s+|$)|\s*\n\s*").expect("sentence regex"));
// Arabic also ends sentences at the Arabic semicolon.
static ARABIC_SENTENCE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?؟…؛]+(?:\s+|$)|\s*\n\s*").expect("arabic sentence regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Normalized and stemmed form.
    pub term: String,
    pub stop: bool,
}

#[derive(Debug, Clone)]
pub struct Sentence {
    /// Verbatim, trimmed slice of the source text.
    pub text: String,
    pub tokens: Vec<Token>,
}

impl Sentence {
    /// Content terms, stop words excluded.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.tokens
            .iter()
            .filter(|t| !t.stop)
            .map(|t| t.term.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    pub sentences: Vec<Sentence>,
}

impl Document {
    pub fn parse(text: &str, language: Language) -> Self {
        let sentences = split_sentences(text, language)
            .into_iter()
            .filter_map(|raw| {
                let tokens = tokenize(raw, language);
                if tokens.is_empty() {
                    None
                } else {
                    Some(Sentence {
                        text: raw.to_string(),
                        tokens,
                    })
                }
            })
            .collect();
        Self { sentences }
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

fn split_sentences(text: &str, language: Language) -> Vec<&str> {
    let boundary: &Regex = match language {
        Language::Arabic => &*ARABIC_SENTENCE_BOUNDARY,
        Language::English => &*SENTENCE_BOUNDARY,
    };
    let mut out = Vec::new();
    let mut start = 0;
    for m in boundary.find_iter(text) {
        push_trimmed(&mut out, &text[start..m.end()]);
        start = m.end();
    }
    push_trimmed(&mut out, &text[start..]);
    out
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, piece: &'a str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        out.push(piece);
    }
}

pub fn tokenize(sentence: &str, language: Language) -> Vec<Token> {
    sentence
        .unicode_words()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .map(|w| {
            let normalized = language.normalize(w);
            let stop = language.is_stop_word(&normalized);
            Token {
                term: language.stem(&normalized),
                stop,
            }
        })
        .collect()
}
