use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::text::stopwords;

/// Deployment language for tokenization, stemming and stop words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Arabic,
    English,
}

impl Language {
    pub fn name(self) -> &'static str {
        match self {
            Language::Arabic => "Arabic",
            Language::English => "English",
        }
    }

    /// Lowercases and folds orthographic variants so the same word always
    /// produces the same term.
    pub fn normalize(self, word: &str) -> String {
        match self {
            Language::Arabic => normalize_arabic(word),
            Language::English => word.to_lowercase(),
        }
    }

    /// Light affix stripping applied to an already normalized word.
    pub fn stem(self, normalized: &str) -> String {
        match self {
            Language::Arabic => stem_arabic(normalized),
            Language::English => stem_english(normalized),
        }
    }

    pub fn stop_words(self) -> &'static HashSet<String> {
        match self {
            Language::Arabic => &stopwords::ARABIC,
            Language::English => &stopwords::ENGLISH,
        }
    }

    pub fn is_stop_word(self, normalized: &str) -> bool {
        self.stop_words().contains(normalized)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn normalize_arabic(word: &str) -> String {
    word.chars()
        .filter(|c| !matches!(c, '\u{064B}'..='\u{0652}' | '\u{0670}' | '\u{0640}'))
        .map(|c| match c {
            'أ' | 'إ' | 'آ' | 'ٱ' => 'ا',
            'ى' => 'ي',
            'ة' => 'ه',
            other => other,
        })
        .flat_map(char::to_lowercase)
        .collect()
}

// Longest affixes first; stripping stops at a three letter root.
const ARABIC_PREFIXES: &[&str] = &["وال", "بال", "كال", "فال", "لل", "ال"];
const ARABIC_SUFFIXES: &[&str] = &["ها", "ان", "ات", "ون", "ين", "يه", "هم", "ه", "ي"];
const MIN_ROOT_CHARS: usize = 3;

fn stem_arabic(word: &str) -> String {
    let mut stem = word;
    if let Some(rest) = ARABIC_PREFIXES
        .iter()
        .find_map(|p| stem.strip_prefix(p))
        .filter(|rest| rest.chars().count() >= MIN_ROOT_CHARS)
    {
        stem = rest;
    }
    if let Some(rest) = ARABIC_SUFFIXES
        .iter()
        .find_map(|s| stem.strip_suffix(s))
        .filter(|rest| rest.chars().count() >= MIN_ROOT_CHARS)
    {
        stem = rest;
    }
    stem.to_string()
}

fn stem_english(word: &str) -> String {
    if word.chars().count() <= MIN_ROOT_CHARS {
        return word.to_string();
    }
    if let Some(rest) = word.strip_suffix("ies") {
        if rest.chars().count() >= 2 {
            return format!("{rest}y");
        }
    }
    for suffix in ["ing", "edly", "ed", "es"] {
        if let Some(rest) = word.strip_suffix(suffix) {
            if rest.chars().count() >= MIN_ROOT_CHARS {
                return rest.to_string();
            }
        }
    }
    match word.strip_suffix('s') {
        Some(rest) if !rest.ends_with('s') && rest.chars().count() >= MIN_ROOT_CHARS => {
            rest.to_string()
        }
        _ => word.to_string(),
    }
}
