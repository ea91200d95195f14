use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::text::Language;

const ARABIC_WORDS: &[&str] = &[
    "في", "من", "إلى", "على", "عن", "مع", "هذا", "هذه", "ذلك", "تلك", "هو", "هي", "هم", "هن",
    "أنا", "نحن", "أنت", "أنتم", "الذي", "التي", "الذين", "اللذان", "اللتان", "اللواتي", "ما",
    "ماذا", "لماذا", "كيف", "أين", "متى", "كل", "بعض", "غير", "بين", "حتى", "إذا", "إذ", "لكن",
    "بل", "أو", "أم", "ثم", "و", "ف", "قد", "لقد", "كان", "كانت", "يكون", "تكون", "ليس", "ليست",
    "لم", "لن", "لا", "نعم", "إن", "أن", "إنه", "أنه", "إنها", "أنها", "كما", "عند", "عندما",
    "لدى", "منذ", "خلال", "بعد", "قبل", "حول", "دون", "فوق", "تحت", "أي", "أيضا", "جدا", "فقط",
    "هناك", "هنا", "ذات", "به", "بها", "له", "لها", "لهم", "منه", "منها", "فيه", "فيها", "عليه",
    "عليها", "كذلك", "حيث", "أمام", "وراء", "مثل", "يا", "إلا", "سوف", "هل",
];

const ENGLISH_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
];

pub(crate) static ARABIC: Lazy<HashSet<String>> = Lazy::new(|| build(Language::Arabic, ARABIC_WORDS));
pub(crate) static ENGLISH: Lazy<HashSet<String>> =
    Lazy::new(|| build(Language::English, ENGLISH_WORDS));

fn build(language: Language, words: &[&str]) -> HashSet<String> {
    words.iter().map(|w| language.normalize(w)).collect()
}
