mod language;
mod stopwords;
mod tokenizer;

pub use language::Language;
pub use tokenizer::{Document, Sentence};
