//! pantry-query
//!
//! Turns free-text product queries into structured predicates. See `parser`
//! for the comparison vocabulary and `lexicon` for attribute/category phrases.
pub mod lexicon;
pub mod parser;

pub use lexicon::{Lexicon, Term};
pub use parser::ConstraintParser;
