//! Text editing policies

pub mod fuzzy_replace;

pub use fuzzy_replace::{MatchStrategy, ReplaceError, Replacement, replace};
