//! String Matcher - Composable predicates over candidate strings
//!
//! This crate implements small string matchers that can be chained so that a
//! candidate has to satisfy every matcher in the chain, and the search
//! contributions that hand those matchers out to views filtering rows.

mod chain;
mod contribution;
mod matcher;

pub use chain::*;
pub use contribution::*;
pub use matcher::*;
