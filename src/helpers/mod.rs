//! Helper functions for presenting posts

mod date;

pub use date::*;
