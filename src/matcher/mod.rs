//! Pattern matching for derived addresses.
//!
//! Rules, in priority order:
//! - Sequential run: one character repeated back to back
//! - Frequent char: one character repeated anywhere
//! - Low diversity: few distinct characters overall

mod pattern;

pub use pattern::{has_frequent_char, has_sequential_run, unique_char_count, MarkerKind, Pattern};
