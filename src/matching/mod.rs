//! Matching Engine Module
//!
//! Exact, case-sensitive substring matching over byte sequences.
//!
//! ## Strategies
//! - **`brute_force`**: Compares the pattern at every alignment. No preprocessing, O(n·m).
//! - **`kmp`**: Knuth-Morris-Pratt. Precomputes the failure function, single text pass, O(n+m).
//! - **`boyer_moore`**: Right-to-left window comparison with bad-character and
//!   good-suffix shifts.
//!
//! All strategies report every match start, overlapping matches included, in ascending
//! order, and reject an empty pattern with `MatchError::EmptyPattern`.
//!
//! A worker picks one `Algorithm` at startup and compiles the query into a `Matcher`
//! once per request; the compiled matcher is then shared read-only by every
//! per-document task.

pub mod boyer_moore;
pub mod brute_force;
pub mod kmp;
pub mod types;

pub use types::{Algorithm, Matcher, UnknownAlgorithm};

/// Converts ascending byte offsets into character (Unicode scalar) positions.
///
/// `byte_offsets` must be sorted and fall on character boundaries of `text`, which is
/// always the case for matches of a UTF-8 pattern inside UTF-8 text.
pub fn byte_to_char_offsets(text: &str, byte_offsets: &[usize]) -> Vec<usize> {
    let mut positions = Vec::with_capacity(byte_offsets.len());
    let mut chars_seen = 0;
    let mut last_byte = 0;

    for &offset in byte_offsets {
        chars_seen += text[last_byte..offset].chars().count();
        last_byte = offset;
        positions.push(chars_seen);
    }

    positions
}
