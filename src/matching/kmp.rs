use crate::error::MatchError;

/// Knuth-Morris-Pratt matcher.
///
/// `failure[i]` is the length of the longest proper prefix of `pattern[..=i]` that is
/// also a suffix of it. On a mismatch the scan falls back through this table instead of
/// re-reading text, so every text byte is consumed exactly once.
#[derive(Debug, Clone)]
pub struct Kmp {
    pattern: Vec<u8>,
    failure: Vec<usize>,
}

impl Kmp {
    pub fn new(pattern: &[u8]) -> Result<Self, MatchError> {
        if pattern.is_empty() {
            return Err(MatchError::EmptyPattern);
        }

        Ok(Self {
            pattern: pattern.to_vec(),
            failure: failure_function(pattern),
        })
    }

    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    pub fn failure(&self) -> &[usize] {
        &self.failure
    }

    pub fn find_all(&self, text: &[u8]) -> Vec<usize> {
        let m = self.pattern.len();
        let mut offsets = Vec::new();
        let mut matched = 0;

        for (i, &byte) in text.iter().enumerate() {
            while matched > 0 && byte != self.pattern[matched] {
                matched = self.failure[matched - 1];
            }

            if byte == self.pattern[matched] {
                matched += 1;
            }

            if matched == m {
                offsets.push(i + 1 - m);
                // Keep the border so overlapping occurrences are found.
                matched = self.failure[matched - 1];
            }
        }

        offsets
    }
}

fn failure_function(pattern: &[u8]) -> Vec<usize> {
    let mut failure = vec![0; pattern.len()];
    let mut border = 0;

    for i in 1..pattern.len() {
        while border > 0 && pattern[i] != pattern[border] {
            border = failure[border - 1];
        }

        if pattern[i] == pattern[border] {
            border += 1;
        }

        failure[i] = border;
    }

    failure
}
