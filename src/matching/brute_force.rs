use crate::error::MatchError;

/// Naive matcher: compares the pattern at every alignment.
///
/// Kept as the correctness reference for the other strategies.
#[derive(Debug, Clone)]
pub struct BruteForce {
    pattern: Vec<u8>,
}

impl BruteForce {
    pub fn new(pattern: &[u8]) -> Result<Self, MatchError> {
        if pattern.is_empty() {
            return Err(MatchError::EmptyPattern);
        }

        Ok(Self {
            pattern: pattern.to_vec(),
        })
    }

    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    pub fn find_all(&self, text: &[u8]) -> Vec<usize> {
        let m = self.pattern.len();
        if text.len() < m {
            return Vec::new();
        }

        (0..=text.len() - m)
            .filter(|&i| text[i..i + m] == self.pattern[..])
            .collect()
    }
}
