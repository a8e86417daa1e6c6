use crate::error::MatchError;

/// Boyer-Moore matcher with both the bad-character and the good-suffix heuristic.
///
/// The window is compared right to left. On a mismatch at pattern index `i` against
/// text byte `c` the window moves by `max(good_suffix[i], i - last[c])`, which is
/// always at least 1. After a full match it moves by `good_suffix[0]`, the period of
/// the pattern, so overlapping occurrences are still visited.
#[derive(Debug, Clone)]
pub struct BoyerMoore {
    pattern: Vec<u8>,
    /// Last index of each byte value in the pattern, -1 when absent.
    last: [isize; 256],
    good_suffix: Vec<usize>,
}

impl BoyerMoore {
    pub fn new(pattern: &[u8]) -> Result<Self, MatchError> {
        if pattern.is_empty() {
            return Err(MatchError::EmptyPattern);
        }

        Ok(Self {
            pattern: pattern.to_vec(),
            last: bad_character_table(pattern),
            good_suffix: good_suffix_table(pattern),
        })
    }

    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    pub fn find_all(&self, text: &[u8]) -> Vec<usize> {
        let m = self.pattern.len();
        let n = text.len();
        let mut offsets = Vec::new();
        if n < m {
            return offsets;
        }

        let mut window = 0;
        while window <= n - m {
            let mut i = m as isize - 1;
            while i >= 0 && self.pattern[i as usize] == text[window + i as usize] {
                i -= 1;
            }

            if i < 0 {
                offsets.push(window);
                window += self.good_suffix[0];
            } else {
                let mismatched = text[window + i as usize];
                let bad_char_shift = i - self.last[mismatched as usize];
                let shift = (self.good_suffix[i as usize] as isize).max(bad_char_shift);
                window += shift.max(1) as usize;
            }
        }

        offsets
    }
}

fn bad_character_table(pattern: &[u8]) -> [isize; 256] {
    let mut last = [-1isize; 256];
    for (i, &byte) in pattern.iter().enumerate() {
        last[byte as usize] = i as isize;
    }
    last
}

/// `suffixes[i]` is the length of the longest common suffix of `pattern[..=i]` and
/// the whole pattern.
fn suffixes(pattern: &[u8]) -> Vec<isize> {
    let m = pattern.len() as isize;
    let mut suff = vec![0isize; pattern.len()];
    suff[(m - 1) as usize] = m;

    let mut g = m - 1;
    let mut f = m - 1;
    for i in (0..m - 1).rev() {
        let mirrored = (i + m - 1 - f) as usize;
        if i > g && suff[mirrored] < i - g {
            suff[i as usize] = suff[mirrored];
        } else {
            if i < g {
                g = i;
            }
            f = i;
            while g >= 0 && pattern[g as usize] == pattern[(g + m - 1 - f) as usize] {
                g -= 1;
            }
            suff[i as usize] = f - g;
        }
    }

    suff
}

fn good_suffix_table(pattern: &[u8]) -> Vec<usize> {
    let m = pattern.len();
    let suff = suffixes(pattern);
    let mut shift = vec![m; m];

    // Case 2: a prefix of the pattern matches a suffix of the matched part.
    let mut j = 0;
    for i in (0..m).rev() {
        if suff[i] == i as isize + 1 {
            while j < m - 1 - i {
                if shift[j] == m {
                    shift[j] = m - 1 - i;
                }
                j += 1;
            }
        }
    }

    // Case 1: the matched suffix reoccurs elsewhere in the pattern.
    for i in 0..m.saturating_sub(1) {
        shift[m - 1 - suff[i] as usize] = m - 1 - i;
    }

    shift
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_good_suffix_of_repeated_byte_is_one() {
        let table = good_suffix_table(b"aa");
        assert_eq!(table, vec![1, 2]);
    }

    #[test]
    fn test_good_suffix_textbook_example() {
        // Charras & Lecroq, "Handbook of Exact String Matching", GCAGAGAG.
        let table = good_suffix_table(b"GCAGAGAG");
        assert_eq!(table, vec![7, 7, 7, 2, 7, 4, 7, 1]);
    }

    #[test]
    fn test_bad_character_records_last_occurrence() {
        let last = bad_character_table(b"abcab");
        assert_eq!(last[b'a' as usize], 3);
        assert_eq!(last[b'b' as usize], 4);
        assert_eq!(last[b'c' as usize], 2);
        assert_eq!(last[b'z' as usize], -1);
    }
}
