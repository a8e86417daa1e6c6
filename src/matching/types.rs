use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::boyer_moore::BoyerMoore;
use super::brute_force::BruteForce;
use super::kmp::Kmp;
use crate::error::MatchError;

/// The closed set of matching strategies a worker can run.
///
/// Selected once per worker process. Requests may name an algorithm, but only to
/// validate it against the configured one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    BruteForce,
    BoyerMoore,
    Kmp,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::BruteForce, Algorithm::BoyerMoore, Algorithm::Kmp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::BruteForce => "brute-force",
            Algorithm::BoyerMoore => "boyer-moore",
            Algorithm::Kmp => "kmp",
        }
    }

    /// Preprocesses `pattern` for this strategy.
    pub fn compile(self, pattern: &[u8]) -> Result<Matcher, MatchError> {
        Ok(match self {
            Algorithm::BruteForce => Matcher::BruteForce(BruteForce::new(pattern)?),
            Algorithm::BoyerMoore => Matcher::BoyerMoore(BoyerMoore::new(pattern)?),
            Algorithm::Kmp => Matcher::Kmp(Kmp::new(pattern)?),
        })
    }

    /// One-shot search: compile and scan a single text.
    pub fn search(self, text: &[u8], pattern: &[u8]) -> Result<Vec<usize>, MatchError> {
        Ok(self.compile(pattern)?.find_all(text))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown search algorithm '{0}' (expected brute-force, boyer-moore or kmp)")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "brute-force" | "bruteforce" => Ok(Algorithm::BruteForce),
            "boyer-moore" | "boyermoore" => Ok(Algorithm::BoyerMoore),
            "kmp" | "knuth-morris-pratt" => Ok(Algorithm::Kmp),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

/// A pattern preprocessed for one strategy.
///
/// `Matcher` is immutable after construction and is `Sync`, so a single instance is
/// shared by all per-document tasks of a query.
#[derive(Debug, Clone)]
pub enum Matcher {
    BruteForce(BruteForce),
    BoyerMoore(BoyerMoore),
    Kmp(Kmp),
}

impl Matcher {
    /// Every match start in `text`, ascending, overlapping matches included.
    pub fn find_all(&self, text: &[u8]) -> Vec<usize> {
        match self {
            Matcher::BruteForce(m) => m.find_all(text),
            Matcher::BoyerMoore(m) => m.find_all(text),
            Matcher::Kmp(m) => m.find_all(text),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            Matcher::BruteForce(_) => Algorithm::BruteForce,
            Matcher::BoyerMoore(_) => Algorithm::BoyerMoore,
            Matcher::Kmp(_) => Algorithm::Kmp,
        }
    }

    pub fn pattern(&self) -> &[u8] {
        match self {
            Matcher::BruteForce(m) => m.pattern(),
            Matcher::BoyerMoore(m) => m.pattern(),
            Matcher::Kmp(m) => m.pattern(),
        }
    }
}
