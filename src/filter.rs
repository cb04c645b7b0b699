//! Record filtering module
//!
//! Decides which records are emitted, based on literal substring and regex
//! criteria. Records are opaque bytes, so matching is byte-oriented.

use memchr::memmem;
use regex::bytes::Regex;

/// The full set of match criteria for a run.
///
/// Every criterion is evaluated independently: a record that satisfies K
/// distinct criteria is emitted K times. The inverse flag flips the polarity
/// of each criterion on its own, not of the set as a whole.
#[derive(Debug)]
pub struct FilterSet {
    literals: Vec<Vec<u8>>,
    patterns: Vec<Regex>,
    inverse: bool,
}

impl FilterSet {
    /// Create a new filter set, compiling the regex criteria.
    pub fn new(literals: &[String], patterns: &[String], inverse: bool) -> anyhow::Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| anyhow::anyhow!("Invalid regex pattern '{}': {}", p, e))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self {
            literals: literals.iter().map(|s| s.clone().into_bytes()).collect(),
            patterns,
            inverse,
        })
    }

    /// Count the criteria that independently select this record.
    ///
    /// A literal hits if it occurs as a contiguous subsequence; a regex hits
    /// if it matches anywhere. Each criterion selects the record when
    /// `hit == !inverse`.
    #[inline]
    pub fn match_count(&self, record: &[u8]) -> usize {
        let mut selected = 0;

        for literal in &self.literals {
            if memmem::find(record, literal).is_some() == !self.inverse {
                selected += 1;
            }
        }

        for pattern in &self.patterns {
            if pattern.is_match(record) == !self.inverse {
                selected += 1;
            }
        }

        selected
    }

    /// Total number of criteria in the set.
    pub fn criteria_count(&self) -> usize {
        self.literals.len() + self.patterns.len()
    }

    /// Check if the set holds any criteria at all.
    pub fn has_criteria(&self) -> bool {
        self.criteria_count() > 0
    }

    pub fn inverse(&self) -> bool {
        self.inverse
    }
}

/// Helper to validate a regex pattern before use.
pub fn validate_pattern(pattern: &str) -> anyhow::Result<()> {
    Regex::new(pattern)
        .map_err(|e| anyhow::anyhow!("Invalid regex pattern '{}': {}", pattern, e))?;
    Ok(())
}
