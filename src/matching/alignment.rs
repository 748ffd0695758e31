//! Pseudo sequence alignment derived from a non-crossing node matching.
//!
//! Matched nodes become aligned columns. Between two consecutive matched
//! pairs, the skipped positions of both sequences are first paired column by
//! column; whatever remains of the longer stretch is aligned against gaps.
//! Positions of a sequence that was not supplied are rendered as `X`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::NodePair;

/// Gap character
pub const GAP: char = '-';

/// Placeholder for a position whose residue is unknown
pub const UNKNOWN: char = 'X';

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AlignmentError {
    #[error("Sequence {which} has {actual} residues but its graph has {expected} nodes")]
    LengthMismatch {
        which: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Pair {pair} does not follow the previous pair in both sequences")]
    Crossing { pair: NodePair },

    #[error("Pair {pair} is out of range for lengths {len_first} and {len_second}")]
    OutOfRange {
        pair: NodePair,
        len_first: usize,
        len_second: usize,
    },
}

/// Two gapped sequences of equal length
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceAlignment {
    pub first: String,
    pub second: String,
}

impl SequenceAlignment {
    /// Build an alignment from matched pairs.
    ///
    /// `pairs` are taken in ascending order of `first`. `seq_first` and
    /// `seq_second`, when given, must have exactly `len_first` and
    /// `len_second` characters.
    ///
    /// # Errors
    ///
    /// Returns `AlignmentError::LengthMismatch` for a sequence of the wrong
    /// length, `AlignmentError::OutOfRange` for a pair beyond the lengths, or
    /// `AlignmentError::Crossing` if the pairs are not strictly increasing in
    /// both coordinates.
    pub fn from_pairs(
        pairs: &[NodePair],
        len_first: usize,
        len_second: usize,
        seq_first: Option<&str>,
        seq_second: Option<&str>,
    ) -> Result<Self, AlignmentError> {
        let first = Residues::new("first", seq_first, len_first)?;
        let second = Residues::new("second", seq_second, len_second)?;

        let mut sorted = pairs.to_vec();
        sorted.sort_unstable();

        let mut builder = Builder {
            first: &first,
            second: &second,
            out_first: String::with_capacity(len_first.max(len_second)),
            out_second: String::with_capacity(len_first.max(len_second)),
        };

        // next unconsumed position in each sequence
        let mut next = (0usize, 0usize);
        for pair in sorted {
            if pair.first >= len_first || pair.second >= len_second {
                return Err(AlignmentError::OutOfRange {
                    pair,
                    len_first,
                    len_second,
                });
            }
            if pair.first < next.0 || pair.second < next.1 {
                return Err(AlignmentError::Crossing { pair });
            }
            builder.fill_between(next.0, pair.first, next.1, pair.second);
            builder.column(Some(pair.first), Some(pair.second));
            next = (pair.first + 1, pair.second + 1);
        }
        builder.fill_between(next.0, len_first, next.1, len_second);

        Ok(Self {
            first: builder.out_first,
            second: builder.out_second,
        })
    }

    /// Number of alignment columns
    pub fn len(&self) -> usize {
        self.first.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_empty()
    }
}

/// Residues of one sequence, or a known length when the sequence is absent
struct Residues {
    chars: Option<Vec<char>>,
}

impl Residues {
    fn new(which: &'static str, seq: Option<&str>, expected: usize) -> Result<Self, AlignmentError> {
        let chars = seq.map(|s| s.chars().collect::<Vec<_>>());
        if let Some(chars) = &chars {
            if chars.len() != expected {
                return Err(AlignmentError::LengthMismatch {
                    which,
                    expected,
                    actual: chars.len(),
                });
            }
        }
        Ok(Self { chars })
    }

    fn at(&self, pos: usize) -> char {
        self.chars.as_ref().map_or(UNKNOWN, |c| c[pos])
    }
}

struct Builder<'a> {
    first: &'a Residues,
    second: &'a Residues,
    out_first: String,
    out_second: String,
}

impl Builder<'_> {
    fn column(&mut self, a: Option<usize>, b: Option<usize>) {
        self.out_first.push(a.map_or(GAP, |p| self.first.at(p)));
        self.out_second.push(b.map_or(GAP, |p| self.second.at(p)));
    }

    /// Align the half-open stretches `beg1..end1` and `beg2..end2`
    fn fill_between(&mut self, beg1: usize, end1: usize, beg2: usize, end2: usize) {
        let len1 = end1.saturating_sub(beg1);
        let len2 = end2.saturating_sub(beg2);
        let paired = len1.min(len2);

        for offset in 0..paired {
            self.column(Some(beg1 + offset), Some(beg2 + offset));
        }
        for offset in paired..len1 {
            self.column(Some(beg1 + offset), None);
        }
        for offset in paired..len2 {
            self.column(None, Some(beg2 + offset));
        }
    }
}
