//! Last-in-first-out verification worklist.

use crate::domain::CitationPair;

/// Stack of pending pairs, each tagged with its output slot.
///
/// Pairs are pushed in document order, so the citation nearest the end of
/// the document is popped (and verified) first.
#[derive(Debug, Default)]
pub struct VerificationWorklist {
    stack: Vec<(usize, CitationPair)>,
}

impl VerificationWorklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push every pair in order; slot = position in `pairs`.
    pub fn from_pairs(pairs: Vec<CitationPair>) -> Self {
        Self {
            stack: pairs.into_iter().enumerate().collect(),
        }
    }

    pub fn push(&mut self, slot: usize, pair: CitationPair) {
        self.stack.push((slot, pair));
    }

    pub fn pop(&mut self) -> Option<(usize, CitationPair)> {
        self.stack.pop()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

impl Iterator for VerificationWorklist {
    type Item = (usize, CitationPair);

    fn next(&mut self) -> Option<Self::Item> {
        self.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExtractedPattern, PatternType, UnmatchedReason};

    fn pair(i: usize) -> CitationPair {
        let p = ExtractedPattern::new(PatternType::NumericBracket, &format!("[{}]", i + 1), i * 10, i * 10 + 3);
        CitationPair::unmatched(i, p, UnmatchedReason::NoReferenceList)
    }

    #[test]
    fn test_pops_last_pushed_first() {
        let mut list = VerificationWorklist::from_pairs((0..3).map(pair).collect());
        assert_eq!(list.len(), 3);
        let order: Vec<usize> = list.by_ref().map(|(slot, _)| slot).collect();
        assert_eq!(order, vec![2, 1, 0]);
        assert!(list.is_empty());
    }

    #[test]
    fn test_push_after_pop_is_next_out() {
        let mut list = VerificationWorklist::new();
        list.push(0, pair(0));
        list.push(1, pair(1));
        assert_eq!(list.pop().map(|(s, _)| s), Some(1));
        list.push(7, pair(2));
        assert_eq!(list.pop().map(|(s, _)| s), Some(7));
        assert_eq!(list.pop().map(|(s, _)| s), Some(0));
        assert!(list.pop().is_none());
    }
}
