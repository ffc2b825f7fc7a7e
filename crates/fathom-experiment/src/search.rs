//! Combination search over occurrence indices.
//!
//! [`CombinationSearch`] is a pure state machine: it proposes the candidate
//! combinations of each round and learns from recorded outcomes. It never
//! rewrites files or runs policies itself.
//!
//! Rounds proceed as follows:
//!
//! 1. Every occurrence is proposed on its own.
//! 2. The union of every accepted singleton is proposed once. Acceptance
//!    ends the search.
//! 3. From then on, every unordered pair of active units is merged, skipping
//!    unions already known to pass or fail. An accepted union becomes a unit
//!    and retires the units it contains. The search ends when a round has no
//!    new union to propose.

use std::collections::BTreeSet;

use crate::error::SearchError;

/// A set of 1-based occurrence indices rewritten together.
pub type Combination = BTreeSet<usize>;

/// Default ceiling on the number of candidates in one round.
pub const DEFAULT_MAX_COMBINATIONS: usize = 1000;

/// The candidates proposed for one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    number: usize,
    candidates: Vec<Combination>,
}

impl Round {
    /// Returns the 1-based round number.
    #[must_use]
    pub const fn number(&self) -> usize {
        self.number
    }

    /// Returns the proposed combinations in test order.
    #[must_use]
    pub fn candidates(&self) -> &[Combination] {
        &self.candidates
    }

    /// Returns whether the round proposes nothing, ending the search.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Greedy pairwise-coalescing search for a jointly accepted combination.
#[derive(Debug, Clone)]
pub struct CombinationSearch {
    occurrences: usize,
    max_combinations: usize,
    round: usize,
    ok_fragments: Vec<Combination>,
    failed_combinations: BTreeSet<Combination>,
    active: Vec<Combination>,
    finished: bool,
}

impl CombinationSearch {
    /// Creates a search over occurrences `1..=occurrences`.
    #[must_use]
    pub const fn new(occurrences: usize, max_combinations: usize) -> Self {
        Self {
            occurrences,
            max_combinations,
            round: 0,
            ok_fragments: Vec::new(),
            failed_combinations: BTreeSet::new(),
            active: Vec::new(),
            finished: false,
        }
    }

    /// Proposes the next round of candidates.
    ///
    /// An empty round means the search has reached its fixed point.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::CombinationBudgetExceeded`] when the round
    /// would propose more than the configured maximum. The search is then
    /// finished.
    pub fn next_round(&mut self) -> Result<Round, SearchError> {
        if self.finished {
            return Ok(self.empty_round());
        }
        self.round = self.round.saturating_add(1);
        let candidates = match self.round {
            1 => (1..=self.occurrences).map(|index| Combination::from([index])).collect(),
            2 => self.full_merge(),
            _ => self.pairwise_unions(),
        };
        if candidates.len() > self.max_combinations {
            self.finished = true;
            return Err(SearchError::CombinationBudgetExceeded {
                round: self.round,
                proposed: candidates.len(),
                limit: self.max_combinations,
            });
        }
        if candidates.is_empty() {
            self.finished = true;
        }
        Ok(Round {
            number: self.round,
            candidates,
        })
    }

    /// Records whether the policy accepted `candidate`.
    pub fn record(&mut self, candidate: &Combination, passed: bool) {
        if !passed {
            self.failed_combinations.insert(candidate.clone());
            return;
        }
        self.ok_fragments.push(candidate.clone());
        match self.round {
            1 => self.active.push(candidate.clone()),
            2 => self.finished = true,
            _ => {
                self.active.retain(|unit| !unit.is_subset(candidate));
                self.active.push(candidate.clone());
            }
        }
    }

    /// Returns the largest accepted fragment, preferring the most recent on
    /// ties.
    #[must_use]
    pub fn best(&self) -> Option<&Combination> {
        self.ok_fragments
            .iter()
            .rev()
            .fold(None, |best: Option<&Combination>, fragment| match best {
                Some(current) if current.len() >= fragment.len() => Some(current),
                _ => Some(fragment),
            })
    }

    /// Returns the current round number; zero before the first round.
    #[must_use]
    pub const fn round(&self) -> usize {
        self.round
    }

    /// Returns whether the search has stopped proposing candidates.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns every accepted combination in acceptance order.
    #[must_use]
    pub fn ok_fragments(&self) -> &[Combination] {
        &self.ok_fragments
    }

    /// Returns every rejected combination.
    #[must_use]
    pub const fn failed_combinations(&self) -> &BTreeSet<Combination> {
        &self.failed_combinations
    }

    fn empty_round(&self) -> Round {
        Round {
            number: self.round,
            candidates: Vec::new(),
        }
    }

    fn full_merge(&self) -> Vec<Combination> {
        if self.active.len() < 2 {
            return Vec::new();
        }
        let merged: Combination = self.active.iter().flatten().copied().collect();
        if self.is_known(&merged) {
            return Vec::new();
        }
        vec![merged]
    }

    fn pairwise_unions(&self) -> Vec<Combination> {
        let mut seen = BTreeSet::new();
        let mut candidates = Vec::new();
        for (position, left) in self.active.iter().enumerate() {
            for right in self.active.iter().skip(position.saturating_add(1)) {
                let union: Combination = left.union(right).copied().collect();
                if self.is_known(&union) || !seen.insert(union.clone()) {
                    continue;
                }
                candidates.push(union);
            }
        }
        candidates
    }

    fn is_known(&self, combination: &Combination) -> bool {
        self.failed_combinations.contains(combination)
            || self.ok_fragments.iter().any(|fragment| fragment == combination)
    }
}

/// Formats a combination as `1_3_5`, for naming candidate files.
#[must_use]
pub fn combination_label(combination: &Combination) -> String {
    combination
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("_")
}
