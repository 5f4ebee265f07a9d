//! Per-player interaction history

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::strategy::Action;

/// Range of rounds a count looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Window {
    All,
    /// The trailing `n` rounds (or fewer if the history is shorter).
    Last(usize),
}

/// Ordered (own, opponent) action pairs, round 1 first.
///
/// Append-only. Only the match round-advance step calls [`History::append`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<(Action, Action)>", into = "Vec<(Action, Action)>")]
pub struct History {
    plays: Vec<(Action, Action)>,
    cooperations: usize,
    defections: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(rounds: usize) -> Self {
        Self {
            plays: Vec::with_capacity(rounds),
            ..Self::default()
        }
    }

    pub(crate) fn append(&mut self, own: Action, opponent: Action) {
        match own {
            Action::Cooperate => self.cooperations += 1,
            Action::Defect => self.defections += 1,
        }
        self.plays.push((own, opponent));
    }

    pub fn len(&self) -> usize {
        self.plays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }

    pub fn plays(&self) -> &[(Action, Action)] {
        &self.plays
    }

    /// Own actions, oldest first.
    pub fn actions(&self) -> impl DoubleEndedIterator<Item = Action> + ExactSizeIterator + '_ {
        self.plays.iter().map(|(own, _)| *own)
    }

    /// Recorded opponent actions, oldest first.
    pub fn opponent_actions(
        &self,
    ) -> impl DoubleEndedIterator<Item = Action> + ExactSizeIterator + '_ {
        self.plays.iter().map(|(_, opp)| *opp)
    }

    /// Point query, 1-based.
    pub fn at(&self, round: usize) -> Result<(Action, Action)> {
        if round == 0 || round > self.plays.len() {
            return Err(EngineError::RoundOutOfRange {
                round,
                len: self.plays.len(),
            });
        }
        Ok(self.plays[round - 1])
    }

    pub fn last(&self) -> Option<(Action, Action)> {
        self.plays.last().copied()
    }

    /// Own action in the previous round.
    pub fn last_action(&self) -> Option<Action> {
        self.plays.last().map(|(own, _)| *own)
    }

    /// Count of `action` among own moves inside `window`.
    pub fn count(&self, action: Action, window: Window) -> usize {
        match window {
            Window::All => match action {
                Action::Cooperate => self.cooperations,
                Action::Defect => self.defections,
            },
            Window::Last(n) => {
                let start = self.plays.len().saturating_sub(n);
                self.plays[start..]
                    .iter()
                    .filter(|(own, _)| *own == action)
                    .count()
            }
        }
    }

    pub fn cooperations(&self) -> usize {
        self.cooperations
    }

    pub fn defections(&self) -> usize {
        self.defections
    }
}

impl From<Vec<(Action, Action)>> for History {
    fn from(plays: Vec<(Action, Action)>) -> Self {
        let mut history = History::with_capacity(plays.len());
        for (own, opp) in plays {
            history.append(own, opp);
        }
        history
    }
}

impl From<History> for Vec<(Action, Action)> {
    fn from(history: History) -> Self {
        history.plays
    }
}
