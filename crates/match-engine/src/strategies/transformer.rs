//! Rule wrappers

use crate::descriptor::{Descriptor, Fact};
use crate::error::Result;
use crate::game::MatchLength;
use crate::strategy::{Action, Strategy, Turn};

/// Plays a fixed sequence over the last rounds of a match of known length.
///
/// The wrapped rule still decides every round so its state keeps advancing;
/// its answer is simply discarded once the closing sequence takes over. When
/// the length is not known the wrapper is transparent.
#[derive(Clone, Debug)]
pub struct FinalMoves<S> {
    inner: S,
    sequence: Vec<Action>,
    descriptor: Descriptor,
}

impl<S: Strategy> FinalMoves<S> {
    pub fn new(inner: S, sequence: Vec<Action>) -> Self {
        let descriptor = inner.descriptor().clone().uses(Fact::Length);
        Self {
            inner,
            sequence,
            descriptor,
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn sequence(&self) -> &[Action] {
        &self.sequence
    }
}

impl<S: Strategy> Strategy for FinalMoves<S> {
    fn name(&self) -> String {
        let moves: Vec<String> = self.sequence.iter().map(|a| a.to_string()).collect();
        format!("{}: ({})", self.inner.name(), moves.join(", "))
    }

    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn decide(&mut self, turn: &mut Turn<'_>) -> Result<Action> {
        let action = self.inner.decide(turn)?;
        if let MatchLength::Finite(n) = turn.length()? {
            let left = (n as usize).saturating_sub(turn.history().len());
            if left > 0 && left <= self.sequence.len() {
                return Ok(self.sequence[self.sequence.len() - left]);
            }
        }
        Ok(action)
    }

    fn snapshot(&self) -> serde_json::Value {
        self.inner.snapshot()
    }

    fn guards_decision_function(&self) -> bool {
        self.inner.guards_decision_function()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::MemoryDepth;
    use crate::strategies::basic::{Cooperator, Defector, TitForTat};
    use crate::strategies::first_tournament::Shubik;
    use crate::strategies::testing::{plays, versus, versus_with};
    use Action::{Cooperate as C, Defect as D};

    #[test]
    fn test_name_and_descriptor() {
        let rule = FinalMoves::new(TitForTat, vec![D, D]);
        assert_eq!(rule.name(), "Tit For Tat: (D, D)");
        assert!(rule.descriptor().discloses(Fact::Length));
        assert!(!rule.descriptor().discloses(Fact::Game));
        assert_eq!(rule.descriptor().memory_depth, MemoryDepth::Finite(1));
        assert!(!TitForTat.descriptor().discloses(Fact::Length));
    }

    #[test]
    fn test_closing_sequence_replaces_last_rounds() {
        let rule = FinalMoves::new(Cooperator, vec![D, C, D]);
        assert_eq!(versus(rule, Cooperator, 6), plays("CC CC CC DC CC DC"));
    }

    #[test]
    fn test_short_match_plays_sequence_tail() {
        let rule = FinalMoves::new(Cooperator, vec![D, C, D]);
        assert_eq!(versus(rule, Defector, 2), plays("CD DD"));
    }

    #[test]
    fn test_transparent_when_length_unknown() {
        let rule = FinalMoves::new(Cooperator, vec![D, D]);
        let (actions, _) = versus_with(rule, Cooperator, 5, MatchLength::Unknown, 0);
        assert_eq!(actions, plays("CC CC CC CC CC"));
    }

    #[test]
    fn test_inner_state_advances_under_closing_moves() {
        let rule = FinalMoves::new(Shubik::new(), vec![C, C]);
        let (actions, state) = versus_with(rule, Defector, 2, MatchLength::Finite(2), 0);
        assert_eq!(actions, plays("CD CD"));
        // the inner rule still saw the exploitation in round 1
        assert_eq!(state["retaliation_length"], 1);
    }

    #[test]
    fn test_empty_sequence_is_identity() {
        let rule = FinalMoves::new(TitForTat, vec![]);
        assert_eq!(rule.name(), "Tit For Tat: ()");
        assert_eq!(versus(rule, Defector, 3), plays("CD DD DD"));
    }
}
