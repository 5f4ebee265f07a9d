//! Decision-rule contract
//!
//! A rule is any type implementing [`Strategy`]. Each round the match builds
//! a [`Turn`] for it: its own history, a read-only view of the opponent, the
//! facts its descriptor asked for, the shared random stream and, for
//! manipulators only, an [`OpponentControl`] handle.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::descriptor::{Descriptor, Fact};
use crate::error::{EngineError, Result};
use crate::game::MatchLength;
use crate::history::History;
use crate::payoff::Game;
use crate::random::SeededRng;

/// A move in the Prisoner's Dilemma
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Cooperate,
    Defect,
}

impl Action {
    pub fn flip(self) -> Self {
        match self {
            Action::Cooperate => Action::Defect,
            Action::Defect => Action::Cooperate,
        }
    }

    /// Parse a compact pattern such as `"DDCDD"`.
    pub fn parse_sequence(pattern: &str) -> Result<Vec<Action>> {
        pattern
            .chars()
            .map(|c| match c {
                'C' | 'c' => Ok(Action::Cooperate),
                'D' | 'd' => Ok(Action::Defect),
                other => Err(EngineError::InvalidConfig(format!(
                    "unexpected character {:?} in action pattern",
                    other
                ))),
            })
            .collect()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Cooperate => write!(f, "C"),
            Action::Defect => write!(f, "D"),
        }
    }
}

/// A decision rule.
///
/// `decide` may mutate the rule's own state. It must not reach the opponent
/// except through [`Turn::control`], which only manipulator descriptors get.
pub trait Strategy: Send {
    /// Display name, including parameters where they matter.
    fn name(&self) -> String;

    fn descriptor(&self) -> &Descriptor;

    fn decide(&mut self, turn: &mut Turn<'_>) -> Result<Action>;

    /// Private state as a JSON object, for reporting.
    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::Object(serde_json::Map::new())
    }

    /// Rules returning true refuse to have their decision function replaced.
    fn guards_decision_function(&self) -> bool {
        false
    }
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn descriptor(&self) -> &Descriptor {
        (**self).descriptor()
    }

    fn decide(&mut self, turn: &mut Turn<'_>) -> Result<Action> {
        (**self).decide(turn)
    }

    fn snapshot(&self) -> serde_json::Value {
        (**self).snapshot()
    }

    fn guards_decision_function(&self) -> bool {
        (**self).guards_decision_function()
    }
}

/// Side effects a manipulator asks for during its turn.
///
/// The match applies them to the opponent before the opponent's own turn in
/// the same round.
#[derive(Default)]
pub struct OpponentControl {
    forced: Option<Action>,
    replacement: Option<Box<dyn Strategy>>,
}

impl OpponentControl {
    /// Fix the opponent's action for the current round.
    pub fn force_action(&mut self, action: Action) {
        self.forced = Some(action);
    }

    /// Replace the opponent's decision function for the rest of the match.
    pub fn override_decision_function(&mut self, rule: Box<dyn Strategy>) {
        self.replacement = Some(rule);
    }

    pub(crate) fn take(&mut self) -> (Option<Action>, Option<Box<dyn Strategy>>) {
        (self.forced.take(), self.replacement.take())
    }
}

/// Everything a rule may see while deciding one round.
pub struct Turn<'a> {
    rule: &'a str,
    own: &'a History,
    opponent: &'a History,
    game: Option<&'a Game>,
    length: Option<MatchLength>,
    rng: &'a mut SeededRng,
    control: Option<&'a mut OpponentControl>,
}

impl<'a> Turn<'a> {
    pub(crate) fn new(
        rule: &'a str,
        own: &'a History,
        opponent: &'a History,
        game: Option<&'a Game>,
        length: Option<MatchLength>,
        rng: &'a mut SeededRng,
        control: Option<&'a mut OpponentControl>,
    ) -> Self {
        Self { rule, own, opponent, game, length, rng, control }
    }

    /// This rule's own history.
    pub fn history(&self) -> &History {
        self.own
    }

    /// The opponent's history, from the opponent's point of view.
    pub fn opponent(&self) -> &History {
        self.opponent
    }

    /// 1-based number of the round being decided.
    pub fn round(&self) -> usize {
        self.own.len() + 1
    }

    pub fn game(&self) -> Result<&Game> {
        self.game.ok_or_else(|| EngineError::UndisclosedFact {
            rule: self.rule.to_string(),
            fact: Fact::Game,
        })
    }

    pub fn length(&self) -> Result<MatchLength> {
        self.length.ok_or_else(|| EngineError::UndisclosedFact {
            rule: self.rule.to_string(),
            fact: Fact::Length,
        })
    }

    pub fn rng(&mut self) -> &mut SeededRng {
        self.rng
    }

    /// Cooperate with probability `p`. Certain outcomes do not consume a draw.
    pub fn random_choice(&mut self, p: f64) -> Action {
        if p <= 0.0 {
            return Action::Defect;
        }
        if p >= 1.0 {
            return Action::Cooperate;
        }
        if self.rng.next_f64() < p {
            Action::Cooperate
        } else {
            Action::Defect
        }
    }

    pub fn control(&mut self) -> Result<&mut OpponentControl> {
        let rule = self.rule;
        self.control
            .as_deref_mut()
            .ok_or_else(|| EngineError::ManipulationDenied { rule: rule.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip() {
        assert_eq!(Action::Cooperate.flip(), Action::Defect);
        assert_eq!(Action::Defect.flip(), Action::Cooperate);
    }

    #[test]
    fn test_parse_sequence() {
        let seq = Action::parse_sequence("DDcD").unwrap();
        assert_eq!(
            seq,
            vec![Action::Defect, Action::Defect, Action::Cooperate, Action::Defect]
        );
        assert!(Action::parse_sequence("CX").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}{}", Action::Cooperate, Action::Defect), "CD");
    }

    #[test]
    fn test_undeclared_facts_are_errors() {
        let own = History::new();
        let opp = History::new();
        let mut rng = SeededRng::from_u64(1);
        let turn = Turn::new("Peeker", &own, &opp, None, None, &mut rng, None);

        assert_eq!(
            turn.game().unwrap_err(),
            EngineError::UndisclosedFact { rule: "Peeker".into(), fact: Fact::Game }
        );
        assert_eq!(
            turn.length().unwrap_err(),
            EngineError::UndisclosedFact { rule: "Peeker".into(), fact: Fact::Length }
        );
        assert_eq!(turn.round(), 1);
    }

    #[test]
    fn test_control_denied_without_handle() {
        let own = History::new();
        let opp = History::new();
        let mut rng = SeededRng::from_u64(1);
        let mut turn = Turn::new("Peeker", &own, &opp, None, None, &mut rng, None);
        assert!(matches!(
            turn.control(),
            Err(EngineError::ManipulationDenied { .. })
        ));
    }

    #[test]
    fn test_random_choice_extremes_do_not_draw() {
        let own = History::new();
        let opp = History::new();
        let mut rng = SeededRng::from_u64(9);
        let mut reference = rng.clone();
        {
            let mut turn = Turn::new("Peeker", &own, &opp, None, None, &mut rng, None);
            assert_eq!(turn.random_choice(0.0), Action::Defect);
            assert_eq!(turn.random_choice(1.0), Action::Cooperate);
        }
        assert_eq!(rng.next_u64(), reference.next_u64());
    }
}
