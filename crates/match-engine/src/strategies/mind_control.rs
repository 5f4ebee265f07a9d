//! Rules that cheat by reaching into their opponent
//!
//! All three always defect. They differ in how they make the opponent
//! cooperate: replacing its decision function once, the same but refusing
//! to be replaced in turn, or forcing its action every round.

use serde_json::json;

use crate::descriptor::{Descriptor, MemoryDepth};
use crate::error::Result;
use crate::strategies::basic::Cooperator;
use crate::strategy::{Action, Strategy, Turn};

/// Memory depth is `Finite(0)`: these rules never read a history. Rating
/// tables that give manipulators a negative depth sentinel map it here.
static MANIPULATOR: Descriptor = Descriptor::new(MemoryDepth::Finite(0)).manipulating_source();

/// Replaces the opponent's decision function with unconditional
/// cooperation on its first turn. The replacement persists for the rest of
/// the match.
#[derive(Clone, Copy, Debug, Default)]
pub struct MindController {
    installed: bool,
}

impl MindController {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for MindController {
    fn name(&self) -> String {
        "Mind Controller".into()
    }

    fn descriptor(&self) -> &Descriptor {
        &MANIPULATOR
    }

    fn decide(&mut self, turn: &mut Turn<'_>) -> Result<Action> {
        if !self.installed {
            turn.control()?.override_decision_function(Box::new(Cooperator));
            self.installed = true;
        }
        Ok(Action::Defect)
    }

    fn snapshot(&self) -> serde_json::Value {
        json!({ "installed": self.installed })
    }
}

/// A mind controller whose own decision function cannot be replaced.
#[derive(Clone, Copy, Debug, Default)]
pub struct MindWarper {
    installed: bool,
}

impl MindWarper {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for MindWarper {
    fn name(&self) -> String {
        "Mind Warper".into()
    }

    fn descriptor(&self) -> &Descriptor {
        &MANIPULATOR
    }

    fn decide(&mut self, turn: &mut Turn<'_>) -> Result<Action> {
        if !self.installed {
            turn.control()?.override_decision_function(Box::new(Cooperator));
            self.installed = true;
        }
        Ok(Action::Defect)
    }

    fn snapshot(&self) -> serde_json::Value {
        json!({ "installed": self.installed })
    }

    fn guards_decision_function(&self) -> bool {
        true
    }
}

/// Forces the opponent to cooperate, one round at a time. The opponent's
/// own decision function never runs while this rule is seated against it.
#[derive(Clone, Copy, Debug, Default)]
pub struct MindBender;

impl Strategy for MindBender {
    fn name(&self) -> String {
        "Mind Bender".into()
    }

    fn descriptor(&self) -> &Descriptor {
        &MANIPULATOR
    }

    fn decide(&mut self, turn: &mut Turn<'_>) -> Result<Action> {
        turn.control()?.force_action(Action::Cooperate);
        Ok(Action::Defect)
    }
}
