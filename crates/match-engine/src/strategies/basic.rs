//! Reference opponents

use crate::descriptor::{Descriptor, MemoryDepth};
use crate::error::{EngineError, Result};
use crate::strategy::{Action, Strategy, Turn};

static MEMORYLESS: Descriptor = Descriptor::new(MemoryDepth::Finite(0));
static MEMORY_ONE: Descriptor = Descriptor::new(MemoryDepth::Finite(1));
static UNBOUNDED: Descriptor = Descriptor::new(MemoryDepth::Unbounded);
static RANDOM: Descriptor = Descriptor::new(MemoryDepth::Finite(0)).stochastic();

/// Never defects.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cooperator;

impl Strategy for Cooperator {
    fn name(&self) -> String {
        "Cooperator".into()
    }

    fn descriptor(&self) -> &Descriptor {
        &MEMORYLESS
    }

    fn decide(&mut self, _turn: &mut Turn<'_>) -> Result<Action> {
        Ok(Action::Cooperate)
    }
}

/// Never cooperates.
#[derive(Clone, Copy, Debug, Default)]
pub struct Defector;

impl Strategy for Defector {
    fn name(&self) -> String {
        "Defector".into()
    }

    fn descriptor(&self) -> &Descriptor {
        &MEMORYLESS
    }

    fn decide(&mut self, _turn: &mut Turn<'_>) -> Result<Action> {
        Ok(Action::Defect)
    }
}

/// C, D, C, D, ...
#[derive(Clone, Copy, Debug, Default)]
pub struct Alternator;

impl Strategy for Alternator {
    fn name(&self) -> String {
        "Alternator".into()
    }

    fn descriptor(&self) -> &Descriptor {
        &MEMORY_ONE
    }

    fn decide(&mut self, turn: &mut Turn<'_>) -> Result<Action> {
        Ok(match turn.history().last_action() {
            Some(last) => last.flip(),
            None => Action::Cooperate,
        })
    }
}

/// Copy opponent's last move. Start with cooperate.
#[derive(Clone, Copy, Debug, Default)]
pub struct TitForTat;

impl Strategy for TitForTat {
    fn name(&self) -> String {
        "Tit For Tat".into()
    }

    fn descriptor(&self) -> &Descriptor {
        &MEMORY_ONE
    }

    fn decide(&mut self, turn: &mut Turn<'_>) -> Result<Action> {
        Ok(turn.opponent().last_action().unwrap_or(Action::Cooperate))
    }
}

/// Cooperate until opponent defects once, then always defect.
#[derive(Clone, Copy, Debug, Default)]
pub struct Grudger;

impl Strategy for Grudger {
    fn name(&self) -> String {
        "Grudger".into()
    }

    fn descriptor(&self) -> &Descriptor {
        &UNBOUNDED
    }

    fn decide(&mut self, turn: &mut Turn<'_>) -> Result<Action> {
        if turn.opponent().defections() > 0 {
            Ok(Action::Defect)
        } else {
            Ok(Action::Cooperate)
        }
    }
}

/// Plays a fixed sequence, starting over when it runs out.
#[derive(Clone, Debug)]
pub struct Cycler {
    cycle: Vec<Action>,
    descriptor: Descriptor,
}

impl Cycler {
    pub fn new(cycle: Vec<Action>) -> Result<Self> {
        if cycle.is_empty() {
            return Err(EngineError::invalid_parameter("Cycler", "cycle must not be empty"));
        }
        let depth = (cycle.len() - 1) as u32;
        Ok(Self {
            cycle,
            descriptor: Descriptor::new(MemoryDepth::Finite(depth)),
        })
    }

    /// Build from a compact pattern such as `"DDCDD"`.
    pub fn from_pattern(pattern: &str) -> Result<Self> {
        Self::new(Action::parse_sequence(pattern)?)
    }
}

impl Strategy for Cycler {
    fn name(&self) -> String {
        let pattern: String = self.cycle.iter().map(|a| a.to_string()).collect();
        format!("Cycler {}", pattern)
    }

    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn decide(&mut self, turn: &mut Turn<'_>) -> Result<Action> {
        Ok(self.cycle[turn.history().len() % self.cycle.len()])
    }
}

/// Random choice each round with a fixed cooperation probability.
#[derive(Clone, Copy, Debug)]
pub struct RandomPlayer {
    cooperation_probability: f64,
}

impl RandomPlayer {
    pub fn new(cooperation_probability: f64) -> Self {
        Self {
            cooperation_probability: cooperation_probability.clamp(0.0, 1.0),
        }
    }
}

impl Default for RandomPlayer {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Strategy for RandomPlayer {
    fn name(&self) -> String {
        format!("Random: {}", self.cooperation_probability)
    }

    fn descriptor(&self) -> &Descriptor {
        &RANDOM
    }

    fn decide(&mut self, turn: &mut Turn<'_>) -> Result<Action> {
        Ok(turn.random_choice(self.cooperation_probability))
    }
}
