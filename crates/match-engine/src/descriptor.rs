//! Capability descriptors
//!
//! Every rule carries one immutable `Descriptor` built when the rule is
//! constructed. The match reads it to decide which facts a rule may see and
//! whether it may touch its opponent. Nothing in the engine infers these
//! properties by watching a rule play.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Match-level facts a rule may ask to have disclosed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fact {
    /// The payoff matrix.
    Game,
    /// The total number of rounds.
    Length,
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fact::Game => write!(f, "game"),
            Fact::Length => write!(f, "length"),
        }
    }
}

/// How far back a rule looks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryDepth {
    Finite(u32),
    Unbounded,
}

/// Set of required facts, a subset of {game, length}.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactSet {
    game: bool,
    length: bool,
}

impl FactSet {
    pub const fn empty() -> Self {
        Self { game: false, length: false }
    }

    pub const fn with(self, fact: Fact) -> Self {
        match fact {
            Fact::Game => Self { game: true, ..self },
            Fact::Length => Self { length: true, ..self },
        }
    }

    pub const fn contains(&self, fact: Fact) -> bool {
        match fact {
            Fact::Game => self.game,
            Fact::Length => self.length,
        }
    }

    pub const fn union(self, other: FactSet) -> Self {
        Self {
            game: self.game || other.game,
            length: self.length || other.length,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Fact> + '_ {
        [Fact::Game, Fact::Length]
            .into_iter()
            .filter(move |f| self.contains(*f))
    }

    pub fn is_empty(&self) -> bool {
        !self.game && !self.length
    }
}

/// Static capability metadata for one decision-rule variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub memory_depth: MemoryDepth,
    pub stochastic: bool,
    pub makes_use_of: FactSet,
    /// The rule cannot function at all without a finite, disclosed length.
    pub needs_known_length: bool,
    pub inspects_source: bool,
    pub manipulates_source: bool,
    pub manipulates_state: bool,
}

impl Descriptor {
    pub const fn new(memory_depth: MemoryDepth) -> Self {
        Self {
            memory_depth,
            stochastic: false,
            makes_use_of: FactSet::empty(),
            needs_known_length: false,
            inspects_source: false,
            manipulates_source: false,
            manipulates_state: false,
        }
    }

    pub const fn stochastic(self) -> Self {
        Self { stochastic: true, ..self }
    }

    pub const fn uses(self, fact: Fact) -> Self {
        Self {
            makes_use_of: self.makes_use_of.with(fact),
            ..self
        }
    }

    pub const fn requiring_known_length(self) -> Self {
        Self {
            needs_known_length: true,
            makes_use_of: self.makes_use_of.with(Fact::Length),
            ..self
        }
    }

    pub const fn manipulating_source(self) -> Self {
        Self { manipulates_source: true, ..self }
    }

    pub const fn manipulating_state(self) -> Self {
        Self { manipulates_state: true, ..self }
    }

    pub const fn discloses(&self, fact: Fact) -> bool {
        self.makes_use_of.contains(fact)
    }

    /// Whether the rule is allowed to act on its opponent during its turn.
    pub const fn manipulates(&self) -> bool {
        self.manipulates_source || self.manipulates_state
    }
}
