//! Match Engine for the iterated Prisoner's Dilemma
//!
//! Deterministic, seedable matches between decision rules, including the
//! entries of the first tournament. This crate is compiled to:
//! - Native (for batch runs and tests)
//! - WASM (for frontend match replay, behind the `wasm` feature)

mod descriptor;
mod detector;
mod error;
mod game;
mod history;
mod payoff;
mod random;
mod retaliation;
mod strategy;

pub mod catalog;
pub mod strategies;

#[cfg(feature = "wasm")]
mod wasm;

pub use catalog::{RuleInfo, RuleSpec};
pub use descriptor::{Descriptor, Fact, FactSet, MemoryDepth};
pub use detector::{RandomnessDetector, DEFAULT_ALPHA, MIN_SAMPLES};
pub use error::{EngineError, Result};
pub use game::{
    run_match, Match, MatchConfig, MatchLength, MatchResult, MatchState, Player, RoundResult, Seat,
};
pub use history::{History, Window};
pub use payoff::Game;
pub use random::SeededRng;
pub use retaliation::{
    cooperation_profile, scoring_deficit, FreshStartPolicy, RetaliationController,
    FRESH_START_COOLDOWN,
};
pub use strategy::{Action, OpponentControl, Strategy, Turn};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_payoffs() {
        use Action::{Cooperate as C, Defect as D};
        let game = Game::default();
        assert_eq!(game.score(C, C), (3, 3));
        assert_eq!(game.score(C, D), (0, 5));
        assert_eq!(game.score(D, C), (5, 0));
        assert_eq!(game.score(D, D), (1, 1));
    }

    #[test]
    fn test_replay_from_json_specs() {
        let a = RuleSpec::from_json(r#"{"base": "TidemanAndChieruzzi"}"#).unwrap();
        let b = RuleSpec::from_json(r#"{"base": "Cycler", "pattern": "DC"}"#).unwrap();
        let config = MatchConfig::finite(10);
        let result = run_match(a.build().unwrap(), b.build().unwrap(), config.clone()).unwrap();
        let again = run_match(a.build().unwrap(), b.build().unwrap(), config).unwrap();
        assert_eq!(result, again);
        assert_eq!(result.round_count, 10);

        let json = serde_json::to_string(&result).unwrap();
        let back: MatchResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
