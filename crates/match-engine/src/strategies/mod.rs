//! Decision-rule catalogue

pub mod basic;
pub mod first_tournament;
pub mod mind_control;
pub mod transformer;

#[cfg(test)]
pub(crate) mod testing {
    use crate::game::{Match, MatchConfig, MatchLength, Seat};
    use crate::strategy::{Action, Strategy};

    /// Parse `"CC CD DC"` into (own, opponent) pairs.
    pub fn plays(spec: &str) -> Vec<(Action, Action)> {
        spec.split_whitespace()
            .map(|pair| {
                let moves = Action::parse_sequence(pair).unwrap();
                assert_eq!(moves.len(), 2, "bad pair {:?}", pair);
                (moves[0], moves[1])
            })
            .collect()
    }

    /// Play `turns` rounds in a match whose length equals `turns`.
    pub fn versus(
        rule: impl Strategy + 'static,
        opponent: impl Strategy + 'static,
        turns: u32,
    ) -> Vec<(Action, Action)> {
        versus_with(rule, opponent, turns, MatchLength::Finite(turns), 0).0
    }

    /// Play `turns` rounds with an explicit length and seed. Returns the
    /// actions and the first rule's state snapshot.
    pub fn versus_with(
        rule: impl Strategy + 'static,
        opponent: impl Strategy + 'static,
        turns: u32,
        length: MatchLength,
        seed: u64,
    ) -> (Vec<(Action, Action)>, serde_json::Value) {
        let mut seed_bytes = [0u8; 32];
        seed_bytes[..8].copy_from_slice(&seed.to_le_bytes());
        let config = MatchConfig::new(length).with_seed(seed_bytes, 0);
        let mut m = Match::new(Box::new(rule), Box::new(opponent), config).unwrap();
        m.play_rounds(turns).unwrap();
        let actions = m.result().actions();
        (actions, m.player(Seat::A).snapshot())
    }
}
