//! Payoff matrix

use serde::{Deserialize, Serialize};

use crate::strategy::Action;

/// Payoff matrix for one match.
///
/// `table[own][opponent]` holds `(own_score, opponent_score)`, indexed with
/// Cooperate = 0 and Defect = 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    table: [[(i32, i32); 2]; 2],
}

fn index(action: Action) -> usize {
    match action {
        Action::Cooperate => 0,
        Action::Defect => 1,
    }
}

impl Game {
    /// Symmetric game from the reward, sucker, temptation and punishment
    /// payoffs.
    pub const fn new(r: i32, s: i32, t: i32, p: i32) -> Self {
        Self {
            table: [[(r, r), (s, t)], [(t, s), (p, p)]],
        }
    }

    /// Arbitrary matrix, one entry per (own, opponent) pair.
    pub const fn from_table(
        cc: (i32, i32),
        cd: (i32, i32),
        dc: (i32, i32),
        dd: (i32, i32),
    ) -> Self {
        Self {
            table: [[cc, cd], [dc, dd]],
        }
    }

    /// Returns (own_score, opponent_score)
    pub fn score(&self, own: Action, opponent: Action) -> (i32, i32) {
        self.table[index(own)][index(opponent)]
    }

    /// The same game seen from the column player's seat.
    pub fn transposed(&self) -> Self {
        let swap = |(a, b): (i32, i32)| (b, a);
        Self {
            table: [
                [swap(self.table[0][0]), swap(self.table[1][0])],
                [swap(self.table[0][1]), swap(self.table[1][1])],
            ],
        }
    }

    /// Row player's (R, P, S, T).
    pub fn rpst(&self) -> (i32, i32, i32, i32) {
        (
            self.table[0][0].0,
            self.table[1][1].0,
            self.table[0][1].0,
            self.table[1][0].0,
        )
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new(3, 0, 5, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Action::{Cooperate as C, Defect as D};

    #[test]
    fn test_default_payoff_matrix() {
        let game = Game::default();
        assert_eq!(game.score(C, C), (3, 3));
        assert_eq!(game.score(C, D), (0, 5));
        assert_eq!(game.score(D, C), (5, 0));
        assert_eq!(game.score(D, D), (1, 1));
    }

    #[test]
    fn test_rpst() {
        assert_eq!(Game::default().rpst(), (3, 1, 0, 5));
        assert_eq!(Game::new(4, -1, 6, 0).rpst(), (4, 0, -1, 6));
    }

    #[test]
    fn test_asymmetric_table() {
        let game = Game::from_table((2, 1), (0, 3), (4, 0), (1, 2));
        assert_eq!(game.score(C, C), (2, 1));
        assert_eq!(game.score(D, D), (1, 2));
        assert_eq!(game.score(D, C), (4, 0));
    }

    #[test]
    fn test_transposed_swaps_seats() {
        let game = Game::from_table((2, 1), (0, 3), (4, 0), (1, 2));
        let seen_by_b = game.transposed();
        for own in [C, D] {
            for opp in [C, D] {
                let (a, b) = game.score(own, opp);
                assert_eq!(seen_by_b.score(opp, own), (b, a));
            }
        }
        assert_eq!(Game::default().transposed(), Game::default());
    }
}
