//! Escalating retaliation bookkeeping
//!
//! Each trigger opens a punishment streak one round longer than the last.
//! Rules that forgive can also ask whether the opponent has earned a fresh
//! start, which wipes the escalation back to zero.

use serde::{Deserialize, Serialize};

use crate::history::History;
use crate::payoff::Game;
use crate::strategy::Action;

/// A fresh start needs more than this many rounds since the previous one
/// (or since the match began).
pub const FRESH_START_COOLDOWN: usize = 20;

/// When a forgiving rule may reset its escalation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreshStartPolicy {
    pub cooldown: usize,
    /// The rule's score must lead the opponent's by at least this.
    pub min_score_lead: i64,
    /// Opponent cooperation rate since the last reset must be at least this.
    pub min_cooperation_rate: f64,
    /// Rounds per block when measuring how steadily the opponent cooperates.
    pub window: usize,
    /// Standard deviation of the opponent's per-block cooperation rate must
    /// not exceed this.
    pub max_cooperation_stddev: f64,
}

impl Default for FreshStartPolicy {
    fn default() -> Self {
        Self {
            cooldown: FRESH_START_COOLDOWN,
            min_score_lead: 10,
            min_cooperation_rate: 0.7,
            window: 5,
            max_cooperation_stddev: 0.25,
        }
    }
}

/// Cooperation rate over `actions`, and the population standard deviation
/// of the rate across consecutive full blocks of `window` rounds.
///
/// None until there are at least two full blocks.
pub fn cooperation_profile(actions: &[Action], window: usize) -> Option<(f64, f64)> {
    if window == 0 || actions.len() < 2 * window {
        return None;
    }
    let rate = |chunk: &[Action]| {
        chunk.iter().filter(|a| **a == Action::Cooperate).count() as f64 / chunk.len() as f64
    };
    let rates: Vec<f64> = actions.chunks_exact(window).map(rate).collect();
    let block_mean = rates.iter().sum::<f64>() / rates.len() as f64;
    let variance =
        rates.iter().map(|r| (r - block_mean).powi(2)).sum::<f64>() / rates.len() as f64;
    Some((rate(actions), variance.sqrt()))
}

/// How much `own` lost last round compared with what the opponent's
/// cooperation would have paid. Positive means the opponent took something.
pub fn scoring_deficit(game: &Game, own: Action, opponent: Action) -> i32 {
    game.score(own, Action::Cooperate).0 - game.score(own, opponent).0
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RetaliationController {
    retaliation_length: u32,
    retaliation_remaining: u32,
    last_fresh_start: usize,
    policy: Option<FreshStartPolicy>,
}

impl RetaliationController {
    /// Escalation only; never grants a fresh start.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fresh_start(policy: FreshStartPolicy) -> Self {
        Self {
            policy: Some(policy),
            ..Self::default()
        }
    }

    pub fn is_retaliating(&self) -> bool {
        self.retaliation_remaining > 0
    }

    pub fn retaliation_length(&self) -> u32 {
        self.retaliation_length
    }

    pub fn retaliation_remaining(&self) -> u32 {
        self.retaliation_remaining
    }

    /// Round of the last fresh start, 0 if none was granted.
    pub fn last_fresh_start(&self) -> usize {
        self.last_fresh_start
    }

    /// Spend one owed punishment round. False when nothing is owed.
    pub fn continue_retaliation(&mut self) -> bool {
        if self.retaliation_remaining == 0 {
            return false;
        }
        self.retaliation_remaining -= 1;
        true
    }

    /// Open a streak one round longer than the previous one. The current
    /// round is the streak's first defection.
    pub fn trigger(&mut self) {
        self.retaliation_length += 1;
        self.retaliation_remaining = self.retaliation_length - 1;
        log::debug!(
            "retaliation escalated to {} rounds",
            self.retaliation_length
        );
    }

    /// Whether the opponent qualifies for a fresh start in `round`.
    ///
    /// `score_lead` is the rule's score minus the opponent's. Only the
    /// opponent's moves since the last reset are profiled.
    pub fn fresh_start_due(
        &self,
        round: usize,
        opponent: &History,
        score_lead: i64,
        length_disclosed: bool,
    ) -> bool {
        let Some(policy) = self.policy else {
            return false;
        };
        if length_disclosed || self.retaliation_length == 0 {
            return false;
        }
        if round.saturating_sub(self.last_fresh_start) <= policy.cooldown {
            return false;
        }
        if score_lead < policy.min_score_lead
            || opponent.last_action() != Some(Action::Cooperate)
        {
            return false;
        }
        let since: Vec<Action> = opponent
            .actions()
            .skip(self.last_fresh_start.saturating_sub(1))
            .collect();
        match cooperation_profile(&since, policy.window) {
            Some((mean, stddev)) => {
                mean >= policy.min_cooperation_rate && stddev <= policy.max_cooperation_stddev
            }
            None => false,
        }
    }

    /// Forget all escalation, recording `round` as the reset point.
    pub fn fresh_start(&mut self, round: usize) {
        self.retaliation_length = 0;
        self.retaliation_remaining = 0;
        self.last_fresh_start = round;
        log::debug!("fresh start granted at round {}", round);
    }
}
