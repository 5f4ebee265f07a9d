//! Match execution engine

use serde::{Deserialize, Serialize};

use crate::descriptor::{Descriptor, Fact};
use crate::error::{EngineError, Result};
use crate::history::History;
use crate::payoff::Game;
use crate::random::SeededRng;
use crate::strategy::{Action, OpponentControl, Strategy, Turn};

/// Total number of rounds, or the explicit "not known" sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchLength {
    Finite(u32),
    Unknown,
}

impl MatchLength {
    pub fn turns(&self) -> Option<u32> {
        match self {
            MatchLength::Finite(n) => Some(*n),
            MatchLength::Unknown => None,
        }
    }
}

/// Which side of the match a player sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Seat {
    A,
    B,
}

impl Seat {
    fn index(self) -> usize {
        match self {
            Seat::A => 0,
            Seat::B => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchState {
    NotStarted,
    /// `round` is the last round that was played.
    Running { round: u32 },
    Completed,
    /// A finite match the caller stopped before its last round.
    Stopped { round: u32 },
    Aborted,
}

/// Upper bound on the rounds reserved up front; longer matches grow as
/// they are played.
const PREALLOCATED_ROUNDS: usize = 1024;

/// Immutable configuration of one match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub length: MatchLength,
    pub game: Game,
    pub seed: [u8; 32],
    /// Selects an independent stream from the same seed.
    pub stream: u32,
}

impl MatchConfig {
    pub fn new(length: MatchLength) -> Self {
        Self {
            length,
            game: Game::default(),
            seed: [0u8; 32],
            stream: 0,
        }
    }

    pub fn finite(turns: u32) -> Self {
        Self::new(MatchLength::Finite(turns))
    }

    pub fn unknown() -> Self {
        Self::new(MatchLength::Unknown)
    }

    pub fn with_seed(self, seed: [u8; 32], stream: u32) -> Self {
        Self { seed, stream, ..self }
    }

    pub fn with_game(self, game: Game) -> Self {
        Self { game, ..self }
    }
}

/// Result of a single round
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: u32,
    pub action_a: Action,
    pub action_b: Action,
    pub score_a: i32,
    pub score_b: i32,
    pub cumulative_a: i64,
    pub cumulative_b: i64,
}

/// Result of a complete match
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub rounds: Vec<RoundResult>,
    pub total_score_a: i64,
    pub total_score_b: i64,
    pub round_count: u32,
}

impl MatchResult {
    /// (A's action, B's action) per round.
    pub fn actions(&self) -> Vec<(Action, Action)> {
        self.rounds.iter().map(|r| (r.action_a, r.action_b)).collect()
    }
}

/// A seated rule with its history.
pub struct Player {
    rule: Box<dyn Strategy>,
    name: String,
    descriptor: Descriptor,
    history: History,
    takeover: Option<Box<dyn Strategy>>,
}

impl Player {
    fn new(rule: Box<dyn Strategy>, capacity: usize) -> Self {
        Self {
            name: rule.name(),
            descriptor: rule.descriptor().clone(),
            rule,
            history: History::with_capacity(capacity),
            takeover: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// State of the seated rule (not of an overriding one).
    pub fn snapshot(&self) -> serde_json::Value {
        self.rule.snapshot()
    }

    /// True once an opponent replaced this player's decision function.
    pub fn is_overridden(&self) -> bool {
        self.takeover.is_some()
    }

    fn decide(
        &mut self,
        opponent: &History,
        game: Option<&Game>,
        length: Option<MatchLength>,
        rng: &mut SeededRng,
        control: Option<&mut OpponentControl>,
    ) -> Result<Action> {
        let mut turn = Turn::new(&self.name, &self.history, opponent, game, length, rng, control);
        match self.takeover.as_mut() {
            Some(rule) => rule.decide(&mut turn),
            None => self.rule.decide(&mut turn),
        }
    }

    fn take_over(&mut self, rule: Box<dyn Strategy>) {
        if self.rule.guards_decision_function() {
            log::debug!("{} refused an override of its decision function", self.name);
            return;
        }
        log::debug!("{} now plays as {}", self.name, rule.name());
        self.takeover = Some(rule);
    }
}

/// One repeated game between two rules.
///
/// `NotStarted -> Running -> Completed`, `Stopped` when the caller ends a
/// finite match early, or `Aborted` after any failed round. Histories only
/// ever grow by whole rounds.
pub struct Match {
    players: [Player; 2],
    config: MatchConfig,
    /// Payoff matrix as seen from each seat.
    views: [Game; 2],
    rng: SeededRng,
    state: MatchState,
    rounds: Vec<RoundResult>,
    total_a: i64,
    total_b: i64,
}

impl Match {
    /// Validate the configuration and seat both rules.
    pub fn new(
        rule_a: Box<dyn Strategy>,
        rule_b: Box<dyn Strategy>,
        config: MatchConfig,
    ) -> Result<Self> {
        if config.length == MatchLength::Finite(0) {
            return Err(EngineError::InvalidLength);
        }
        for rule in [&rule_a, &rule_b] {
            if rule.descriptor().needs_known_length && config.length == MatchLength::Unknown {
                return Err(EngineError::KnownLengthRequired { rule: rule.name() });
            }
        }

        let capacity = (config.length.turns().unwrap_or(0) as usize).min(PREALLOCATED_ROUNDS);
        let rng = SeededRng::new(&config.seed, config.stream);
        let views = [config.game, config.game.transposed()];

        Ok(Self {
            players: [Player::new(rule_a, capacity), Player::new(rule_b, capacity)],
            views,
            rng,
            state: MatchState::NotStarted,
            rounds: Vec::with_capacity(capacity),
            total_a: 0,
            total_b: 0,
            config,
        })
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn player(&self, seat: Seat) -> &Player {
        &self.players[seat.index()]
    }

    pub fn history(&self, seat: Seat) -> &History {
        &self.players[seat.index()].history
    }

    pub fn rounds(&self) -> &[RoundResult] {
        &self.rounds
    }

    pub fn scores(&self) -> (i64, i64) {
        (self.total_a, self.total_b)
    }

    /// Play the next round.
    pub fn play_round(&mut self) -> Result<RoundResult> {
        match self.state {
            MatchState::Completed => {
                return Err(EngineError::MatchFinished { rounds: self.rounds.len() })
            }
            MatchState::Stopped { round } => {
                return Err(EngineError::MatchStopped { rounds: round as usize })
            }
            MatchState::Aborted => return Err(EngineError::MatchAborted),
            MatchState::NotStarted => log::info!(
                "match started: {} vs {} ({:?})",
                self.players[0].name,
                self.players[1].name,
                self.config.length
            ),
            MatchState::Running { .. } => {}
        }

        let round = self.rounds.len() as u32 + 1;
        let (action_a, action_b) = match self.decide_round() {
            Ok(actions) => actions,
            Err(err) => {
                log::warn!("match aborted in round {}: {}", round, err);
                self.state = MatchState::Aborted;
                return Err(err);
            }
        };

        self.players[0].history.append(action_a, action_b);
        self.players[1].history.append(action_b, action_a);

        let (score_a, score_b) = self.config.game.score(action_a, action_b);
        self.total_a += score_a as i64;
        self.total_b += score_b as i64;

        let result = RoundResult {
            round,
            action_a,
            action_b,
            score_a,
            score_b,
            cumulative_a: self.total_a,
            cumulative_b: self.total_b,
        };
        log::debug!(
            "round {}: {}{} -> ({}, {})",
            round,
            action_a,
            action_b,
            score_a,
            score_b
        );
        self.rounds.push(result.clone());

        self.state = if self.config.length == MatchLength::Finite(round) {
            log::info!(
                "match completed after {} rounds: {} - {}",
                round,
                self.total_a,
                self.total_b
            );
            MatchState::Completed
        } else {
            MatchState::Running { round }
        };

        Ok(result)
    }

    /// Play up to `n` more rounds, stopping early if the match completes.
    pub fn play_rounds(&mut self, n: u32) -> Result<()> {
        for _ in 0..n {
            if self.state == MatchState::Completed {
                break;
            }
            self.play_round()?;
        }
        Ok(())
    }

    /// Play a finite match to the end.
    pub fn play(&mut self) -> Result<MatchResult> {
        if self.config.length == MatchLength::Unknown {
            return Err(EngineError::UnboundedMatch);
        }
        while self.state != MatchState::Completed {
            self.play_round()?;
        }
        Ok(self.result())
    }

    /// Stop requesting rounds and return what was played.
    ///
    /// An unknown-length match ends here as `Completed`. A finite match
    /// stopped before its last round becomes `Stopped` instead; a finished
    /// one is unaffected.
    pub fn finish(&mut self) -> Result<MatchResult> {
        match self.state {
            MatchState::Aborted => return Err(EngineError::MatchAborted),
            MatchState::Completed | MatchState::Stopped { .. } => {}
            MatchState::NotStarted | MatchState::Running { .. } => {
                let round = self.rounds.len() as u32;
                self.state = match self.config.length {
                    MatchLength::Unknown => MatchState::Completed,
                    MatchLength::Finite(n) => {
                        log::info!("match stopped after {} of {} rounds", round, n);
                        MatchState::Stopped { round }
                    }
                };
            }
        }
        Ok(self.result())
    }

    pub fn result(&self) -> MatchResult {
        MatchResult {
            rounds: self.rounds.clone(),
            total_score_a: self.total_a,
            total_score_b: self.total_b,
            round_count: self.rounds.len() as u32,
        }
    }

    /// Manipulators move first so their effect lands before the victim
    /// decides. Otherwise, and when both manipulate, A leads.
    fn turn_order(&self) -> (Seat, Seat) {
        let a = self.players[0].descriptor.manipulates();
        let b = self.players[1].descriptor.manipulates();
        if b && !a {
            (Seat::B, Seat::A)
        } else {
            (Seat::A, Seat::B)
        }
    }

    fn decide_round(&mut self) -> Result<(Action, Action)> {
        let (lead, follow) = self.turn_order();

        let (mut lead_action, forced_follow) = self.take_turn(lead)?;
        let follow_action = match forced_follow {
            Some(action) => {
                log::debug!(
                    "{} plays forced {}",
                    self.players[follow.index()].name,
                    action
                );
                action
            }
            None => {
                let (action, forced_lead) = self.take_turn(follow)?;
                if let Some(forced) = forced_lead {
                    lead_action = forced;
                }
                action
            }
        };

        Ok(match lead {
            Seat::A => (lead_action, follow_action),
            Seat::B => (follow_action, lead_action),
        })
    }

    /// Ask one seat for its action and apply any manipulation it requested.
    /// Returns the action and a forced action for the other seat, if any.
    fn take_turn(&mut self, seat: Seat) -> Result<(Action, Option<Action>)> {
        let (left, right) = self.players.split_at_mut(1);
        let (me, them) = match seat {
            Seat::A => (&mut left[0], &mut right[0]),
            Seat::B => (&mut right[0], &mut left[0]),
        };

        let game = me
            .descriptor
            .discloses(Fact::Game)
            .then_some(&self.views[seat.index()]);
        let length = me
            .descriptor
            .discloses(Fact::Length)
            .then_some(self.config.length);

        let mut control = OpponentControl::default();
        let handle = me.descriptor.manipulates().then_some(&mut control);

        let action = me.decide(&them.history, game, length, &mut self.rng, handle)?;

        let (forced, replacement) = control.take();
        if let Some(rule) = replacement {
            them.take_over(rule);
        }
        if let Some(target) = forced {
            log::debug!("{} forces {} on {}", me.name, target, them.name);
        }
        Ok((action, forced))
    }
}

/// Run a complete finite match between two rules
///
/// # Arguments
/// * `rule_a` - First player's rule
/// * `rule_b` - Second player's rule
/// * `config` - Length, payoff matrix and random seed
///
/// # Returns
/// Complete match result with round-by-round details
pub fn run_match(
    rule_a: Box<dyn Strategy>,
    rule_b: Box<dyn Strategy>,
    config: MatchConfig,
) -> Result<MatchResult> {
    Match::new(rule_a, rule_b, config)?.play()
}
