//! Entries from the first iterated Prisoner's Dilemma tournament
//!
//! Each entry is its own state machine. Shared pieces (randomness detection,
//! retaliation bookkeeping) are composed in rather than inherited.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::descriptor::{Descriptor, Fact, MemoryDepth};
use crate::detector::{RandomnessDetector, DEFAULT_ALPHA};
use crate::error::{EngineError, Result};
use crate::game::MatchLength;
use crate::history::Window;
use crate::retaliation::{scoring_deficit, FreshStartPolicy, RetaliationController};
use crate::strategy::{Action, Strategy, Turn};

use Action::{Cooperate as C, Defect as D};

// ── Davis ────────────────────────────────────────────────────────────

/// Which opponent defections lock a [`Davis`] rule into defection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockWindow {
    /// Only defections during the opening cooperation rounds count.
    Opening,
    /// Any defection so far counts.
    #[default]
    Unbounded,
}

/// Cooperate for the first K rounds, then defect forever once the opponent
/// has been seen defecting.
#[derive(Clone, Debug)]
pub struct Davis {
    rounds_to_cooperate: usize,
    window: LockWindow,
    locked: bool,
}

static DAVIS: Descriptor = Descriptor::new(MemoryDepth::Unbounded);

impl Davis {
    pub fn new(rounds_to_cooperate: usize, window: LockWindow) -> Self {
        Self {
            rounds_to_cooperate,
            window,
            locked: false,
        }
    }
}

impl Default for Davis {
    fn default() -> Self {
        Self::new(10, LockWindow::Unbounded)
    }
}

impl Strategy for Davis {
    fn name(&self) -> String {
        format!("First by Davis: {}", self.rounds_to_cooperate)
    }

    fn descriptor(&self) -> &Descriptor {
        &DAVIS
    }

    fn decide(&mut self, turn: &mut Turn<'_>) -> Result<Action> {
        if turn.history().len() < self.rounds_to_cooperate {
            return Ok(C);
        }
        if self.locked {
            return Ok(D);
        }
        let opponent = turn.opponent();
        let provoked = match self.window {
            LockWindow::Unbounded => opponent.defections() > 0,
            LockWindow::Opening => opponent
                .actions()
                .take(self.rounds_to_cooperate)
                .any(|a| a == D),
        };
        if provoked {
            log::debug!("{} locked into defection at round {}", self.name(), turn.round());
            self.locked = true;
            return Ok(D);
        }
        Ok(C)
    }

    fn snapshot(&self) -> serde_json::Value {
        json!({ "locked": self.locked })
    }
}

// ── Downing ──────────────────────────────────────────────────────────

/// Estimates how often the opponent rewards cooperation and how often it
/// rewards defection, then plays whichever has the higher expected payoff.
#[derive(Clone, Debug, Default)]
pub struct Downing {
    cooperations_after_c: u32,
    cooperations_after_d: u32,
}

static DOWNING: Descriptor = Descriptor::new(MemoryDepth::Unbounded).uses(Fact::Game);

impl Downing {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for Downing {
    fn name(&self) -> String {
        "First by Downing".into()
    }

    fn descriptor(&self) -> &Descriptor {
        &DOWNING
    }

    fn decide(&mut self, turn: &mut Turn<'_>) -> Result<Action> {
        let own = turn.history();
        let Some(opp_last) = turn.opponent().last_action() else {
            return Ok(D);
        };
        if own.len() == 1 {
            // The opponent's first move is treated as a response to cooperation.
            if opp_last == C {
                self.cooperations_after_c += 1;
            }
            return Ok(D);
        }

        let (own_prev, _) = own.at(own.len() - 1)?;
        if opp_last == C {
            match own_prev {
                C => self.cooperations_after_c += 1,
                D => self.cooperations_after_d += 1,
            }
        }

        let alpha = self.cooperations_after_c as f64 / (own.cooperations() + 1) as f64;
        let beta = self.cooperations_after_d as f64 / own.defections().max(2) as f64;

        let (r, p, s, t) = turn.game()?.rpst();
        let (r, p, s, t) = (r as f64, p as f64, s as f64, t as f64);
        let cooperate = alpha * r + (1.0 - alpha) * s;
        let defect = beta * t + (1.0 - beta) * p;

        if cooperate > defect {
            Ok(C)
        } else if cooperate < defect {
            Ok(D)
        } else {
            Ok(own.last_action().map_or(D, Action::flip))
        }
    }

    fn snapshot(&self) -> serde_json::Value {
        json!({
            "cooperations_after_c": self.cooperations_after_c,
            "cooperations_after_d": self.cooperations_after_d,
        })
    }
}

// ── Feld ─────────────────────────────────────────────────────────────

/// Tit for tat that, after an opponent cooperation, cooperates with a
/// probability decaying linearly from `start` to `end` over `horizon` rounds.
#[derive(Clone, Debug)]
pub struct Feld {
    start: f64,
    end: f64,
    horizon: u32,
    descriptor: Descriptor,
}

impl Feld {
    pub fn new(start: f64, end: f64, horizon: u32) -> Result<Self> {
        let in_unit = |p: f64| (0.0..=1.0).contains(&p);
        if !in_unit(start) || !in_unit(end) {
            return Err(EngineError::invalid_parameter(
                "First by Feld",
                "probabilities must lie in [0, 1]",
            ));
        }
        if horizon == 0 {
            return Err(EngineError::invalid_parameter(
                "First by Feld",
                "decay horizon must be positive",
            ));
        }
        Ok(Self {
            start,
            end,
            horizon,
            descriptor: Descriptor::new(MemoryDepth::Finite(horizon)).stochastic(),
        })
    }

    /// Cooperation probability after `rounds_played` rounds.
    pub fn cooperation_probability(&self, rounds_played: usize) -> f64 {
        if rounds_played >= self.horizon as usize {
            return self.end;
        }
        self.start + (self.end - self.start) * rounds_played as f64 / self.horizon as f64
    }
}

impl Default for Feld {
    fn default() -> Self {
        Self {
            start: 1.0,
            end: 0.5,
            horizon: 200,
            descriptor: Descriptor::new(MemoryDepth::Finite(200)).stochastic(),
        }
    }
}

impl Strategy for Feld {
    fn name(&self) -> String {
        format!("First by Feld: {:?}, {:?}, {}", self.start, self.end, self.horizon)
    }

    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn decide(&mut self, turn: &mut Turn<'_>) -> Result<Action> {
        match turn.opponent().last_action() {
            None => Ok(C),
            Some(D) => Ok(D),
            Some(C) => {
                let p = self.cooperation_probability(turn.history().len());
                Ok(turn.random_choice(p))
            }
        }
    }

    fn snapshot(&self) -> serde_json::Value {
        json!({ "start": self.start, "end": self.end, "horizon": self.horizon })
    }
}

// ── Graaskamp ────────────────────────────────────────────────────────

const GRAASKAMP_TEST_ROUND: usize = 50;
const GRAASKAMP_OPENING: usize = 56;

/// Tit for tat with a single test defection at round 51. From round 57 on it
/// checks every round whether the opponent is random (and once it is, it
/// stays convinced), keeps mirroring tit-for-tat players and clones, and
/// otherwise slips in a defection every 5 to 15 rounds.
#[derive(Clone, Debug)]
pub struct Graaskamp {
    detector: RandomnessDetector,
    opponent_is_random: bool,
    next_random_defection_turn: Option<usize>,
}

static GRAASKAMP: Descriptor = Descriptor::new(MemoryDepth::Unbounded).stochastic();

impl Graaskamp {
    pub fn new(alpha: f64) -> Self {
        Self {
            detector: RandomnessDetector::new(alpha),
            opponent_is_random: false,
            next_random_defection_turn: None,
        }
    }
}

impl Default for Graaskamp {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}

impl Strategy for Graaskamp {
    fn name(&self) -> String {
        format!("First by Graaskamp: {}", self.detector.alpha())
    }

    fn descriptor(&self) -> &Descriptor {
        &GRAASKAMP
    }

    fn decide(&mut self, turn: &mut Turn<'_>) -> Result<Action> {
        let Some(opp_last) = turn.opponent().last_action() else {
            return Ok(C);
        };
        let played = turn.history().len();

        if played < GRAASKAMP_OPENING {
            if opp_last == D || played == GRAASKAMP_TEST_ROUND {
                return Ok(D);
            }
            return Ok(C);
        }

        if !self.opponent_is_random && self.detector.assess(turn.opponent()) {
            log::debug!("{} judged its opponent random at round {}", self.name(), turn.round());
            self.opponent_is_random = true;
        }
        if self.opponent_is_random {
            return Ok(D);
        }

        let plays = turn.history().plays();
        let tit_for_tat = plays.windows(2).all(|w| w[1].1 == w[0].0);
        let clone = plays.iter().all(|(own, opp)| own == opp);
        if tit_for_tat || clone {
            return Ok(opp_last);
        }

        let next = match self.next_random_defection_turn {
            Some(next) => next,
            None => {
                let next = turn.rng().range_inclusive(5, 15) as usize + played;
                self.next_random_defection_turn = Some(next);
                next
            }
        };
        if played == next {
            self.next_random_defection_turn =
                Some(turn.rng().range_inclusive(5, 15) as usize + played);
            return Ok(D);
        }
        Ok(C)
    }

    fn snapshot(&self) -> serde_json::Value {
        json!({
            "opponent_is_random": self.opponent_is_random,
            "next_random_defection_turn": self.next_random_defection_turn,
        })
    }
}

// ── Grofman ──────────────────────────────────────────────────────────

/// Cooperate when both players did the same thing last round, otherwise
/// cooperate with probability 2/7.
#[derive(Clone, Copy, Debug, Default)]
pub struct Grofman;

static GROFMAN: Descriptor = Descriptor::new(MemoryDepth::Finite(1)).stochastic();

impl Strategy for Grofman {
    fn name(&self) -> String {
        "First by Grofman".into()
    }

    fn descriptor(&self) -> &Descriptor {
        &GROFMAN
    }

    fn decide(&mut self, turn: &mut Turn<'_>) -> Result<Action> {
        match turn.history().last() {
            None => Ok(C),
            Some((own, opp)) if own == opp => Ok(C),
            Some(_) => Ok(turn.random_choice(2.0 / 7.0)),
        }
    }
}

// ── Joss ─────────────────────────────────────────────────────────────

/// Tit for tat that answers cooperation with cooperation only with
/// probability `p`.
#[derive(Clone, Copy, Debug)]
pub struct Joss {
    p: f64,
}

static JOSS: Descriptor = Descriptor::new(MemoryDepth::Finite(1)).stochastic();

impl Joss {
    pub fn new(p: f64) -> Self {
        Self { p: p.clamp(0.0, 1.0) }
    }
}

impl Default for Joss {
    fn default() -> Self {
        Self::new(0.9)
    }
}

impl Strategy for Joss {
    fn name(&self) -> String {
        format!("First by Joss: {}", self.p)
    }

    fn descriptor(&self) -> &Descriptor {
        &JOSS
    }

    fn decide(&mut self, turn: &mut Turn<'_>) -> Result<Action> {
        match turn.opponent().last_action() {
            None => Ok(C),
            Some(D) => Ok(D),
            Some(C) => Ok(turn.random_choice(self.p)),
        }
    }
}

// ── Nydegger ─────────────────────────────────────────────────────────

/// Weighted score of a trailing window mapped onto an action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreLookup {
    /// Weight per round, most recent first.
    weights: Vec<u32>,
    /// Points for (own, opponent), indexed [own][opponent] with C = 0.
    points: [[u32; 2]; 2],
    /// Scores answered with defection; every other score cooperates.
    defect_on: Vec<u32>,
}

impl ScoreLookup {
    pub fn new(weights: Vec<u32>, points: [[u32; 2]; 2], mut defect_on: Vec<u32>) -> Self {
        defect_on.sort_unstable();
        defect_on.dedup();
        Self { weights, points, defect_on }
    }

    pub fn window(&self) -> usize {
        self.weights.len()
    }

    fn points_for(&self, own: Action, opp: Action) -> u32 {
        let i = |a: Action| usize::from(a == D);
        self.points[i(own)][i(opp)]
    }

    /// Score of the trailing plays. `plays` must cover the whole window.
    pub fn score(&self, plays: &[(Action, Action)]) -> u32 {
        plays
            .iter()
            .rev()
            .zip(&self.weights)
            .map(|((own, opp), weight)| weight * self.points_for(*own, *opp))
            .sum()
    }

    pub fn action(&self, score: u32) -> Action {
        if self.defect_on.binary_search(&score).is_ok() {
            D
        } else {
            C
        }
    }
}

/// Tit for tat over the first three rounds, then a lookup on the weighted
/// outcome of the last three.
#[derive(Clone, Debug)]
pub struct Nydegger {
    lookup: ScoreLookup,
}

static NYDEGGER: Descriptor = Descriptor::new(MemoryDepth::Finite(3));

impl Nydegger {
    pub fn new() -> Self {
        Self {
            lookup: ScoreLookup::new(
                vec![16, 4, 1],
                [[0, 2], [1, 3]],
                vec![1, 6, 7, 17, 22, 23, 26, 29, 30, 31, 33, 38, 39, 45, 49, 54, 55, 58, 61],
            ),
        }
    }

    pub fn lookup(&self) -> &ScoreLookup {
        &self.lookup
    }
}

impl Default for Nydegger {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for Nydegger {
    fn name(&self) -> String {
        "First by Nydegger".into()
    }

    fn descriptor(&self) -> &Descriptor {
        &NYDEGGER
    }

    fn decide(&mut self, turn: &mut Turn<'_>) -> Result<Action> {
        let plays = turn.history().plays();
        let window = self.lookup.window();
        match plays.len() {
            0 => Ok(C),
            n if n < window => {
                if n == 2 && plays[0].1 == D && plays[1].1 == C {
                    return Ok(D);
                }
                Ok(plays[n - 1].1)
            }
            n => {
                let score = self.lookup.score(&plays[n - window..]);
                Ok(self.lookup.action(score))
            }
        }
    }
}

// ── Shubik ───────────────────────────────────────────────────────────

/// Answers a defection against its cooperation with a streak of defections
/// one round longer than the previous streak.
#[derive(Clone, Debug, Default)]
pub struct Shubik {
    retaliation: RetaliationController,
}

static SHUBIK: Descriptor = Descriptor::new(MemoryDepth::Unbounded);

impl Shubik {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for Shubik {
    fn name(&self) -> String {
        "First by Shubik".into()
    }

    fn descriptor(&self) -> &Descriptor {
        &SHUBIK
    }

    fn decide(&mut self, turn: &mut Turn<'_>) -> Result<Action> {
        let Some((own_last, opp_last)) = turn.history().last() else {
            return Ok(C);
        };
        if self.retaliation.continue_retaliation() {
            return Ok(D);
        }
        if opp_last == D && own_last == C {
            self.retaliation.trigger();
            return Ok(D);
        }
        Ok(C)
    }

    fn snapshot(&self) -> serde_json::Value {
        json!({
            "is_retaliating": self.retaliation.is_retaliating(),
            "retaliation_length": self.retaliation.retaliation_length(),
            "retaliation_remaining": self.retaliation.retaliation_remaining(),
        })
    }
}

// ── Stein and Rapoport ───────────────────────────────────────────────

const STEIN_OPENING: usize = 4;
const STEIN_CHECK_INTERVAL: usize = 15;

/// Four cooperations, then tit for tat. Every 15 rounds the opponent is
/// tested for randomness; the verdict holds until the next test and a
/// random opponent is met with defection.
#[derive(Clone, Debug)]
pub struct SteinAndRapoport {
    detector: RandomnessDetector,
    opponent_is_random: bool,
}

static STEIN_AND_RAPOPORT: Descriptor = Descriptor::new(MemoryDepth::Unbounded);

impl SteinAndRapoport {
    pub fn new(alpha: f64) -> Self {
        Self {
            detector: RandomnessDetector::new(alpha),
            opponent_is_random: false,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.detector.alpha()
    }

    pub fn opponent_is_random(&self) -> bool {
        self.opponent_is_random
    }
}

impl Default for SteinAndRapoport {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}

impl Strategy for SteinAndRapoport {
    fn name(&self) -> String {
        format!("First by Stein and Rapoport: {}", self.detector.alpha())
    }

    fn descriptor(&self) -> &Descriptor {
        &STEIN_AND_RAPOPORT
    }

    fn decide(&mut self, turn: &mut Turn<'_>) -> Result<Action> {
        let round = turn.round();
        if round <= STEIN_OPENING {
            return Ok(C);
        }
        let opp_last = turn.opponent().last_action().unwrap_or(C);
        if round < STEIN_CHECK_INTERVAL {
            return Ok(opp_last);
        }

        if round % STEIN_CHECK_INTERVAL == 0 {
            let verdict = self.detector.assess(turn.opponent());
            if verdict != self.opponent_is_random {
                log::debug!(
                    "{} now judges its opponent {} at round {}",
                    self.name(),
                    if verdict { "random" } else { "not random" },
                    round
                );
            }
            self.opponent_is_random = verdict;
        }

        if self.opponent_is_random {
            Ok(D)
        } else {
            Ok(opp_last)
        }
    }

    fn snapshot(&self) -> serde_json::Value {
        json!({ "opponent_is_random": self.opponent_is_random })
    }
}

// ── Tideman and Chieruzzi ────────────────────────────────────────────

/// Escalating retaliation that keeps score and, when the match length is
/// not disclosed, gives a reformed opponent a fresh start: two defections
/// and then a clean slate.
#[derive(Clone, Debug)]
pub struct TidemanAndChieruzzi {
    retaliation: RetaliationController,
    current_score: i64,
    opponent_score: i64,
    fresh_start: bool,
}

static TIDEMAN_AND_CHIERUZZI: Descriptor = Descriptor::new(MemoryDepth::Unbounded)
    .uses(Fact::Game)
    .uses(Fact::Length);

impl TidemanAndChieruzzi {
    pub fn new(policy: FreshStartPolicy) -> Self {
        Self {
            retaliation: RetaliationController::with_fresh_start(policy),
            current_score: 0,
            opponent_score: 0,
            fresh_start: false,
        }
    }

    pub fn retaliation(&self) -> &RetaliationController {
        &self.retaliation
    }

    pub fn scores(&self) -> (i64, i64) {
        (self.current_score, self.opponent_score)
    }
}

impl Default for TidemanAndChieruzzi {
    fn default() -> Self {
        Self::new(FreshStartPolicy::default())
    }
}

impl Strategy for TidemanAndChieruzzi {
    fn name(&self) -> String {
        "First by Tideman and Chieruzzi".into()
    }

    fn descriptor(&self) -> &Descriptor {
        &TIDEMAN_AND_CHIERUZZI
    }

    fn decide(&mut self, turn: &mut Turn<'_>) -> Result<Action> {
        let Some((own_last, opp_last)) = turn.history().last() else {
            return Ok(C);
        };
        let game = *turn.game()?;
        let (mine, theirs) = game.score(own_last, opp_last);
        self.current_score += mine as i64;
        self.opponent_score += theirs as i64;

        // second of the two fresh-start defections
        if self.fresh_start {
            self.fresh_start = false;
            return Ok(D);
        }

        let round = turn.round();
        let length_disclosed = matches!(turn.length()?, MatchLength::Finite(_));
        let lead = self.current_score - self.opponent_score;
        if self
            .retaliation
            .fresh_start_due(round, turn.opponent(), lead, length_disclosed)
        {
            self.retaliation.fresh_start(round);
            self.fresh_start = true;
            return Ok(D);
        }

        if self.retaliation.continue_retaliation() {
            return Ok(D);
        }
        if scoring_deficit(&game, own_last, opp_last) > 0 {
            self.retaliation.trigger();
            return Ok(D);
        }
        Ok(C)
    }

    fn snapshot(&self) -> serde_json::Value {
        json!({
            "is_retaliating": self.retaliation.is_retaliating(),
            "retaliation_length": self.retaliation.retaliation_length(),
            "retaliation_remaining": self.retaliation.retaliation_remaining(),
            "current_score": self.current_score,
            "opponent_score": self.opponent_score,
            "last_fresh_start": self.retaliation.last_fresh_start(),
            "fresh_start": self.fresh_start,
        })
    }
}

// ── Tullock ──────────────────────────────────────────────────────────

const TULLOCK_OPENING: usize = 11;

/// Eleven cooperations, then cooperate 10% less often than the opponent
/// did over the last ten rounds.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tullock;

static TULLOCK: Descriptor =
    Descriptor::new(MemoryDepth::Finite(TULLOCK_OPENING as u32)).stochastic();

impl Strategy for Tullock {
    fn name(&self) -> String {
        "First by Tullock".into()
    }

    fn descriptor(&self) -> &Descriptor {
        &TULLOCK
    }

    fn decide(&mut self, turn: &mut Turn<'_>) -> Result<Action> {
        if turn.history().len() < TULLOCK_OPENING {
            return Ok(C);
        }
        let rounds = TULLOCK_OPENING - 1;
        let cooperated = turn.opponent().count(C, Window::Last(rounds));
        let p = (cooperated as f64 / rounds as f64 - 0.10).max(0.0);
        Ok(turn.random_choice(p))
    }
}

// ── Anonymous ────────────────────────────────────────────────────────

/// Cooperates with a probability drawn fresh each round from [0.3, 0.7).
///
/// Each decision takes two draws from the match stream: one for the
/// probability, one for the choice.
#[derive(Clone, Copy, Debug, Default)]
pub struct Anonymous;

static ANONYMOUS: Descriptor = Descriptor::new(MemoryDepth::Finite(0)).stochastic();

impl Strategy for Anonymous {
    fn name(&self) -> String {
        "First by Anonymous".into()
    }

    fn descriptor(&self) -> &Descriptor {
        &ANONYMOUS
    }

    fn decide(&mut self, turn: &mut Turn<'_>) -> Result<Action> {
        let p = turn.rng().uniform(3.0, 7.0) / 10.0;
        Ok(turn.random_choice(p))
    }
}
