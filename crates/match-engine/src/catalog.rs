//! Serializable rule configuration
//!
//! A [`RuleSpec`] names one catalogue variant together with its parameters,
//! e.g. `{"base": "Feld", "start": 1.0, "end": 0.5, "horizon": 200}`.
//! Omitted parameters take their usual defaults.

use serde::{Deserialize, Serialize};

use crate::descriptor::Descriptor;
use crate::detector::DEFAULT_ALPHA;
use crate::error::{EngineError, Result};
use crate::retaliation::FreshStartPolicy;
use crate::strategies::basic::{
    Alternator, Cooperator, Cycler, Defector, Grudger, RandomPlayer, TitForTat,
};
use crate::strategies::first_tournament::{
    Anonymous, Davis, Downing, Feld, Graaskamp, Grofman, Joss, LockWindow, Nydegger, Shubik,
    SteinAndRapoport, TidemanAndChieruzzi, Tullock,
};
use crate::strategies::mind_control::{MindBender, MindController, MindWarper};
use crate::strategies::transformer::FinalMoves;
use crate::strategy::{Action, Strategy};

fn default_half() -> f64 {
    0.5
}

fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}

fn default_davis_rounds() -> usize {
    10
}

fn default_feld_start() -> f64 {
    1.0
}

fn default_feld_horizon() -> u32 {
    200
}

fn default_joss() -> f64 {
    0.9
}

fn default_final_moves() -> String {
    "DD".to_string()
}

/// One catalogue variant with its parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "base")]
pub enum RuleSpec {
    Cooperator,
    Defector,
    Alternator,
    TitForTat,
    Grudger,
    /// Repeats a compact pattern such as `"DDC"`.
    Cycler {
        pattern: String,
    },
    /// Repeats an explicit move list.
    Scripted {
        moves: Vec<Action>,
    },
    Random {
        #[serde(default = "default_half")]
        cooperation_probability: f64,
    },
    Davis {
        #[serde(default = "default_davis_rounds")]
        rounds_to_cooperate: usize,
        #[serde(default)]
        window: LockWindow,
    },
    Downing,
    Feld {
        #[serde(default = "default_feld_start")]
        start: f64,
        #[serde(default = "default_half")]
        end: f64,
        #[serde(default = "default_feld_horizon")]
        horizon: u32,
    },
    Graaskamp {
        #[serde(default = "default_alpha")]
        alpha: f64,
    },
    Grofman,
    Joss {
        #[serde(default = "default_joss")]
        p: f64,
    },
    Nydegger,
    Shubik,
    SteinAndRapoport {
        #[serde(default = "default_alpha")]
        alpha: f64,
        #[serde(default = "default_final_moves")]
        final_moves: String,
    },
    TidemanAndChieruzzi {
        #[serde(default)]
        fresh_start: FreshStartPolicy,
        #[serde(default = "default_final_moves")]
        final_moves: String,
    },
    Tullock,
    Anonymous,
    MindController,
    MindWarper,
    MindBender,
    /// Any rule with a closing sequence for matches of known length.
    FinalMoves {
        inner: Box<RuleSpec>,
        moves: String,
    },
}

/// Catalogue entry as reported to callers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RuleInfo {
    pub spec: RuleSpec,
    pub name: String,
    pub descriptor: Descriptor,
}

impl RuleSpec {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| EngineError::InvalidConfig(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| EngineError::InvalidConfig(e.to_string()))
    }

    /// Every parameterised variant at its default settings.
    pub fn defaults() -> Vec<RuleSpec> {
        vec![
            RuleSpec::Cooperator,
            RuleSpec::Defector,
            RuleSpec::Alternator,
            RuleSpec::TitForTat,
            RuleSpec::Grudger,
            RuleSpec::Random { cooperation_probability: default_half() },
            RuleSpec::Davis {
                rounds_to_cooperate: default_davis_rounds(),
                window: LockWindow::default(),
            },
            RuleSpec::Downing,
            RuleSpec::Feld {
                start: default_feld_start(),
                end: default_half(),
                horizon: default_feld_horizon(),
            },
            RuleSpec::Graaskamp { alpha: default_alpha() },
            RuleSpec::Grofman,
            RuleSpec::Joss { p: default_joss() },
            RuleSpec::Nydegger,
            RuleSpec::Shubik,
            RuleSpec::SteinAndRapoport {
                alpha: default_alpha(),
                final_moves: default_final_moves(),
            },
            RuleSpec::TidemanAndChieruzzi {
                fresh_start: FreshStartPolicy::default(),
                final_moves: default_final_moves(),
            },
            RuleSpec::Tullock,
            RuleSpec::Anonymous,
            RuleSpec::MindController,
            RuleSpec::MindWarper,
            RuleSpec::MindBender,
        ]
    }

    /// Instantiate a fresh rule.
    pub fn build(&self) -> Result<Box<dyn Strategy>> {
        let rule: Box<dyn Strategy> = match self {
            RuleSpec::Cooperator => Box::new(Cooperator),
            RuleSpec::Defector => Box::new(Defector),
            RuleSpec::Alternator => Box::new(Alternator),
            RuleSpec::TitForTat => Box::new(TitForTat),
            RuleSpec::Grudger => Box::new(Grudger),
            RuleSpec::Cycler { pattern } => Box::new(Cycler::from_pattern(pattern)?),
            RuleSpec::Scripted { moves } => Box::new(Cycler::new(moves.clone())?),
            RuleSpec::Random { cooperation_probability } => {
                let p = probability("Random", *cooperation_probability)?;
                Box::new(RandomPlayer::new(p))
            }
            RuleSpec::Davis { rounds_to_cooperate, window } => {
                Box::new(Davis::new(*rounds_to_cooperate, *window))
            }
            RuleSpec::Downing => Box::new(Downing::new()),
            RuleSpec::Feld { start, end, horizon } => Box::new(Feld::new(*start, *end, *horizon)?),
            RuleSpec::Graaskamp { alpha } => {
                Box::new(Graaskamp::new(significance("First by Graaskamp", *alpha)?))
            }
            RuleSpec::Grofman => Box::new(Grofman),
            RuleSpec::Joss { p } => Box::new(Joss::new(probability("First by Joss", *p)?)),
            RuleSpec::Nydegger => Box::new(Nydegger::new()),
            RuleSpec::Shubik => Box::new(Shubik::new()),
            RuleSpec::SteinAndRapoport { alpha, final_moves } => {
                let alpha = significance("First by Stein and Rapoport", *alpha)?;
                Box::new(FinalMoves::new(
                    SteinAndRapoport::new(alpha),
                    Action::parse_sequence(final_moves)?,
                ))
            }
            RuleSpec::TidemanAndChieruzzi { fresh_start, final_moves } => Box::new(FinalMoves::new(
                TidemanAndChieruzzi::new(*fresh_start),
                Action::parse_sequence(final_moves)?,
            )),
            RuleSpec::Tullock => Box::new(Tullock),
            RuleSpec::Anonymous => Box::new(Anonymous),
            RuleSpec::MindController => Box::new(MindController::new()),
            RuleSpec::MindWarper => Box::new(MindWarper::new()),
            RuleSpec::MindBender => Box::new(MindBender),
            RuleSpec::FinalMoves { inner, moves } => Box::new(FinalMoves::new(
                inner.build()?,
                Action::parse_sequence(moves)?,
            )),
        };
        Ok(rule)
    }

    pub fn describe(&self) -> Result<RuleInfo> {
        let rule = self.build()?;
        Ok(RuleInfo {
            spec: self.clone(),
            name: rule.name(),
            descriptor: rule.descriptor().clone(),
        })
    }
}

fn probability(rule: &str, p: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(EngineError::invalid_parameter(rule, format!("probability {} outside [0, 1]", p)))
    }
}

fn significance(rule: &str, alpha: f64) -> Result<f64> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(alpha)
    } else {
        Err(EngineError::invalid_parameter(
            rule,
            format!("significance level {} outside (0, 1)", alpha),
        ))
    }
}
