//! Chi-square test for opponents that play at random
//!
//! Null hypothesis: the opponent cooperates and defects with equal
//! probability. The opponent is judged random when the observed split does
//! not reject that hypothesis at level `alpha`.

use crate::history::History;

pub const DEFAULT_ALPHA: f64 = 0.05;

/// Below this many observed moves the detector does not judge at all.
pub const MIN_SAMPLES: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RandomnessDetector {
    alpha: f64,
    min_samples: usize,
}

impl Default for RandomnessDetector {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}

impl RandomnessDetector {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            min_samples: MIN_SAMPLES,
        }
    }

    pub fn with_min_samples(self, min_samples: usize) -> Self {
        Self { min_samples, ..self }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Goodness-of-fit statistic against a 50/50 split, one degree of
    /// freedom. Reduces to `(c - d)^2 / n`.
    pub fn statistic(cooperations: usize, defections: usize) -> f64 {
        let n = cooperations + defections;
        if n == 0 {
            return 0.0;
        }
        let diff = cooperations as f64 - defections as f64;
        diff * diff / n as f64
    }

    /// Upper-tail p-value, or `None` while the sample is too small.
    pub fn p_value(&self, cooperations: usize, defections: usize) -> Option<f64> {
        if cooperations + defections < self.min_samples {
            return None;
        }
        Some(chi_squared_sf_1df(Self::statistic(cooperations, defections)))
    }

    /// True iff the split is statistically indistinguishable from a fair coin.
    pub fn is_random(&self, cooperations: usize, defections: usize) -> bool {
        match self.p_value(cooperations, defections) {
            Some(p) => p >= self.alpha,
            None => false,
        }
    }

    /// Judge the moves recorded in a player's own history.
    pub fn assess(&self, history: &History) -> bool {
        self.is_random(history.cooperations(), history.defections())
    }
}

/// P(X > x) for X ~ chi-square with one degree of freedom.
fn chi_squared_sf_1df(x: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    erfc((x / 2.0).sqrt()).clamp(0.0, 1.0)
}

/// Complementary error function, Abramowitz & Stegun 7.1.26 (|err| < 1.5e-7).
fn erfc(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let z = x.abs();
    let t = 1.0 / (1.0 + P * z);
    let tail = (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-z * z).exp();
    if x >= 0.0 {
        tail
    } else {
        2.0 - tail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::Action::{Cooperate as C, Defect as D};
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    #[test]
    fn test_statistic() {
        assert_eq!(RandomnessDetector::statistic(7, 7), 0.0);
        assert_eq!(RandomnessDetector::statistic(14, 0), 14.0);
        assert!((RandomnessDetector::statistic(8, 6) - 2.0 / 14.0 * 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_known_p_values() {
        let det = RandomnessDetector::default();
        // chi2 = 3.841 is the 5% critical value at 1 df
        let p = chi_squared_sf_1df(3.841458820694124);
        assert!((p - 0.05).abs() < 1e-6, "p = {}", p);
        let p = det.p_value(8, 6).unwrap();
        assert!((p - 0.5929).abs() < 1e-3, "p = {}", p);
        let p = det.p_value(23, 6).unwrap();
        assert!(p < 0.002, "p = {}", p);
    }

    #[test]
    fn test_alternating_is_random() {
        let det = RandomnessDetector::default();
        let plays: Vec<_> = (0..30)
            .map(|i| if i % 2 == 0 { (C, C) } else { (D, C) })
            .collect();
        assert!(det.assess(&History::from(plays)));
    }

    #[test]
    fn test_all_defect_is_not_random() {
        let det = RandomnessDetector::default();
        let plays = vec![(D, C); 30];
        assert!(!det.assess(&History::from(plays)));
    }

    #[test]
    fn test_small_sample_defers() {
        let det = RandomnessDetector::default();
        assert_eq!(det.p_value(2, 2), None);
        assert!(!det.is_random(2, 2));
        assert!(det.with_min_samples(4).is_random(2, 2));
    }

    #[test]
    fn test_alpha_is_configurable() {
        // p ~= 0.0325 for an 11/3 split
        assert!(RandomnessDetector::new(0.01).is_random(11, 3));
        assert!(!RandomnessDetector::new(0.05).is_random(11, 3));
    }

    proptest! {
        #[test]
        fn prop_verdict_symmetric(c in 0usize..200, d in 0usize..200) {
            let det = RandomnessDetector::default();
            prop_assert_eq!(det.is_random(c, d), det.is_random(d, c));
        }

        #[test]
        fn prop_p_value_in_unit_interval(c in 0usize..500, d in 0usize..500) {
            let det = RandomnessDetector::default();
            if let Some(p) = det.p_value(c, d) {
                prop_assert!((0.0..=1.0).contains(&p));
            }
        }
    }
}
