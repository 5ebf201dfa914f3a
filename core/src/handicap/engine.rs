//! New handicaps from finish margins
//!
//! A handicap is a start delay chosen so that, on form, every runner
//! arrives together. Finishing ahead of the reference finish means the
//! runner is quicker than their handicap assumed, so they start later next
//! time; finishing behind pulls the start in.
//!
//! Adjustments move on a fixed grid (5 s by default) and never take a
//! handicap below `0:00`.

use stagger_types::HandicapPolicy;

use crate::timing::{self, Handicap, MS_PER_SEC, TimeCodecError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandicapEngine {
    policy: HandicapPolicy,
}

impl HandicapEngine {
    pub fn new(policy: HandicapPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &HandicapPolicy {
        &self.policy
    }

    /// Signed adjustment in whole seconds, on the increment grid
    pub fn adjustment_secs(&self, finish_elapsed_ms: i64, reference_ms: i64) -> i64 {
        let margin_ms = reference_ms.saturating_sub(finish_elapsed_ms);
        let scaled_secs = margin_ms.saturating_mul(self.policy.damping_percent as i64) / 100 / MS_PER_SEC;
        let clamped = scaled_secs.clamp(
            -(self.policy.max_decrease_secs as i64),
            self.policy.max_increase_secs as i64,
        );

        // Truncate toward zero so a partial step never rounds up
        let step = (self.policy.increment_secs as i64).max(1);
        (clamped / step) * step
    }

    /// New handicap for a timed finisher
    pub fn new_handicap(&self, old: Handicap, finish_elapsed_ms: i64, reference_ms: i64) -> Handicap {
        let adjust = self.adjustment_secs(finish_elapsed_ms, reference_ms);
        Handicap::from_secs(old.as_secs().saturating_add(adjust))
    }

    /// Text-in, text-out form of [`new_handicap`](Self::new_handicap)
    pub fn recalculate(&self, old: &str, finish_elapsed_ms: i64, reference_ms: i64) -> Result<String, TimeCodecError> {
        let adjust = self.adjustment_secs(finish_elapsed_ms, reference_ms);
        Ok(timing::seconds_to_time(timing::time_to_seconds(old)? + adjust))
    }
}

/// Median of the ranked finish times for one distance.
/// Even-sized fields average the middle pair.
pub fn reference_finish_ms(finish_times: &[i64]) -> Option<i64> {
    if finish_times.is_empty() {
        return None;
    }
    let mut sorted = finish_times.to_vec();
    sorted.sort_unstable();

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some(sorted[mid - 1] + (sorted[mid] - sorted[mid - 1]) / 2)
    } else {
        Some(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> HandicapEngine {
        HandicapEngine::default()
    }

    fn handicap(text: &str) -> Handicap {
        text.parse().unwrap()
    }

    #[test]
    fn ahead_of_reference_starts_later() {
        // 40s ahead, half applied = 20s
        let new = engine().new_handicap(handicap("02:00"), 1_460_000, 1_500_000);
        assert_eq!(new.to_string(), "02:20");
    }

    #[test]
    fn behind_reference_starts_earlier() {
        let new = engine().new_handicap(handicap("02:00"), 1_540_000, 1_500_000);
        assert_eq!(new.to_string(), "01:40");
    }

    #[test]
    fn adjustments_land_on_the_five_second_grid() {
        let engine = engine();
        // 17s margin → 8.5s → 5s
        assert_eq!(engine.adjustment_secs(1_483_000, 1_500_000), 5);
        // -17s margin → -8.5s → -5s
        assert_eq!(engine.adjustment_secs(1_517_000, 1_500_000), -5);
        // under one step either way → no change
        assert_eq!(engine.adjustment_secs(1_491_000, 1_500_000), 0);
        assert_eq!(engine.adjustment_secs(1_509_000, 1_500_000), 0);
        assert_eq!(engine.adjustment_secs(1_500_000, 1_500_000), 0);

        for finish in (1_000_000..2_000_000).step_by(7_919) {
            assert_eq!(engine.adjustment_secs(finish, 1_500_000) % 5, 0);
        }
    }

    #[test]
    fn adjustments_are_capped() {
        let engine = engine();
        assert_eq!(engine.adjustment_secs(0, 1_500_000), 60);
        assert_eq!(engine.adjustment_secs(3_000_000, 1_500_000), -60);
    }

    #[test]
    fn never_below_zero() {
        let new = engine().new_handicap(handicap("00:20"), 1_700_000, 1_500_000);
        assert_eq!(new, Handicap::ZERO);
        assert_eq!(new.to_string(), "0:00");

        let text = engine().recalculate("", 1_700_000, 1_500_000).unwrap();
        assert_eq!(text, "0:00");
    }

    #[test]
    fn text_form_matches_value_form() {
        let engine = engine();
        for (old, finish) in [("01:30", 1_400_000), ("03:05", 1_620_000), ("10:00", 1_500_000)] {
            let text = engine.recalculate(old, finish, 1_500_000).unwrap();
            let value = engine.new_handicap(handicap(old), finish, 1_500_000);
            assert_eq!(text, value.to_string());
        }
        assert!(engine.recalculate("1m30", 0, 0).is_err());
    }

    #[test]
    fn policy_controls_slope_and_grid() {
        let engine = HandicapEngine::new(HandicapPolicy {
            increment_secs: 10,
            damping_percent: 100,
            max_increase_secs: 30,
            max_decrease_secs: 90,
        });
        assert_eq!(engine.adjustment_secs(1_475_000, 1_500_000), 20);
        assert_eq!(engine.adjustment_secs(1_400_000, 1_500_000), 30);
        assert_eq!(engine.adjustment_secs(1_580_000, 1_500_000), -80);
        assert_eq!(engine.adjustment_secs(1_700_000, 1_500_000), -90);
    }

    #[test]
    fn zero_increment_is_treated_as_one_second() {
        let engine = HandicapEngine::new(HandicapPolicy {
            increment_secs: 0,
            damping_percent: 100,
            ..Default::default()
        });
        assert_eq!(engine.adjustment_secs(1_493_000, 1_500_000), 7);
    }

    #[test]
    fn reference_is_the_median() {
        assert_eq!(reference_finish_ms(&[]), None);
        assert_eq!(reference_finish_ms(&[5]), Some(5));
        assert_eq!(reference_finish_ms(&[30, 10, 20]), Some(20));
        assert_eq!(reference_finish_ms(&[40, 10, 20, 30]), Some(25));
    }
}
