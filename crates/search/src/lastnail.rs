//! Bisection minimization of a recorded bad path ("last nail").

use tracing::{debug, info};
use wander_core::{Decision, EngineError, PathOutcome};

use crate::strategy::{DecisionCtx, Draw, EngineAction};

/// Finds the minimal decision prefix of a known-bad path that still
/// reproduces the failure.
///
/// Decisions before `prefix_length` are served verbatim from the bad path;
/// everything after is drawn randomly. `path_count_max` trials run at each
/// prefix length. While trials stay live, `prefix_length` grows by
/// `prefix_length_mod`, which doubles each live level during ramp-up; the
/// first level with no live trial starts ramp-down, where the modifier
/// halves each level. The search ends when the modifier underflows to zero,
/// after `O(log |bad_path|)` levels.
#[derive(Debug)]
pub struct BisectionMinimizer {
    bad_path: Vec<Decision>,
    prefix_length: usize,
    prefix_length_mod: usize,
    path_count: u32,
    path_count_max: u32,
    ramping_up: bool,
    live_at_length: bool,
    live_paths_saved: u64,
    best: Option<(usize, u64)>,
    actions: Vec<EngineAction>,
}

impl BisectionMinimizer {
    /// Create a minimizer over a recorded bad path.
    pub fn new(bad_path: Vec<Decision>, start_prefix_length: usize, path_count_max: u32) -> Self {
        debug_assert!(path_count_max >= 1);
        let prefix_length = start_prefix_length.min(bad_path.len());
        Self {
            bad_path,
            prefix_length,
            prefix_length_mod: 1,
            path_count: 0,
            path_count_max,
            ramping_up: true,
            live_at_length: false,
            live_paths_saved: 0,
            best: None,
            actions: Vec::new(),
        }
    }

    /// Prefix length currently under trial.
    pub fn prefix_length(&self) -> usize {
        self.prefix_length
    }

    /// Current doubling/halving step.
    pub fn prefix_length_mod(&self) -> usize {
        self.prefix_length_mod
    }

    /// Shortest prefix length observed live, with the decision count of the
    /// path that reproduced it.
    pub fn best(&self) -> Option<(usize, u64)> {
        self.best
    }

    pub(crate) fn next_decision(&mut self, ctx: &DecisionCtx) -> Result<Draw, EngineError> {
        if ctx.offset < self.prefix_length.min(self.bad_path.len()) {
            let recorded = self.bad_path[ctx.offset];
            if recorded.bound != ctx.bound {
                return Err(EngineError::BoundMismatch {
                    position: ctx.position,
                    recorded: recorded.bound,
                    requested: ctx.bound,
                });
            }
            return Ok(Draw::Value(recorded.value));
        }
        Ok(Draw::Random)
    }

    pub(crate) fn on_path_complete(&mut self, outcome: &PathOutcome) {
        self.path_count += 1;
        if !outcome.is_live {
            return;
        }
        // This prefix still reproduces the failure: stop trialing the
        // length, persist the path, and remember the candidate.
        self.live_at_length = true;
        self.path_count = self.path_count_max;
        self.live_paths_saved += 1;
        self.actions.push(EngineAction::SavePath {
            name: format!(
                "lastnail-live-len{:04}-{:04}.path",
                self.prefix_length, self.live_paths_saved
            ),
        });
        if self
            .best
            .map_or(true, |(len, _)| self.prefix_length <= len)
        {
            self.best = Some((self.prefix_length, outcome.decision_count));
        }
        info!(
            prefix_length = self.prefix_length,
            decisions = outcome.decision_count,
            "Live path reproduced from prefix"
        );
    }

    pub(crate) fn advance(&mut self) -> bool {
        if self.prefix_length_mod == 0 || self.path_count < self.path_count_max {
            return false;
        }
        if self.live_at_length {
            if self.prefix_length >= self.bad_path.len() {
                // Live at the full path; nothing further to grow into.
                self.ramping_up = false;
                self.prefix_length_mod /= 2;
            } else {
                self.prefix_length =
                    (self.prefix_length + self.prefix_length_mod).min(self.bad_path.len());
                if self.ramping_up {
                    self.prefix_length_mod *= 2;
                } else {
                    self.prefix_length_mod /= 2;
                }
            }
        } else {
            self.ramping_up = false;
            self.prefix_length_mod /= 2;
            self.prefix_length = self.prefix_length.saturating_sub(self.prefix_length_mod);
        }
        self.path_count = 0;
        self.live_at_length = false;
        debug!(
            prefix_length = self.prefix_length,
            prefix_length_mod = self.prefix_length_mod,
            ramping_up = self.ramping_up,
            "Minimizer moved to new prefix length"
        );
        true
    }

    pub(crate) fn has_more(&self, _last_live: bool) -> bool {
        self.prefix_length_mod > 0 && !self.bad_path.is_empty()
    }

    pub(crate) fn drain_actions(&mut self) -> Vec<EngineAction> {
        std::mem::take(&mut self.actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wander_core::EndCause;

    fn bad_path(len: usize) -> Vec<Decision> {
        (0..len).map(|i| Decision::new(4, (i % 4) as u64)).collect()
    }

    fn outcome(is_live: bool) -> PathOutcome {
        PathOutcome {
            cause: EndCause::StoppingCondition,
            is_live,
            is_safe: !is_live,
            step_count: 10,
            decision_count: 10,
        }
    }

    #[test]
    fn test_prefix_served_verbatim_then_random() {
        let mut min = BisectionMinimizer::new(bad_path(10), 2, 5);
        let ctx = DecisionCtx {
            bound: 4,
            offset: 0,
            position: 0,
            step: 0,
        };
        assert_eq!(min.next_decision(&ctx).unwrap(), Draw::Value(0));
        let ctx = DecisionCtx {
            bound: 4,
            offset: 2,
            position: 2,
            step: 0,
        };
        assert_eq!(min.next_decision(&ctx).unwrap(), Draw::Random);
    }

    #[test]
    fn test_bound_mismatch_in_prefix_is_fatal() {
        let mut min = BisectionMinimizer::new(bad_path(10), 2, 5);
        let ctx = DecisionCtx {
            bound: 7,
            offset: 1,
            position: 1,
            step: 0,
        };
        assert!(matches!(
            min.next_decision(&ctx).unwrap_err(),
            EngineError::BoundMismatch { .. }
        ));
    }

    #[test]
    fn test_live_trials_ramp_up() {
        // Scenario: length-10 bad path, prefix_length 1, 5 trials per length.
        // A live result at length 1 ends the level immediately:
        // prefix_length becomes 1 + 1 = 2 and the modifier doubles to 2.
        let mut min = BisectionMinimizer::new(bad_path(10), 1, 5);
        min.on_path_complete(&outcome(true));
        assert!(min.advance());
        assert_eq!(min.prefix_length(), 2);
        assert_eq!(min.prefix_length_mod(), 2);
    }

    #[test]
    fn test_live_forces_level_end() {
        let mut min = BisectionMinimizer::new(bad_path(10), 1, 5);
        min.on_path_complete(&outcome(false));
        assert!(!min.advance());
        min.on_path_complete(&outcome(true));
        assert!(min.advance(), "live result ends the level without more trials");
    }

    #[test]
    fn test_dead_level_starts_ramp_down() {
        let mut min = BisectionMinimizer::new(bad_path(20), 1, 1);
        // Live levels: 1 -> 2 (mod 2) -> 4 (mod 4) -> 8 (mod 8).
        for _ in 0..3 {
            min.on_path_complete(&outcome(true));
            min.advance();
        }
        assert_eq!(min.prefix_length(), 8);
        assert_eq!(min.prefix_length_mod(), 8);
        // Dead level: modifier halves to 4, prefix length falls back to 4.
        min.on_path_complete(&outcome(false));
        min.advance();
        assert_eq!(min.prefix_length(), 4);
        assert_eq!(min.prefix_length_mod(), 4);
    }

    #[test]
    fn test_modifier_non_increasing_after_ramp_down_until_exhaustion() {
        let mut min = BisectionMinimizer::new(bad_path(64), 1, 1);
        let mut levels = 0;
        let mut ramped_down = false;
        let mut last_mod = min.prefix_length_mod();
        while min.has_more(false) {
            levels += 1;
            assert!(levels < 64, "bisection did not converge");
            // Alternate live/dead so both arms are exercised.
            let live = levels % 2 == 0;
            if !live {
                ramped_down = true;
            }
            min.on_path_complete(&outcome(live));
            min.advance();
            if ramped_down {
                assert!(min.prefix_length_mod() <= last_mod);
            }
            last_mod = min.prefix_length_mod();
        }
        assert_eq!(min.prefix_length_mod(), 0);
    }

    #[test]
    fn test_live_at_full_length_converges() {
        let mut min = BisectionMinimizer::new(bad_path(4), 4, 1);
        let mut levels = 0;
        while min.has_more(true) {
            levels += 1;
            assert!(levels < 16);
            min.on_path_complete(&outcome(true));
            min.advance();
        }
        assert_eq!(min.prefix_length(), 4);
    }

    #[test]
    fn test_live_paths_queue_save_actions() {
        let mut min = BisectionMinimizer::new(bad_path(10), 3, 5);
        min.on_path_complete(&outcome(true));
        let actions = min.drain_actions();
        assert_eq!(actions.len(), 1);
        assert!(matches!(
            &actions[0],
            EngineAction::SavePath { name } if name.contains("len0003")
        ));
        assert!(min.drain_actions().is_empty());
        assert_eq!(min.best(), Some((3, 10)));
    }
}
