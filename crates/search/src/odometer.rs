//! Mixed-radix carry mechanics shared by the enumerating strategies.
//!
//! A selection vector is treated as a ripple-carry counter bounded per
//! position: advancing increments the last position and carries left on
//! overflow, dropping exhausted positions so they are re-allocated fresh on
//! the next path. Positions whose bound is at or above
//! [`MAX_ENUMERABLE_BOUND`] are continuous: instead of incrementing they
//! draw a fresh uniform sample, up to [`MAX_CONTINUOUS_SAMPLES`] attempts.

use wander_core::{
    Decision, EngineError, UniformSource, MAX_CONTINUOUS_SAMPLES, MAX_ENUMERABLE_BOUND,
};

/// Advance a selection vector one step in carry order.
///
/// Increments the last position; on overflow the position is dropped and the
/// carry ripples left. Returns `true` when the carry empties the vector
/// (every combination has been visited). Dropped positions are implicitly
/// zero when the vector is next extended.
pub fn advance_mixed_radix(values: &mut Vec<u64>, bounds: &[u64]) -> bool {
    debug_assert!(values.len() <= bounds.len());
    while let Some(last) = values.len().checked_sub(1) {
        if values[last] + 1 < bounds[last] {
            values[last] += 1;
            return false;
        }
        values.pop();
    }
    true
}

/// One odometer position: its declared bound, current value, and (for
/// continuous positions) how many samples have been spent.
#[derive(Debug, Clone, Copy)]
struct Slot {
    bound: u64,
    value: u64,
    samples: u32,
}

impl Slot {
    fn fresh(bound: u64, rng: &mut dyn UniformSource) -> Self {
        let value = if bound >= MAX_ENUMERABLE_BOUND {
            rng.uniform(bound)
        } else {
            0
        };
        Slot {
            bound,
            value,
            samples: 0,
        }
    }

    /// Step this slot without carrying. Returns `false` when exhausted.
    fn step(&mut self, rng: &mut dyn UniformSource) -> bool {
        if self.bound >= MAX_ENUMERABLE_BOUND {
            if self.samples + 1 < MAX_CONTINUOUS_SAMPLES {
                self.samples += 1;
                self.value = rng.uniform(self.bound);
                return true;
            }
            false
        } else if self.value + 1 < self.bound {
            self.value += 1;
            true
        } else {
            false
        }
    }
}

/// Arena of odometer slots addressed by search-tail offset.
///
/// Bounds are allocated on first visit and asserted on revisits; a bound
/// changing between paths means the system under test is nondeterministic
/// with respect to the fixed selections, which is fatal.
#[derive(Debug, Default)]
pub(crate) struct SlotVec {
    slots: Vec<Slot>,
}

impl SlotVec {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Serve the value at `index`, allocating the slot on first visit.
    ///
    /// `position` is the absolute decision index, used only for diagnostics.
    pub fn visit(
        &mut self,
        index: usize,
        bound: u64,
        position: usize,
        rng: &mut dyn UniformSource,
    ) -> Result<u64, EngineError> {
        if let Some(slot) = self.slots.get(index) {
            if slot.bound != bound {
                return Err(EngineError::BoundMismatch {
                    position,
                    recorded: slot.bound,
                    requested: bound,
                });
            }
            return Ok(slot.value);
        }
        debug_assert_eq!(index, self.slots.len(), "slots visited out of order");
        let slot = Slot::fresh(bound, rng);
        let value = slot.value;
        self.slots.push(slot);
        Ok(value)
    }

    /// Advance the slot vector one step in carry order.
    ///
    /// Returns `true` when the carry empties the vector.
    pub fn advance(&mut self, rng: &mut dyn UniformSource) -> bool {
        while let Some(slot) = self.slots.last_mut() {
            if slot.step(rng) {
                return false;
            }
            self.slots.pop();
        }
        true
    }

    /// Current selections as decisions, in position order.
    pub fn decisions(&self) -> Vec<Decision> {
        self.slots
            .iter()
            .map(|s| Decision {
                bound: s.bound,
                value: s.value,
            })
            .collect()
    }

    /// Current selection values, in position order.
    #[cfg(test)]
    pub fn values(&self) -> Vec<u64> {
        self.slots.iter().map(|s| s.value).collect()
    }
}
