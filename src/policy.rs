//! Grow and shrink policy for `ChainingHashMap`.
//!
//! The defaults grow by doubling once the load factor reaches 0.75 and
//! shrink to a quarter of the buckets once it falls to 1/8 (integer
//! division of the bucket count). The two thresholds are asymmetric so
//! that a table which has just shrunk sits well below the grow threshold.

pub use crate::chain_table::MAX_CAPACITY;
use thiserror::Error;

pub const DEFAULT_INITIAL_CAPACITY: usize = 4;
pub const DEFAULT_GROW_LOAD_FACTOR: f64 = 0.75;
pub const DEFAULT_GROW_FACTOR: usize = 2;
pub const DEFAULT_SHRINK_THRESHOLD_DIVISOR: usize = 8;
pub const DEFAULT_SHRINK_FACTOR: usize = 4;

/// Lowest accepted grow load factor. Anything lower grows the table on
/// nearly every insert.
pub const MIN_GROW_LOAD_FACTOR: f64 = 0.125;
/// Highest accepted grow factor.
pub const MAX_GROW_FACTOR: usize = 16;

/// Rejected `ResizePolicy` configurations.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum PolicyError {
    #[error(
        "grow load factor must be finite and at least {min}, got {0}",
        min = MIN_GROW_LOAD_FACTOR
    )]
    LoadFactor(f64),

    #[error("grow factor must be between 2 and {max}, got {0}", max = MAX_GROW_FACTOR)]
    GrowFactor(usize),

    #[error("shrink factor must be at least 2, got {0}")]
    ShrinkFactor(usize),

    #[error("shrink threshold divisor must be non-zero")]
    ShrinkDivisor,

    /// Shrinking would leave the table at or above the grow threshold,
    /// so the next insert would grow it straight back.
    #[error(
        "shrinking by {shrink_factor} at load 1/{divisor} reaches the grow load factor {grow_load_factor}"
    )]
    Thrashing {
        shrink_factor: usize,
        divisor: usize,
        grow_load_factor: f64,
    },
}

/// When and by how much the bucket array is resized.
///
/// Build one from `ResizePolicy::default()` with the setters, then hand it
/// to `ChainingHashMap::with_policy`, which validates it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResizePolicy {
    initial_capacity: usize,
    grow_load_factor: f64,
    grow_factor: usize,
    shrink_threshold_divisor: usize,
    shrink_factor: usize,
}

impl Default for ResizePolicy {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            grow_load_factor: DEFAULT_GROW_LOAD_FACTOR,
            grow_factor: DEFAULT_GROW_FACTOR,
            shrink_threshold_divisor: DEFAULT_SHRINK_THRESHOLD_DIVISOR,
            shrink_factor: DEFAULT_SHRINK_FACTOR,
        }
    }
}

impl ResizePolicy {
    /// Bucket count of a fresh or cleared map. Zero is clamped to 1 and
    /// anything above `MAX_CAPACITY` to `MAX_CAPACITY`.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity.clamp(1, MAX_CAPACITY);
        self
    }

    /// Grow by `factor` once `len >= capacity * load_factor`.
    pub fn grow_at(mut self, load_factor: f64, factor: usize) -> Self {
        self.grow_load_factor = load_factor;
        self.grow_factor = factor;
        self
    }

    /// Shrink to `capacity / factor` once `len <= capacity / divisor`.
    pub fn shrink_at(mut self, divisor: usize, factor: usize) -> Self {
        self.shrink_threshold_divisor = divisor;
        self.shrink_factor = factor;
        self
    }

    pub fn validate(self) -> Result<Self, PolicyError> {
        let res = self.check();
        if let Err(err) = &res {
            log::trace!("rejecting resize policy {:?}: {}", self, err);
        }
        res.map(|()| self)
    }

    fn check(&self) -> Result<(), PolicyError> {
        if !self.grow_load_factor.is_finite() || self.grow_load_factor < MIN_GROW_LOAD_FACTOR {
            return Err(PolicyError::LoadFactor(self.grow_load_factor));
        }
        if !(2..=MAX_GROW_FACTOR).contains(&self.grow_factor) {
            return Err(PolicyError::GrowFactor(self.grow_factor));
        }
        if self.shrink_factor < 2 {
            return Err(PolicyError::ShrinkFactor(self.shrink_factor));
        }
        if self.shrink_threshold_divisor == 0 {
            return Err(PolicyError::ShrinkDivisor);
        }
        let after_shrink = self.shrink_factor as f64 / self.shrink_threshold_divisor as f64;
        if after_shrink >= self.grow_load_factor {
            return Err(PolicyError::Thrashing {
                shrink_factor: self.shrink_factor,
                divisor: self.shrink_threshold_divisor,
                grow_load_factor: self.grow_load_factor,
            });
        }
        Ok(())
    }

    /// Bucket count a map starts with and returns to on `clear`. The live
    /// bucket count is `ChainingHashMap::capacity`.
    pub fn capacity(&self) -> usize {
        self.initial_capacity
    }

    pub fn grow_load_factor(&self) -> f64 {
        self.grow_load_factor
    }

    #[inline]
    pub fn should_grow(&self, len: usize, capacity: usize) -> bool {
        len as f64 >= capacity as f64 * self.grow_load_factor
    }

    /// Next bucket count when growing; never exceeds `MAX_CAPACITY`.
    #[inline]
    pub fn grown(&self, capacity: usize) -> usize {
        capacity.saturating_mul(self.grow_factor).min(MAX_CAPACITY)
    }

    #[inline]
    pub fn should_shrink(&self, len: usize, capacity: usize) -> bool {
        len <= capacity / self.shrink_threshold_divisor
    }

    #[inline]
    pub fn shrunk(&self, capacity: usize) -> usize {
        (capacity / self.shrink_factor).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        let p = ResizePolicy::default().validate().unwrap();
        assert_eq!(p.capacity(), 4);
        assert_eq!(p.grow_load_factor(), 0.75);
    }

    #[test]
    fn default_thresholds() {
        let p = ResizePolicy::default();
        // 3 >= 4 * 0.75
        assert!(!p.should_grow(2, 4));
        assert!(p.should_grow(3, 4));
        assert_eq!(p.grown(4), 8);
        // 1 <= 8 / 8
        assert!(!p.should_shrink(2, 8));
        assert!(p.should_shrink(1, 8));
        assert_eq!(p.shrunk(8), 2);
        // Small tables only shrink once empty, and never below one bucket.
        assert!(!p.should_shrink(1, 4));
        assert!(p.should_shrink(0, 4));
        assert_eq!(p.shrunk(2), 1);
        assert_eq!(p.shrunk(1), 1);
    }

    #[test]
    fn grown_stops_at_max_capacity() {
        let p = ResizePolicy::default().grow_at(0.75, MAX_GROW_FACTOR);
        assert_eq!(p.grown(MAX_CAPACITY / 2 + 1), MAX_CAPACITY);
        assert_eq!(p.grown(MAX_CAPACITY), MAX_CAPACITY);
        assert_eq!(p.grown(usize::MAX), MAX_CAPACITY);
    }

    #[test]
    fn initial_capacity_clamped() {
        assert_eq!(ResizePolicy::default().initial_capacity(0).capacity(), 1);
        assert_eq!(
            ResizePolicy::default().initial_capacity(usize::MAX).capacity(),
            MAX_CAPACITY
        );
    }

    #[test]
    fn invalid_policies_rejected() {
        let base = ResizePolicy::default();
        assert_eq!(
            base.grow_at(0.0, 2).validate(),
            Err(PolicyError::LoadFactor(0.0))
        );
        assert!(matches!(
            base.grow_at(f64::NAN, 2).validate(),
            Err(PolicyError::LoadFactor(_))
        ));
        assert_eq!(
            base.grow_at(f64::MIN_POSITIVE, 2).validate(),
            Err(PolicyError::LoadFactor(f64::MIN_POSITIVE))
        );
        assert_eq!(
            base.grow_at(0.75, 1).validate(),
            Err(PolicyError::GrowFactor(1))
        );
        assert_eq!(
            base.grow_at(0.75, MAX_GROW_FACTOR + 1).validate(),
            Err(PolicyError::GrowFactor(MAX_GROW_FACTOR + 1))
        );
        assert_eq!(
            base.grow_at(0.75, usize::MAX).validate(),
            Err(PolicyError::GrowFactor(usize::MAX))
        );
        assert_eq!(
            base.shrink_at(8, 1).validate(),
            Err(PolicyError::ShrinkFactor(1))
        );
        assert_eq!(
            base.shrink_at(0, 4).validate(),
            Err(PolicyError::ShrinkDivisor)
        );
        assert!(matches!(
            base.shrink_at(4, 4).validate(),
            Err(PolicyError::Thrashing { .. })
        ));
    }

    #[test]
    fn error_messages_render() {
        let msg = PolicyError::GrowFactor(1).to_string();
        assert_eq!(msg, "grow factor must be between 2 and 16, got 1");
        assert_eq!(
            PolicyError::LoadFactor(0.0).to_string(),
            "grow load factor must be finite and at least 0.125, got 0"
        );
        assert_eq!(
            PolicyError::ShrinkDivisor.to_string(),
            "shrink threshold divisor must be non-zero"
        );
    }
}
