//! Weighted request-type selection
//!
//! Chooses a [`DataClass`] for each generated request from the configured
//! invalid/attack ratios. The subtract-and-compare rule is deliberately not a
//! normalized three-way draw: the remainder after the invalid comparison is
//! reused as-is against the attack ratio. Observable class frequencies match
//! the configured ratios for the sums used in practice, and downstream
//! consumers depend on this exact behavior, so it must not be "fixed" into a
//! rescaled distribution.

use crate::DataClass;
use rand::Rng;

/// Stateless weighted classifier over request data classes.
#[derive(Debug, Clone, Copy)]
pub struct RequestTypeSelector {
    invalid_ratio: f64,
    attack_ratio: f64,
}

impl RequestTypeSelector {
    /// Create a selector from configured ratios.
    ///
    /// A class is only eligible when its ratio is above zero, mirroring the
    /// orchestrator's lazy generator construction.
    pub fn new(invalid_ratio: f64, attack_ratio: f64) -> Self {
        Self {
            invalid_ratio,
            attack_ratio,
        }
    }

    /// Classify a uniform draw `r` in `[0, 1)`.
    ///
    /// Deterministic core of the selector, exposed so the rule can be tested
    /// without an RNG.
    pub fn classify(&self, r: f64) -> DataClass {
        if self.invalid_ratio > 0.0 && r < self.invalid_ratio {
            return DataClass::Invalid;
        }

        // Remainder reused without rescaling
        let r = r - self.invalid_ratio;
        if self.attack_ratio > 0.0 && r < self.attack_ratio {
            return DataClass::Attack;
        }

        DataClass::Normal
    }

    /// Draw a class using the supplied RNG.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> DataClass {
        self.classify(rng.gen::<f64>())
    }
}
