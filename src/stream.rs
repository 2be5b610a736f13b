//! Lazy unbounded request stream
//!
//! Produces classified requests on demand: each pull asks the selector for a
//! data class and delegates to the matching generator. The stream never ends
//! and never materializes ahead; the dispatcher bounds how much of it is
//! consumed, so targets in the millions stay memory-flat.

use crate::generator::{
    AttackPayloadGenerator, InvalidPayloadGenerator, NormalPayloadGenerator, PayloadGenerator,
};
use crate::selector::RequestTypeSelector;
use crate::{DataClass, TrackingRequest};
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Lazy, unbounded sequence of classified request payloads.
pub struct RequestStream {
    selector: RequestTypeSelector,
    normal: NormalPayloadGenerator,
    invalid: Option<InvalidPayloadGenerator>,
    attack: Option<AttackPayloadGenerator>,
    rng: SmallRng,
}

impl RequestStream {
    /// Build a stream from the selector and generators.
    ///
    /// `invalid`/`attack` are `None` when their ratio is zero; the selector
    /// then never yields their class.
    pub fn new(
        selector: RequestTypeSelector,
        normal: NormalPayloadGenerator,
        invalid: Option<InvalidPayloadGenerator>,
        attack: Option<AttackPayloadGenerator>,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            selector,
            normal,
            invalid,
            attack,
            rng,
        }
    }
}

impl Iterator for RequestStream {
    type Item = TrackingRequest;

    fn next(&mut self) -> Option<TrackingRequest> {
        let class = self.selector.pick(&mut self.rng);
        let request = match class {
            DataClass::Invalid => match self.invalid.as_mut() {
                Some(gen) => gen.generate(&mut self.rng),
                None => self.normal.generate(&mut self.rng),
            },
            DataClass::Attack => match self.attack.as_mut() {
                Some(gen) => gen.generate(&mut self.rng),
                None => self.normal.generate(&mut self.rng),
            },
            DataClass::Normal => self.normal.generate(&mut self.rng),
        };
        Some(request)
    }
}
