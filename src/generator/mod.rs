//! Payload generators for each data class
//!
//! Generators build the form payloads posted to the ingestion endpoint. Each
//! is stateless per call and draws from a caller-owned RNG so traffic is
//! reproducible under a fixed seed.
//!
//! The invalid and attack generators are only constructed when their ratio is
//! above zero; runs that never use them pay nothing for them.

use crate::TrackingRequest;
use rand::rngs::SmallRng;

pub mod attack;
pub mod invalid;
pub mod normal;

pub use attack::AttackPayloadGenerator;
pub use invalid::InvalidPayloadGenerator;
pub use normal::NormalPayloadGenerator;

/// Produces one classified tracking request per call.
pub trait PayloadGenerator: Send {
    /// Build the next request payload.
    fn generate(&mut self, rng: &mut SmallRng) -> TrackingRequest;
}

/// Browser user-agent pool shared by the generators.
pub(crate) const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:127.0) Gecko/20100101 Firefox/127.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/15E148",
    "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Mobile Safari/537.36",
];
