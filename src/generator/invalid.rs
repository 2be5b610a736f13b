//! Malformed payload generation
//!
//! Produces requests a correct ingestion endpoint should reject: missing or
//! garbled required fields, type confusion, and out-of-range values. Used to
//! verify the endpoint's validation surface holds up under volume.

use super::{PayloadGenerator, USER_AGENTS};
use crate::{DataClass, TrackingRequest};
use rand::rngs::SmallRng;
use rand::Rng;

/// Generates malformed tracking payloads.
#[derive(Debug, Clone, Default)]
pub struct InvalidPayloadGenerator;

impl InvalidPayloadGenerator {
    /// Create the generator.
    pub fn new() -> Self {
        Self
    }
}

impl PayloadGenerator for InvalidPayloadGenerator {
    fn generate(&mut self, rng: &mut SmallRng) -> TrackingRequest {
        let ua = USER_AGENTS[rng.gen_range(0..USER_AGENTS.len())].to_string();
        let fields = match rng.gen_range(0..6u8) {
            // Missing uid entirely
            0 => vec![
                ("url".to_string(), "/sample-page/".to_string()),
                ("page_id".to_string(), "1".to_string()),
                ("user_agent".to_string(), ua),
            ],
            // Non-numeric page id
            1 => vec![
                ("uid".to_string(), format!("{:016x}", rng.gen::<u64>())),
                ("url".to_string(), "/sample-page/".to_string()),
                ("page_id".to_string(), "not-a-number".to_string()),
                ("user_agent".to_string(), ua),
            ],
            // Timestamp far in the future
            2 => vec![
                ("uid".to_string(), format!("{:016x}", rng.gen::<u64>())),
                ("url".to_string(), "/sample-page/".to_string()),
                ("page_id".to_string(), "1".to_string()),
                ("time".to_string(), "99999999999".to_string()),
                ("user_agent".to_string(), ua),
            ],
            // Negative time-on-page
            3 => vec![
                ("uid".to_string(), format!("{:016x}", rng.gen::<u64>())),
                ("url".to_string(), "/sample-page/".to_string()),
                ("page_id".to_string(), "1".to_string()),
                ("time_on_page".to_string(), "-5000".to_string()),
                ("user_agent".to_string(), ua),
            ],
            // Not a URL at all
            4 => vec![
                ("uid".to_string(), format!("{:016x}", rng.gen::<u64>())),
                ("url".to_string(), "\u{0}\u{1}garbage".to_string()),
                ("page_id".to_string(), "1".to_string()),
                ("user_agent".to_string(), ua),
            ],
            // Empty payload
            _ => Vec::new(),
        };

        TrackingRequest::new(fields, DataClass::Invalid)
    }
}
