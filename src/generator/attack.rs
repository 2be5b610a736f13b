//! Adversarial payload generation
//!
//! Produces injection and abuse payloads for security-testing the ingestion
//! endpoint: stored-XSS vectors in attacker-controlled fields, SQL injection
//! fragments, path traversal, and oversize values. These must all surface as
//! rejections (or at minimum be stored inert) on a hardened endpoint.

use super::{PayloadGenerator, USER_AGENTS};
use crate::{DataClass, TrackingRequest};
use rand::rngs::SmallRng;
use rand::Rng;

const XSS_VECTORS: &[&str] = &[
    "<script>alert(document.cookie)</script>",
    "<img src=x onerror=alert(1)>",
    "\"><svg/onload=alert(1)>",
    "javascript:alert(1)//",
];

const SQLI_VECTORS: &[&str] = &[
    "' OR '1'='1",
    "1; DROP TABLE statistics;--",
    "1' UNION SELECT user_login,user_pass FROM users--",
    "1 AND SLEEP(5)",
];

const TRAVERSAL_VECTORS: &[&str] = &[
    "../../../../etc/passwd",
    "..%2f..%2f..%2fwp-config.php",
];

/// Generates adversarial tracking payloads.
#[derive(Debug, Clone, Default)]
pub struct AttackPayloadGenerator;

impl AttackPayloadGenerator {
    /// Create the generator.
    pub fn new() -> Self {
        Self
    }
}

impl PayloadGenerator for AttackPayloadGenerator {
    fn generate(&mut self, rng: &mut SmallRng) -> TrackingRequest {
        let uid = format!("{:016x}", rng.gen::<u64>());
        let ua = USER_AGENTS[rng.gen_range(0..USER_AGENTS.len())].to_string();

        // Rotate the hostile value through the attacker-controlled fields
        let (field, value): (&str, String) = match rng.gen_range(0..5u8) {
            0 => (
                "referrer",
                XSS_VECTORS[rng.gen_range(0..XSS_VECTORS.len())].to_string(),
            ),
            1 => (
                "url",
                XSS_VECTORS[rng.gen_range(0..XSS_VECTORS.len())].to_string(),
            ),
            2 => (
                "page_id",
                SQLI_VECTORS[rng.gen_range(0..SQLI_VECTORS.len())].to_string(),
            ),
            3 => (
                "url",
                TRAVERSAL_VECTORS[rng.gen_range(0..TRAVERSAL_VECTORS.len())].to_string(),
            ),
            _ => ("uid", "A".repeat(10_000)),
        };

        let mut fields = vec![
            ("uid".to_string(), uid),
            ("url".to_string(), "/sample-page/".to_string()),
            ("page_id".to_string(), "1".to_string()),
            ("user_agent".to_string(), ua),
        ];
        if let Some(slot) = fields.iter_mut().find(|(k, _)| k == field) {
            slot.1 = value;
        } else {
            fields.push((field.to_string(), value));
        }

        TrackingRequest::new(fields, DataClass::Attack)
    }
}
