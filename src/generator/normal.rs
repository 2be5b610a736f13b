//! Well-formed tracking hit generation

use super::{PayloadGenerator, USER_AGENTS};
use crate::provision::{Resource, SimUser};
use crate::{DataClass, TrackingRequest};
use chrono::NaiveDate;
use rand::rngs::SmallRng;
use rand::Rng;

const REFERRERS: &[&str] = &[
    "",
    "https://www.google.com/",
    "https://www.bing.com/",
    "https://duckduckgo.com/",
    "https://news.ycombinator.com/",
    "https://x.com/",
];

const RESOLUTIONS: &[&str] = &["1920x1080", "1366x768", "2560x1440", "390x844", "412x915"];

/// Generates plausible page-view hits across the provisioned resources.
#[derive(Debug, Clone)]
pub struct NormalPayloadGenerator {
    resources: Vec<Resource>,
    users: Vec<SimUser>,
    logged_in_ratio: f64,
    date_from: NaiveDate,
    date_to: NaiveDate,
}

impl NormalPayloadGenerator {
    /// Create a generator over provisioned resources and users.
    ///
    /// `resources` must be non-empty; the orchestrator guarantees this after
    /// the Provision phase.
    pub fn new(
        resources: Vec<Resource>,
        users: Vec<SimUser>,
        logged_in_ratio: f64,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Self {
        Self {
            resources,
            users,
            logged_in_ratio,
            date_from,
            date_to,
        }
    }

    /// Random Unix timestamp (seconds) within the configured date window.
    fn random_timestamp(&self, rng: &mut SmallRng) -> i64 {
        let days = (self.date_to - self.date_from).num_days().max(0);
        let date = self.date_from + chrono::Days::new(rng.gen_range(0..=days) as u64);
        let seconds = rng.gen_range(0..86_400);
        date.and_hms_opt(0, 0, 0)
            .expect("midnight is always valid")
            .and_utc()
            .timestamp()
            + seconds
    }
}

impl PayloadGenerator for NormalPayloadGenerator {
    fn generate(&mut self, rng: &mut SmallRng) -> TrackingRequest {
        let resource = &self.resources[rng.gen_range(0..self.resources.len())];
        let uid = format!("{:016x}", rng.gen::<u64>());
        let timestamp = self.random_timestamp(rng);

        let mut fields = vec![
            ("uid".to_string(), uid),
            ("url".to_string(), resource.url.clone()),
            ("page_id".to_string(), resource.id.to_string()),
            ("time".to_string(), timestamp.to_string()),
            (
                "referrer".to_string(),
                REFERRERS[rng.gen_range(0..REFERRERS.len())].to_string(),
            ),
            (
                "user_agent".to_string(),
                USER_AGENTS[rng.gen_range(0..USER_AGENTS.len())].to_string(),
            ),
            (
                "resolution".to_string(),
                RESOLUTIONS[rng.gen_range(0..RESOLUTIONS.len())].to_string(),
            ),
            (
                "time_on_page".to_string(),
                rng.gen_range(1_000..300_000u32).to_string(),
            ),
        ];

        if !self.users.is_empty() && rng.gen::<f64>() < self.logged_in_ratio {
            let user = &self.users[rng.gen_range(0..self.users.len())];
            fields.push(("user_id".to_string(), user.id.to_string()));
        }

        TrackingRequest::new(fields, DataClass::Normal)
    }
}
