//! Payload generator output properties

use analytics_traffic_simulator::generator::{
    AttackPayloadGenerator, InvalidPayloadGenerator, NormalPayloadGenerator, PayloadGenerator,
};
use analytics_traffic_simulator::provision::{Resource, SimUser};
use analytics_traffic_simulator::DataClass;
use chrono::NaiveDate;
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn normal_generator(logged_in_ratio: f64) -> NormalPayloadGenerator {
    NormalPayloadGenerator::new(
        vec![
            Resource::new(1, "http://t/home/", "Home"),
            Resource::new(2, "http://t/pricing/", "Pricing"),
        ],
        vec![SimUser::new(5, "subscriber")],
        logged_in_ratio,
        NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(),
    )
}

#[test]
fn test_normal_payload_carries_full_hit() {
    let mut rng = SmallRng::seed_from_u64(1);
    let mut gen = normal_generator(0.0);

    for _ in 0..100 {
        let req = gen.generate(&mut rng);
        assert_eq!(req.data_class, DataClass::Normal);
        assert_eq!(req.field("uid").unwrap().len(), 16);
        assert!(req.field("url").unwrap().starts_with("http://t/"));
        assert!(req.field("page_id").unwrap().parse::<u64>().is_ok());
        assert!(req.field("time").unwrap().parse::<i64>().is_ok());
        assert!(req.field("user_agent").is_some());
        assert!(req.field("resolution").is_some());
        assert!(req.field("user_id").is_none());
    }
}

#[test]
fn test_normal_payload_spreads_across_resources() {
    let mut rng = SmallRng::seed_from_u64(2);
    let mut gen = normal_generator(0.0);
    let pages: std::collections::HashSet<String> = (0..100)
        .map(|_| gen.generate(&mut rng).field("page_id").unwrap().to_string())
        .collect();
    assert_eq!(pages.len(), 2, "both resources receive traffic");
}

#[test]
fn test_logged_in_ratio_controls_user_field() {
    let mut rng = SmallRng::seed_from_u64(3);
    let mut always = normal_generator(1.0);
    for _ in 0..50 {
        assert_eq!(always.generate(&mut rng).field("user_id"), Some("5"));
    }

    let mut never = normal_generator(0.0);
    for _ in 0..50 {
        assert!(never.generate(&mut rng).field("user_id").is_none());
    }
}

#[test]
fn test_invalid_payloads_are_malformed_somewhere() {
    let mut rng = SmallRng::seed_from_u64(4);
    let mut gen = InvalidPayloadGenerator::new();

    let mut saw_missing_uid = false;
    let mut saw_empty = false;
    for _ in 0..200 {
        let req = gen.generate(&mut rng);
        assert_eq!(req.data_class, DataClass::Invalid);

        let well_formed = req.field("uid").is_some()
            && req
                .field("page_id")
                .is_some_and(|v| v.parse::<u64>().is_ok())
            && req
                .field("time")
                .map_or(true, |v| v.parse::<i64>().is_ok_and(|t| t < 10_000_000_000))
            && req
                .field("time_on_page")
                .map_or(true, |v| v.parse::<u64>().is_ok())
            && req.field("url").is_some_and(|v| !v.contains('\u{0}'));
        assert!(!well_formed, "invalid payload must break at least one rule");

        saw_missing_uid |= req.field("uid").is_none() && !req.fields.is_empty();
        saw_empty |= req.fields.is_empty();
    }
    assert!(saw_missing_uid);
    assert!(saw_empty);
}

#[test]
fn test_attack_payloads_always_carry_a_vector() {
    let mut rng = SmallRng::seed_from_u64(5);
    let mut gen = AttackPayloadGenerator::new();

    let mut saw_xss = false;
    let mut saw_sqli = false;
    let mut saw_oversize = false;
    for _ in 0..200 {
        let req = gen.generate(&mut rng);
        assert_eq!(req.data_class, DataClass::Attack);

        let hostile = req.fields.iter().any(|(_, v)| {
            v.contains('<')
                || v.contains('\'')
                || v.contains("..")
                || v.contains("SLEEP")
                || v.contains("DROP TABLE")
                || v.contains("javascript:")
                || v.len() >= 10_000
        });
        assert!(hostile, "attack payload without a hostile value");

        saw_xss |= req.fields.iter().any(|(_, v)| v.contains("<script"));
        saw_sqli |= req.fields.iter().any(|(_, v)| v.contains("DROP TABLE"));
        saw_oversize |= req.fields.iter().any(|(_, v)| v.len() >= 10_000);
    }
    assert!(saw_xss);
    assert!(saw_sqli);
    assert!(saw_oversize);
}
