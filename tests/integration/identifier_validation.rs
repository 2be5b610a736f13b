//! Run-name sanitization and checkpoint file naming

use analytics_traffic_simulator::checkpoint::ops::checkpoint_file_name;
use analytics_traffic_simulator::identifier::RunIdentifier;

#[test]
fn test_safe_names_pass_through() {
    for name in ["nightly", "soak-2026", "q3_load_test", "RUN-42"] {
        assert_eq!(RunIdentifier::new(name).unwrap().as_str(), name);
    }
}

#[test]
fn test_hostile_names_become_filesystem_safe() {
    let cases = [
        ("load test #4", "load_test__4"),
        ("../../etc/passwd", "______etc_passwd"),
        ("run:with/slashes\\and spaces", "run_with_slashes_and_spaces"),
        ("unicode\u{30c6}name", "unicode_name"),
    ];
    for (input, expected) in cases {
        let id = RunIdentifier::new(input).unwrap();
        assert_eq!(id.as_str(), expected);
        // Sanitized names embed directly in a flat file name
        let file = checkpoint_file_name(id.as_str());
        assert!(!file.contains('/'));
        assert!(!file.contains(".."));
    }
}

#[test]
fn test_empty_and_whitespace_names_rejected() {
    assert!(RunIdentifier::new("").is_err());
    assert!(RunIdentifier::new("   \t ").is_err());
}

#[test]
fn test_checkpoint_file_name_shape() {
    assert_eq!(checkpoint_file_name("soak_q3"), "checkpoint_soak_q3.json");
}

#[test]
fn test_timestamped_identifiers_are_valid_run_names() {
    let id = RunIdentifier::timestamped();
    assert!(id.as_str().starts_with("run_"));
    // Round-trips through sanitization unchanged
    assert_eq!(RunIdentifier::new(id.as_str()).unwrap(), id);
}
