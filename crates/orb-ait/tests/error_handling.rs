//! Integration tests for encoder and parser failure modes.

use orb_ait::{encode_section, parse_section, AitError, AitVersion, Application};

#[test]
fn test_violation_reports_first_offending_field() {
    let apps = vec![
        Application::new(1, 1, "ok", "http://a/", "i"),
        Application::new(70_000, 1, "bad", "http://a/", "i"),
        Application::new(2, 1 << 40, "worse", "http://a/", "i"),
    ];
    let err = encode_section(&apps, AitVersion::new(0)).unwrap_err();
    assert_eq!(err.to_string(), "application_id = 70000 does not fit in 16 bits");
}

#[test]
fn test_url_too_long_for_descriptor() {
    let url = format!("http://{}/", "h".repeat(250));
    let app = Application::new(1, 1, "a", url, "i");
    let err = encode_section(&[app], AitVersion::new(0)).unwrap_err();
    assert!(matches!(
        err,
        AitError::EncodingConstraintViolation {
            field: "transport_protocol_descriptor.descriptor_length",
            ..
        }
    ));
}

#[test]
fn test_parse_empty_input() {
    assert!(matches!(parse_section(&[]), Err(AitError::Truncated { offset: 0, needed: 8 })));
}

#[test]
fn test_parse_rejects_corrupted_loop_length() {
    let apps = [Application::new(1, 1, "a", "http://a/", "i")];
    let mut bytes = encode_section(&apps, AitVersion::new(0)).unwrap();
    bytes[11] = bytes[11].wrapping_add(1);
    assert!(matches!(
        parse_section(&bytes),
        Err(AitError::LengthMismatch { field: "application_loop_length", .. })
    ));
}
