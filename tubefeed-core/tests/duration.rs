use tubefeed_core::VideoDuration;

#[test]
fn parses_minutes_and_seconds() {
    let duration = VideoDuration::parse("PT4M46S");
    assert_eq!(duration.format(), "04:46");
    assert!(duration.is_valid());
}

#[test]
fn parses_hours_minutes_seconds() {
    let duration = VideoDuration::parse("PT2H4M13S");
    assert_eq!(duration.format(), "02:04:13");
}

#[test]
fn parses_partial_fields() {
    assert_eq!(VideoDuration::parse("PT1H").format(), "01:00:00");
    assert_eq!(VideoDuration::parse("PT30S").format(), "00:30");
    assert_eq!(VideoDuration::parse("PT90S").as_secs(), 90);
}

#[test]
fn passes_through_clock_strings() {
    assert_eq!(VideoDuration::parse("04:46").format(), "04:46");
    assert_eq!(VideoDuration::parse("1:02:03").format(), "01:02:03");
}

#[test]
fn garbage_is_the_zero_sentinel() {
    for raw in ["garbage", "", "PT", "PTXS", "PT4M46", "12:xx", "1:2:3:4"] {
        let duration = VideoDuration::parse(raw);
        assert!(!duration.is_valid(), "expected {raw:?} to be invalid");
        assert_eq!(duration, VideoDuration::ZERO);
    }
}

#[test]
fn zero_duration_is_invalid() {
    assert!(!VideoDuration::parse("PT0S").is_valid());
    assert!(!VideoDuration::from_secs(0).is_valid());
    assert_eq!(VideoDuration::ZERO.format(), "00:00");
}
