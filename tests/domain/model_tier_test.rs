use whispai::domain::{ModelTier, TranscriptionMode};

#[test]
fn given_explicit_modes_when_selecting_then_mapping_ignores_duration() {
    for duration in [0.0, 45.0, 600.0] {
        assert_eq!(
            ModelTier::select(TranscriptionMode::Fast, duration),
            ModelTier::Small
        );
        assert_eq!(
            ModelTier::select(TranscriptionMode::Balanced, duration),
            ModelTier::Medium
        );
        assert_eq!(
            ModelTier::select(TranscriptionMode::Accurate, duration),
            ModelTier::Base
        );
    }
}

#[test]
fn given_auto_mode_when_selecting_then_tier_follows_duration() {
    assert_eq!(
        ModelTier::select(TranscriptionMode::Auto, 10.0),
        ModelTier::Small
    );
    assert_eq!(
        ModelTier::select(TranscriptionMode::Auto, 60.0),
        ModelTier::Medium
    );
    assert_eq!(
        ModelTier::select(TranscriptionMode::Auto, 120.0),
        ModelTier::Base
    );
}

#[test]
fn given_auto_mode_at_thresholds_when_selecting_then_upper_bound_is_exclusive() {
    assert_eq!(ModelTier::for_duration(29.99), ModelTier::Small);
    assert_eq!(ModelTier::for_duration(30.0), ModelTier::Medium);
    assert_eq!(ModelTier::for_duration(89.99), ModelTier::Medium);
    assert_eq!(ModelTier::for_duration(90.0), ModelTier::Base);
}

#[test]
fn given_unprobed_duration_when_selecting_auto_then_small_is_used() {
    assert_eq!(
        ModelTier::select(TranscriptionMode::Auto, 0.0),
        ModelTier::Small
    );
}

#[test]
fn given_unknown_mode_string_when_converting_then_auto_is_used() {
    assert_eq!(TranscriptionMode::from("turbo"), TranscriptionMode::Auto);
    assert_eq!(TranscriptionMode::from("fast"), TranscriptionMode::Fast);
}

#[test]
fn given_tier_name_when_parsing_then_roundtrips_display() {
    let tier: ModelTier = "medium".parse().unwrap();
    assert_eq!(tier, ModelTier::Medium);
    assert_eq!(tier.to_string(), "medium");
    assert!("large".parse::<ModelTier>().is_err());
}
