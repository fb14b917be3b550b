use whispai::infrastructure::observability::TracingConfig;
use whispai::presentation::config::LoggingSettings;

#[test]
fn given_default_config_when_created_then_filter_targets_crate() {
    let config = TracingConfig::default();
    assert!(config.default_filter.contains("whispai=debug"));
    assert!(!config.environment.is_empty());
}

#[test]
fn given_logging_settings_when_converting_then_json_and_level_are_taken() {
    let logging = LoggingSettings {
        level: "warn".to_string(),
        enable_json: true,
    };

    let config = TracingConfig::from_settings("prod", &logging);

    assert!(config.json_format);
    assert_eq!(config.default_filter, "warn");
    assert_eq!(config.environment, "prod");
}
