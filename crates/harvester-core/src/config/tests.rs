use super::*;

#[test]
fn defaults_has_reasonable_values() {
    let config = Config::defaults();
    assert_eq!(config.instagram.requests_per_second, 55);
    assert_eq!(config.instagram.concurrency, 10);
    assert_eq!(config.proxy.disable_threshold, 20);
    assert_eq!(config.reddit.max_retries, 3);
    assert!(!config.reddit.user_agents.is_empty());
}

#[test]
fn validate_fails_on_missing_database_url() {
    let config = Config::defaults();
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::MissingField { field } if field == "database.url"));
}

#[test]
fn validate_fails_on_missing_rapidapi_key() {
    let mut config = Config::defaults();
    config.database.url = "postgres://localhost/test".to_string();
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::MissingField { field } if field == "instagram.rapidapi_key"));
}

#[test]
fn validate_passes_with_required_fields_set() {
    let mut config = Config::defaults();
    config.database.url = "postgres://localhost/test".to_string();
    config.instagram.rapidapi_key = "secret".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn validate_requires_media_fields_only_when_enabled() {
    let mut config = Config::defaults();
    config.database.url = "postgres://localhost/test".to_string();
    config.instagram.rapidapi_key = "secret".to_string();
    assert!(config.validate().is_ok());

    config.media.enabled = true;
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::MissingField { field } if field == "media.bucket_name"));

    config.media.bucket_name = "bucket".to_string();
    config.media.public_url = "https://cdn.example.com".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn env_overrides_apply_double_underscore_keys() {
    std::env::set_var("HARVESTER_INSTAGRAM__REQUESTS_PER_SECOND", "42");
    std::env::set_var("HARVESTER_PROXY__DISABLE_THRESHOLD", "7");
    let mut config = Config::defaults();
    config.apply_env_overrides().unwrap();
    assert_eq!(config.instagram.requests_per_second, 42);
    assert_eq!(config.proxy.disable_threshold, 7);
    std::env::remove_var("HARVESTER_INSTAGRAM__REQUESTS_PER_SECOND");
    std::env::remove_var("HARVESTER_PROXY__DISABLE_THRESHOLD");
}

#[test]
fn env_overrides_reject_malformed_integers() {
    std::env::set_var("HARVESTER_PROXY__DISABLE_THRESHOLD", "not-a-number");
    let mut config = Config::defaults();
    let err = config.apply_env_overrides().unwrap_err();
    assert!(matches!(err, ConfigError::EnvParse { .. }));
    std::env::remove_var("HARVESTER_PROXY__DISABLE_THRESHOLD");
}

#[test]
fn env_overrides_parse_csv_lists() {
    std::env::set_var("HARVESTER_REDDIT__NON_RELATED_KEYWORDS", "foo, bar ,, baz");
    let mut config = Config::defaults();
    config.apply_env_overrides().unwrap();
    assert_eq!(config.reddit.non_related_keywords, vec!["foo", "bar", "baz"]);
    std::env::remove_var("HARVESTER_REDDIT__NON_RELATED_KEYWORDS");
}
