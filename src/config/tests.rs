use super::*;

#[test]
fn defaults_match_observed_configuration() {
    let cli = CliArgs::default();
    let settings = load(&cli).expect("valid settings");

    assert_eq!(settings.server.host, DEFAULT_HOST);
    assert_eq!(settings.server.port, DEFAULT_PORT);
    assert_eq!(settings.feed.page_size, 10);
    assert!(settings.cache.enabled);
    assert_eq!(settings.cache.ttl_seconds, 20);
    assert_eq!(settings.cache.routes, vec!["index".to_string()]);
    assert_eq!(settings.sessions.cookie_name, "session");
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let cli = CliArgs {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        feed_page_size: Some(5),
        ..Default::default()
    };

    let settings = load(&cli).expect("valid settings");

    assert_eq!(settings.server.port, 4321);
    assert_eq!(settings.logging.level, LogLevel::Debug);
    assert_eq!(settings.feed.page_size, 5);
}

#[test]
fn cli_json_logging_enforces_format() {
    let cli = CliArgs {
        log_json: Some(true),
        ..Default::default()
    };

    let settings = load(&cli).expect("valid settings");
    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn cache_can_be_disabled_via_cli() {
    let cli = CliArgs {
        cache_enabled: Some(false),
        cache_ttl_seconds: Some(5),
        ..Default::default()
    };

    let settings = load(&cli).expect("valid settings");
    assert!(!settings.cache.enabled);
    assert_eq!(settings.cache.ttl_seconds, 5);
}

#[test]
fn zero_page_size_is_rejected() {
    let cli = CliArgs {
        feed_page_size: Some(0),
        ..Default::default()
    };

    assert!(matches!(
        load(&cli),
        Err(SettingsError::Invalid {
            field: "feed.page_size",
            ..
        })
    ));
}

#[test]
fn unknown_log_level_is_rejected() {
    let cli = CliArgs {
        log_level: Some("loud".to_string()),
        ..Default::default()
    };

    assert!(matches!(
        load(&cli),
        Err(SettingsError::Invalid {
            field: "logging.level",
            ..
        })
    ));
}

#[test]
fn parse_cli_arguments() {
    let args = CliArgs::parse_from([
        "quill",
        "--server-host",
        "0.0.0.0",
        "--database-url",
        "postgres://override",
        "--cache-ttl-seconds",
        "60",
    ]);

    assert_eq!(args.server_host.as_deref(), Some("0.0.0.0"));
    assert_eq!(args.database_url.as_deref(), Some("postgres://override"));
    assert_eq!(args.cache_ttl_seconds, Some(60));
}
