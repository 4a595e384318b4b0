use bsync_config::{ClientConfig, ConfigError, ConfigManager, OrderingMode};
use tempfile::tempdir;

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("client.json"));

    let cfg = manager.load().expect("load config");

    assert_eq!(cfg.api_base, "api");
    assert!(cfg.cache_busting);
    assert_eq!(cfg.response_ordering, OrderingMode::LatestRequest);
    assert!(!manager.config_path().exists());
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    let cfg = ClientConfig {
        api_base: "/v2/api/".into(),
        cache_busting: false,
        response_ordering: OrderingMode::LastResponse,
        log_filter: Some("budget_sync=debug".into()),
    };

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert!(manager.config_path().ends_with("config/client.json"));
    assert!(!manager.config_path().with_extension("json.tmp").exists());
}

#[test]
fn corrupt_file_is_a_serde_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("client.json");
    std::fs::write(&path, "{ not json").expect("write");

    let err = ConfigManager::new(path).load().unwrap_err();

    assert!(matches!(err, ConfigError::Serde(_)));
}

#[test]
fn invalid_settings_are_not_saved() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("client.json"));
    let cfg = ClientConfig {
        log_filter: Some("  ".into()),
        ..ClientConfig::default()
    };

    let err = manager.save(&cfg).unwrap_err();

    assert!(matches!(err, ConfigError::Invalid { field: "log_filter", .. }));
    assert!(!manager.config_path().exists());
}

#[cfg(target_os = "linux")]
#[test]
fn user_default_lives_under_the_platform_config_dir() {
    let dir = tempdir().expect("tempdir");
    std::env::set_var("XDG_CONFIG_HOME", dir.path());

    let manager = ConfigManager::user_default().expect("manager");

    assert_eq!(
        manager.config_path(),
        dir.path().join("budget-sync").join("config").join("client.json")
    );
    assert!(dir.path().join("budget-sync").join("config").is_dir());
    assert_eq!(manager.load().expect("load"), ClientConfig::default());
}
