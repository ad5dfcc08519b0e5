use company_store::{ConfigError, DashboardConfig, LookupFailurePolicy};
use figment::providers::Serialized;
use figment::Jail;

#[test]
fn defaults_without_environment() {
    Jail::expect_with(|_jail| {
        let config = DashboardConfig::load().expect("config loads");
        assert_eq!(config, DashboardConfig::default());
        Ok(())
    });
}

#[test]
fn environment_overrides_nested_sections() {
    Jail::expect_with(|jail| {
        jail.set_env("RESEARCH_DASHBOARD_API__BASE_URL", "https://research.example/api");
        jail.set_env("RESEARCH_DASHBOARD_API__SEARCH_DEBOUNCE_MS", "400");
        jail.set_env("RESEARCH_DASHBOARD_SELECTION__ON_LOOKUP_FAILURE", "use_storage");

        let config = DashboardConfig::load().expect("config loads");
        assert_eq!(config.api.base_url, "https://research.example/api");
        assert_eq!(config.api.search_debounce_ms, 400);
        assert_eq!(
            config.selection.on_lookup_failure,
            LookupFailurePolicy::UseStorage
        );
        assert_eq!(config.selection.storage_key, "selected_company");
        Ok(())
    });
}

#[test]
fn later_layers_beat_environment() {
    Jail::expect_with(|jail| {
        jail.set_env("RESEARCH_DASHBOARD_API__BASE_URL", "https://from-env/api");
        let figment = DashboardConfig::figment()
            .merge(Serialized::default("api.base_url", "https://compiled-in/api"));

        let config = DashboardConfig::from_figment(figment).expect("config loads");
        assert_eq!(config.api.base_url, "https://compiled-in/api");
        Ok(())
    });
}

#[test]
fn unknown_policy_is_an_error() {
    Jail::expect_with(|jail| {
        jail.set_env("RESEARCH_DASHBOARD_SELECTION__ON_LOOKUP_FAILURE", "retry_forever");
        let err = DashboardConfig::load().unwrap_err();
        assert!(matches!(err, ConfigError::Figment(_)));
        Ok(())
    });
}

#[test]
fn non_numeric_debounce_is_an_error() {
    Jail::expect_with(|jail| {
        jail.set_env("RESEARCH_DASHBOARD_API__SEARCH_DEBOUNCE_MS", "fast");
        assert!(DashboardConfig::load().is_err());
        Ok(())
    });
}
