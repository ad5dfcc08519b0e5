//! Browser-side configuration.
//!
//! There is no process environment in the browser, so values can also be
//! baked in at build time through the same variable names:
//! `RESEARCH_DASHBOARD_API__BASE_URL`, `RESEARCH_DASHBOARD_SELECTION__ON_LOOKUP_FAILURE`.

use company_store::DashboardConfig;
use figment::providers::Serialized;

pub fn load_config() -> DashboardConfig {
    layered(
        option_env!("RESEARCH_DASHBOARD_API__BASE_URL"),
        option_env!("RESEARCH_DASHBOARD_SELECTION__ON_LOOKUP_FAILURE"),
    )
}

fn layered(base_url: Option<&str>, on_lookup_failure: Option<&str>) -> DashboardConfig {
    let mut figment = DashboardConfig::figment();
    if let Some(base_url) = base_url {
        figment = figment.merge(Serialized::default("api.base_url", base_url));
    }
    if let Some(policy) = on_lookup_failure {
        figment = figment.merge(Serialized::default("selection.on_lookup_failure", policy));
    }
    match DashboardConfig::from_figment(figment) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(error = %err, "invalid build-time configuration, using defaults");
            DashboardConfig::default()
        }
    }
}
