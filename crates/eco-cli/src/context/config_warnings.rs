use eco_config::EcoConfig;

const SECTIONS: [&str; 5] = ["BACKEND", "LOCATION", "IDENTITY", "SESSION", "GENERAL"];

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &EcoConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &EcoConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let mut warnings = Vec::new();

    for section in SECTIONS {
        let single = format!("ECOSORT_{section}_");
        let double = format!("ECOSORT_{section}__");
        if let Some(key) = env_keys
            .iter()
            .find(|key| key.starts_with(&single) && !key.starts_with(&double))
        {
            warnings.push(format!(
                "{key} is ignored. Nested keys use double underscores (example: {double}{}).",
                key.trim_start_matches(&single)
            ));
        }
    }

    if !config.identity.is_configured() && has_env_prefix(&env_keys, "ECOSORT_IDENTITY__") {
        warnings.push(
            "identity config appears empty while ECOSORT_IDENTITY__* env vars exist. Set ECOSORT_IDENTITY__ID."
                .to_string(),
        );
    }

    if !config.location.is_configured() && has_env_prefix(&env_keys, "ECOSORT_LOCATION__LAT") {
        warnings.push(
            "fixed location ignored: set both ECOSORT_LOCATION__LATITUDE and ECOSORT_LOCATION__LONGITUDE."
                .to_string(),
        );
    }

    warnings
}

fn has_env_prefix(keys: &[String], prefix: &str) -> bool {
    keys.iter().any(|key| key.starts_with(prefix))
}
