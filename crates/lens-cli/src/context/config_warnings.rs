use lens_config::LensConfig;

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &LensConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &LensConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let mut warnings = Vec::new();

    if !config.gemini.is_configured() && has_env_prefix(&env_keys, "LENS_GEMINI") {
        warnings.push(
            "Gemini config has no API key while LENS_GEMINI* env vars exist. Use double underscores (example: LENS_GEMINI__API_KEY)."
                .to_string(),
        );
    }

    if has_env_prefix(&env_keys, "LENS_SCAN_") && !has_env_prefix(&env_keys, "LENS_SCAN__") {
        warnings.push(
            "LENS_SCAN_* env vars were ignored. Use double underscores (example: LENS_SCAN__COOLDOWN_MS)."
                .to_string(),
        );
    }

    if config.personas.default_sub_option.is_some() && config.personas.default_persona.is_none() {
        warnings.push(
            "personas.default_sub_option is set without personas.default_persona; it has no effect."
                .to_string(),
        );
    }

    warnings
}

fn has_env_prefix(keys: &[String], prefix: &str) -> bool {
    keys.iter().any(|key| key.starts_with(prefix))
}
