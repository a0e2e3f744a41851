use anyhow::Context;

use lens_config::LensConfig;

/// Load `.env` from the working directory (if any), then the layered config.
pub fn load_config() -> anyhow::Result<LensConfig> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let env_path = cwd.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
    }

    LensConfig::load().context("failed to load configuration")
}
