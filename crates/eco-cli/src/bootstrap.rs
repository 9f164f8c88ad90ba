use anyhow::Context;
use eco_config::EcoConfig;

use crate::cli::GlobalFlags;

/// Load dotenv overrides, then the layered configuration.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<EcoConfig> {
    load_dotenv(flags)?;
    EcoConfig::load().map_err(anyhow::Error::from)
}

fn load_dotenv(flags: &GlobalFlags) -> anyhow::Result<()> {
    if let Some(env_file) = &flags.env_file {
        dotenvy::from_path(env_file)
            .with_context(|| format!("failed to load dotenv file at {}", env_file.display()))?;
        return Ok(());
    }

    dotenvy::dotenv().ok();
    Ok(())
}
