use anyhow::{bail, Context, Result};
use autoback::config;
use std::path::PathBuf;

pub async fn handle_init(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match path {
        Some(p) => p,
        None => config::default_config_path()?,
    };
    if path.exists() && !force {
        bail!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    config::create_default_config(&path)
        .await
        .context("Failed to initialize configuration.")?;
    println!("✅ Created default config file at {}", path.display());
    Ok(())
}
