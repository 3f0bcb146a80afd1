//! Configuration display command.

use crate::config::Settings;

/// Print the effective configuration with the access key redacted.
pub fn cmd_config(settings: &Settings) -> anyhow::Result<()> {
    print!("{}", settings.to_display_toml()?);
    Ok(())
}
